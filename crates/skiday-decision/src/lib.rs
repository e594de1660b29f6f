//! Skiing decision for skiday
//!
//! Filters the resort catalog by distance, gates each resort on season and
//! weather, scores the ones that pass and ranks the batch.

pub mod batch;
pub mod decision;
pub mod range;
pub mod season;

pub use batch::{
    evaluate_batch, evaluate_from, sort_results, BatchReport, ResortFailure, ResortResult,
    SortDirection, SortKey, Summary,
};
pub use decision::{decide, grade, score, Decision, GateContext, Outcome, Reason};
pub use range::{haversine_km, resorts_in_range, ResortInRange};
pub use season::is_season_open;
