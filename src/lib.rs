pub mod collector;
pub mod config;
pub mod data_portal;
pub mod error;
pub mod logger;
pub mod models;
pub mod report;
pub mod table;

pub use collector::{
    detail_collector::{DetailCollector, DetailOutcome},
    list_collector::{ListCollector, ListRunSummary},
};
pub use error::{CollectError, Result};
