pub mod apartment;
pub mod detail_failure;
pub mod region;
