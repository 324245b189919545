use std::fmt;

use log::debug;

use crate::models::region::Region;

/// What a collector is fetching right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTarget {
    Page { region: Region, page_no: u32 },
    Detail { kapt_code: String },
}

/// Run state shared by both collectors:
/// `NotStarted -> Fetching(..) -> Done | Failed`, with `Fetching` re-entered
/// for every page or identifier. Runs never resume; each one starts fresh.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    NotStarted,
    Fetching(FetchTarget),
    Done,
    Failed,
}

impl RunState {
    pub fn advance(&mut self, next: RunState) {
        debug!("{} -> {}", self, next);
        *self = next;
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchTarget::Page { region, page_no } => write!(f, "region {region} page {page_no}"),
            FetchTarget::Detail { kapt_code } => write!(f, "detail {kapt_code}"),
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::NotStarted => f.write_str("NOT_STARTED"),
            RunState::Fetching(target) => write!(f, "FETCHING({target})"),
            RunState::Done => f.write_str("DONE"),
            RunState::Failed => f.write_str("FAILED"),
        }
    }
}
