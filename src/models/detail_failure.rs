use serde::{Deserialize, Serialize};

use crate::{error::CollectError, table::TableRow};

/// An identifier whose detail request failed during the last detail run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailFailure {
    pub kapt_code: String,
    pub kind: String,
    pub message: String,
}

impl DetailFailure {
    pub fn new(kapt_code: &str, err: &CollectError) -> DetailFailure {
        DetailFailure {
            kapt_code: kapt_code.to_string(),
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

impl TableRow for DetailFailure {
    const COLUMNS: &'static [&'static str] = &["kaptCode", "kind", "message"];
}
