use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{CollectError, Result};

/// Administrative-region (시군구) code used to scope list queries, e.g. `11110`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region(String);

impl Region {
    pub fn parse(code: &str) -> Result<Region> {
        lazy_static! {
            static ref REGION_CODE_REGEX: Regex = Regex::new(r"^\d{5}$").unwrap();
        }

        let code = code.trim();
        if !REGION_CODE_REGEX.is_match(code) {
            return Err(CollectError::Configuration(format!(
                "invalid region code '{code}', expected five digits"
            )));
        }

        Ok(Region(code.to_string()))
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
