use std::{collections::HashSet, time::Instant};

use log::{error, info, warn};

use super::{
    pause,
    state::{FetchTarget, RunState},
};
use crate::{
    config::{Config, FailurePolicy},
    data_portal::AptSource,
    error::{CollectError, Result},
    models::{apartment::DetailRecord, detail_failure::DetailFailure},
    table,
};

const KAPT_CODE_COLUMN: &str = "kaptCode";

/// Records fetched during a detail run, and the identifiers that could not be.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailOutcome {
    pub records: Vec<DetailRecord>,
    pub failures: Vec<DetailFailure>,
}

/// Requests the detail of every identifier in the list table exactly once and
/// replaces the detail table and failure log.
pub struct DetailCollector<'a, S: AptSource + ?Sized> {
    source: &'a S,
    config: &'a Config,
    policy: FailurePolicy,
    state: RunState,
}

impl<'a, S: AptSource + ?Sized> DetailCollector<'a, S> {
    pub fn new(source: &'a S, config: &'a Config) -> Self {
        DetailCollector {
            source,
            config,
            policy: config.detail_failure_policy,
            state: RunState::NotStarted,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Reads the identifiers from the list table, collects their details and
    /// writes both output tables. Under [`FailurePolicy::Abort`] nothing is
    /// written once a request fails.
    pub async fn run(&mut self, limit: Option<usize>) -> Result<DetailOutcome> {
        let start = Instant::now();

        let result = match read_identifiers(&self.config.list_table, limit) {
            Ok(kapt_codes) => {
                info!(
                    "Starting detail collection for {} complexes ({:?} policy)",
                    kapt_codes.len(),
                    self.policy
                );
                self.collect_all(&kapt_codes).await
            }
            Err(e) => Err(e),
        };

        let result = result.and_then(|outcome| {
            table::write_table(&self.config.detail_table, &outcome.records)?;
            table::write_table(&self.config.failure_log, &outcome.failures)?;
            Ok(outcome)
        });

        match result {
            Ok(outcome) => {
                self.state.advance(RunState::Done);
                info!(
                    "Finished detail collection in {:?}: {} rows written to {}",
                    start.elapsed(),
                    outcome.records.len(),
                    self.config.detail_table.display()
                );
                if !outcome.failures.is_empty() {
                    warn!(
                        "{} complexes failed, see {}",
                        outcome.failures.len(),
                        self.config.failure_log.display()
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                self.state.advance(RunState::Failed);
                error!("Detail collection aborted: {}", e);
                Err(e)
            }
        }
    }

    /// Fetches the given identifiers without touching any table.
    pub async fn collect(&mut self, kapt_codes: &[String]) -> Result<DetailOutcome> {
        match self.collect_all(kapt_codes).await {
            Ok(outcome) => {
                self.state.advance(RunState::Done);
                Ok(outcome)
            }
            Err(e) => {
                self.state.advance(RunState::Failed);
                Err(e)
            }
        }
    }

    async fn collect_all(&mut self, kapt_codes: &[String]) -> Result<DetailOutcome> {
        let mut outcome = DetailOutcome::default();
        let total = kapt_codes.len();

        for (idx, kapt_code) in kapt_codes.iter().enumerate() {
            if idx > 0 {
                pause(self.config.request_delay_ms).await;
            }
            if idx == 0 || (idx + 1) % 10 == 0 {
                info!("Processing {}/{}: {}", idx + 1, total, kapt_code);
            }

            self.state.advance(RunState::Fetching(FetchTarget::Detail {
                kapt_code: kapt_code.clone(),
            }));

            match self.fetch_one(kapt_code).await {
                Ok(record) => outcome.records.push(record),
                Err(e) if e.is_request_failure() && self.policy == FailurePolicy::Skip => {
                    warn!("Skipping complex {}: {}", kapt_code, e);
                    outcome.failures.push(DetailFailure::new(kapt_code, &e));
                }
                Err(e) => {
                    error!("Failed to fetch complex {}: {}", kapt_code, e);
                    return Err(e);
                }
            }
        }

        Ok(outcome)
    }

    async fn fetch_one(&self, kapt_code: &str) -> Result<DetailRecord> {
        let record = self.source.fetch_detail(kapt_code).await?;

        // Only rows keyed by a listed identifier may reach the detail table.
        if record.kapt_code != kapt_code {
            return Err(CollectError::Api(format!(
                "requested {} but the response describes {}",
                kapt_code, record.kapt_code
            )));
        }

        Ok(record)
    }
}

/// Identifiers of the list table in file order, each once, optionally truncated.
pub fn read_identifiers(
    list_table: &std::path::Path,
    limit: Option<usize>,
) -> Result<Vec<String>> {
    if !list_table.exists() {
        return Err(CollectError::table(
            list_table,
            "list table not found, run the list collection first",
        ));
    }

    let mut seen = HashSet::new();
    let mut kapt_codes: Vec<String> = table::read_column(list_table, KAPT_CODE_COLUMN)?
        .into_iter()
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty() && seen.insert(code.clone()))
        .collect();

    if let Some(limit) = limit {
        info!("Limiting to {} complexes", limit);
        kapt_codes.truncate(limit);
    }

    Ok(kapt_codes)
}
