use std::{collections::HashSet, time::Instant};

use log::{error, info, warn};

use super::{
    pause,
    state::{FetchTarget, RunState},
};
use crate::{
    config::Config,
    data_portal::AptSource,
    error::{CollectError, Result},
    models::{apartment::ListRecord, region::Region},
    table,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRunSummary {
    pub regions: usize,
    pub rows: usize,
    pub duplicates: usize,
}

/// Enumerates the complexes of every region page by page and replaces the list table.
pub struct ListCollector<'a, S: AptSource + ?Sized> {
    source: &'a S,
    config: &'a Config,
    state: RunState,
    requests: usize,
    duplicates: usize,
}

impl<'a, S: AptSource + ?Sized> ListCollector<'a, S> {
    pub fn new(source: &'a S, config: &'a Config) -> Self {
        ListCollector {
            source,
            config,
            state: RunState::NotStarted,
            requests: 0,
            duplicates: 0,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Collects all regions and writes the list table. Any error aborts the
    /// run and leaves the previous table in place.
    pub async fn run(&mut self, regions: &[Region]) -> Result<ListRunSummary> {
        info!("Starting list collection for {} region(s)", regions.len());
        let start = Instant::now();

        let result = match self.collect_regions(regions).await {
            Ok(records) => table::write_table(&self.config.list_table, &records).map(|_| records),
            Err(e) => Err(e),
        };

        match result {
            Ok(records) => {
                self.state.advance(RunState::Done);
                info!(
                    "Finished list collection in {:?}: {} rows written to {}",
                    start.elapsed(),
                    records.len(),
                    self.config.list_table.display()
                );
                Ok(ListRunSummary {
                    regions: regions.len(),
                    rows: records.len(),
                    duplicates: self.duplicates,
                })
            }
            Err(e) => {
                self.state.advance(RunState::Failed);
                error!("List collection aborted: {}", e);
                Err(e)
            }
        }
    }

    /// Fetches every region in order without touching the list table.
    pub async fn collect(&mut self, regions: &[Region]) -> Result<Vec<ListRecord>> {
        match self.collect_regions(regions).await {
            Ok(records) => {
                self.state.advance(RunState::Done);
                Ok(records)
            }
            Err(e) => {
                self.state.advance(RunState::Failed);
                Err(e)
            }
        }
    }

    async fn collect_regions(&mut self, regions: &[Region]) -> Result<Vec<ListRecord>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut records: Vec<ListRecord> = Vec::new();

        for region in regions {
            let before = records.len();
            self.collect_region(region, &mut seen, &mut records).await?;
            info!(
                "Region {}: {} complexes",
                region,
                records.len() - before
            );
        }

        Ok(records)
    }

    async fn collect_region(
        &mut self,
        region: &Region,
        seen: &mut HashSet<String>,
        records: &mut Vec<ListRecord>,
    ) -> Result<()> {
        let page_size = self.config.page_size.max(1);
        let mut page_no: u32 = 1;
        let mut fetched: u64 = 0;

        loop {
            if self.requests > 0 {
                pause(self.config.request_delay_ms).await;
            }
            self.requests += 1;
            self.state.advance(RunState::Fetching(FetchTarget::Page {
                region: region.clone(),
                page_no,
            }));

            let page = self
                .source
                .fetch_list_page(region, page_no, page_size)
                .await?;
            let page_len = page.records.len();
            fetched += page_len as u64;
            let mut added = 0;

            for record in page.records {
                if seen.insert(record.kapt_code.clone()) {
                    records.push(record);
                    added += 1;
                } else {
                    warn!(
                        "Skipping duplicate complex {} (region {}, page {})",
                        record.kapt_code, region, page_no
                    );
                    self.duplicates += 1;
                }
            }

            if page_len == 0 || page_len < page_size as usize {
                break;
            }
            if let Some(total) = page.total_count {
                if fetched >= total {
                    break;
                }
            }
            // A full page of known rows means the portal is not advancing.
            if added == 0 {
                return Err(CollectError::Api(format!(
                    "page {} of region {} only repeated rows already collected",
                    page_no, region
                )));
            }

            info!("Fetched page {} of region {} ({} rows so far)", page_no, region, fetched);
            page_no += 1;
        }

        Ok(())
    }
}
