//! Aggregates the dashboard renders over the collected tables.
//!
//! The dashboard loads the detail table once, optionally joins the list table
//! by identifier, and recomputes everything here whenever a filter changes.
//! Nothing is ever written back.

pub mod calculations;

use std::{collections::HashMap, fmt, path::Path};

use chrono::{Datelike, NaiveDate};
use log::{debug, warn};

use crate::{
    error::Result,
    models::apartment::{DetailRecord, ListRecord},
    table,
};
use calculations::{histogram, mean, mode, sorted_counts, value_counts, Bucket};

pub const UNKNOWN_DISTRICT: &str = "알수없음";

/// A detail row with the values the dashboard derives from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexRow {
    pub detail: DetailRecord,
    pub district: String,
    pub built_year: Option<i32>,
    /// Region code from the list table, when it was joined in.
    pub region: Option<String>,
}

impl ComplexRow {
    pub fn new(detail: DetailRecord) -> ComplexRow {
        ComplexRow {
            district: district_of(detail.kapt_addr.as_deref()),
            built_year: built_year_of(detail.kapt_usedate.as_deref()),
            region: None,
            detail,
        }
    }
}

/// Second word of the address: "서울특별시 종로구 내수동 73" -> "종로구".
pub fn district_of(address: Option<&str>) -> String {
    address
        .and_then(|addr| addr.split_whitespace().nth(1))
        .map(|district| district.to_string())
        .unwrap_or_else(|| UNKNOWN_DISTRICT.to_string())
}

/// Year of a `YYYYMMDD` approval date.
pub fn built_year_of(usedate: Option<&str>) -> Option<i32> {
    usedate
        .and_then(|date| NaiveDate::parse_from_str(date.trim(), "%Y%m%d").ok())
        .map(|date| date.year())
}

/// Loads the detail table and, when `list_table` exists, attaches each row's region.
pub fn load_rows(detail_table: &Path, list_table: Option<&Path>) -> Result<Vec<ComplexRow>> {
    let details: Vec<DetailRecord> = table::read_table(detail_table)?;
    let mut rows: Vec<ComplexRow> = details.into_iter().map(ComplexRow::new).collect();

    if let Some(list_table) = list_table.filter(|path| path.exists()) {
        let listed: Vec<ListRecord> = table::read_table(list_table)?;
        let regions: HashMap<String, String> = listed
            .into_iter()
            .map(|record| (record.kapt_code, record.region))
            .collect();

        for row in rows.iter_mut() {
            row.region = regions.get(&row.detail.kapt_code).cloned();
            if row.region.is_none() {
                warn!(
                    "Complex {} is missing from the list table",
                    row.detail.kapt_code
                );
            }
        }
    }

    debug!("Loaded {} complexes from {}", rows.len(), detail_table.display());
    Ok(rows)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    /// Districts to keep; empty keeps all.
    pub districts: Vec<String>,
    pub from_year: Option<i32>,
    pub to_year: Option<i32>,
}

impl Filters {
    pub fn matches(&self, row: &ComplexRow) -> bool {
        if !self.districts.is_empty() && !self.districts.contains(&row.district) {
            return false;
        }

        if self.from_year.is_none() && self.to_year.is_none() {
            return true;
        }

        match row.built_year {
            Some(year) => {
                self.from_year.map_or(true, |from| year >= from)
                    && self.to_year.map_or(true, |to| year <= to)
            }
            None => false,
        }
    }

    pub fn apply<'a>(&self, rows: &'a [ComplexRow]) -> Vec<&'a ComplexRow> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }
}

/// Values the filter widgets offer, taken from the unfiltered rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChoices {
    pub districts: Vec<String>,
    pub years: Option<(i32, i32)>,
}

impl FilterChoices {
    pub fn from_rows(rows: &[ComplexRow]) -> FilterChoices {
        let mut districts: Vec<String> = rows.iter().map(|row| row.district.clone()).collect();
        districts.sort();
        districts.dedup();

        let years = rows.iter().filter_map(|row| row.built_year);
        let years = match (years.clone().min(), years.max()) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        };

        FilterChoices { districts, years }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    pub top_builders: usize,
    pub floor_bins: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        SummaryOptions {
            top_builders: 20,
            floor_bins: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub complexes: usize,
    pub mean_units: f64,
    pub mean_top_floor: f64,
    pub top_builder: Option<String>,
    pub by_apt_type: Vec<(String, usize)>,
    pub by_built_year: Vec<(i32, usize)>,
    pub by_heating: Vec<(String, usize)>,
    pub top_floor_histogram: Vec<Bucket>,
    pub top_builders: Vec<(String, usize)>,
}

pub fn summarize(rows: &[&ComplexRow], options: SummaryOptions) -> Summary {
    // Missing counts are treated as 0, matching what the dashboard shows.
    let units: Vec<f64> = rows
        .iter()
        .map(|row| row.detail.kaptda_cnt.unwrap_or(0) as f64)
        .collect();
    let top_floors: Vec<u64> = rows
        .iter()
        .map(|row| row.detail.kapt_top_floor.unwrap_or(0))
        .collect();

    let builders = || rows.iter().filter_map(|row| row.detail.kapt_bcompany.clone());

    let mut top_builders = value_counts(builders());
    top_builders.truncate(options.top_builders);

    Summary {
        complexes: rows.len(),
        mean_units: mean(units),
        mean_top_floor: mean(top_floors.iter().map(|floor| *floor as f64)),
        top_builder: mode(builders()),
        by_apt_type: value_counts(rows.iter().filter_map(|row| row.detail.code_apt_nm.clone())),
        by_built_year: sorted_counts(rows.iter().filter_map(|row| row.built_year)),
        by_heating: value_counts(rows.iter().filter_map(|row| row.detail.code_heat_nm.clone())),
        top_floor_histogram: histogram(&top_floors, options.floor_bins),
        top_builders,
    }
}

fn write_counts<K: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    counts: &[(K, usize)],
) -> fmt::Result {
    writeln!(f, "{title}")?;
    for (key, count) in counts {
        writeln!(f, "  {key:<24} {count:>6}")?;
    }
    Ok(())
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Complexes:          {}", self.complexes)?;
        writeln!(f, "Mean units:         {}", self.mean_units.trunc() as i64)?;
        writeln!(f, "Mean top floor:     {}", self.mean_top_floor.trunc() as i64)?;
        writeln!(
            f,
            "Most common builder: {}",
            self.top_builder.as_deref().unwrap_or("N/A")
        )?;
        write_counts(f, "Apartment types", &self.by_apt_type)?;
        write_counts(f, "Completed per year", &self.by_built_year)?;
        write_counts(f, "Heating", &self.by_heating)?;
        writeln!(f, "Top floor distribution")?;
        for bucket in &self.top_floor_histogram {
            writeln!(
                f,
                "  {:>3}-{:<3} {:>6}",
                bucket.start, bucket.end, bucket.count
            )?;
        }
        write_counts(f, "Builders", &self.top_builders)
    }
}
