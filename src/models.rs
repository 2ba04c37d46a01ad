// src/models.rs
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Series pre-checked in the series checklist when the page loads.
pub const DEFAULT_SERIES: [&str; 2] = ["Series A", "Series B"];

/// A single venture deal as read from the deal sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Deal {
    pub name: String,
    pub date: NaiveDate,
    pub month: u32,
    pub series: String,
    /// Funding amount in millions of USD. `None` when the sheet cell was blank.
    pub amount: Option<f64>,
    pub description: String,
}

impl Deal {
    pub fn new(
        name: impl Into<String>,
        date: NaiveDate,
        series: impl Into<String>,
        amount: Option<f64>,
        description: impl Into<String>,
    ) -> Self {
        Deal {
            name: name.into(),
            date,
            month: date.month(),
            series: series.into(),
            amount,
            description: description.into(),
        }
    }
}

/// Row of the detail table shown under the charts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DealDetail {
    pub name: String,
    pub date: String,
    pub series: String,
    pub description: String,
}

impl From<&Deal> for DealDetail {
    fn from(deal: &Deal) -> Self {
        DealDetail {
            name: deal.name.clone(),
            date: deal.date.format("%Y-%m-%d").to_string(),
            series: deal.series.clone(),
            description: deal.description.clone(),
        }
    }
}

/// Column headers of the detail table, in display order.
pub const DETAIL_COLUMNS: [&str; 4] = ["Name", "Date", "Series", "Description"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAmount {
    pub date: NaiveDate,
    pub month: u32,
    pub series: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAmount {
    pub month: u32,
    pub series: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub month: u32,
    pub series: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCount {
    pub month: u32,
    pub series: String,
    pub count: usize,
}

/// Common view of the aggregate rows used when filtering by the UI selection.
pub trait SeriesRow {
    fn month(&self) -> u32;
    fn series(&self) -> &str;
    fn value(&self) -> f64;
}

impl SeriesRow for DailyAmount {
    fn month(&self) -> u32 {
        self.month
    }
    fn series(&self) -> &str {
        &self.series
    }
    fn value(&self) -> f64 {
        self.amount
    }
}

impl SeriesRow for MonthlyAmount {
    fn month(&self) -> u32 {
        self.month
    }
    fn series(&self) -> &str {
        &self.series
    }
    fn value(&self) -> f64 {
        self.amount
    }
}

impl SeriesRow for DailyCount {
    fn month(&self) -> u32 {
        self.month
    }
    fn series(&self) -> &str {
        &self.series
    }
    fn value(&self) -> f64 {
        self.count as f64
    }
}

impl SeriesRow for MonthlyCount {
    fn month(&self) -> u32 {
        self.month
    }
    fn series(&self) -> &str {
        &self.series
    }
    fn value(&self) -> f64 {
        self.count as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    #[default]
    Daily,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisMode {
    #[default]
    Linear,
    Log,
}

/// Inclusive month range picked on the range slider. Always `lo <= hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    lo: u32,
    hi: u32,
}

impl MonthRange {
    pub fn new(lo: u32, hi: u32) -> Option<Self> {
        if lo <= hi {
            Some(MonthRange { lo, hi })
        } else {
            None
        }
    }

    pub fn lo(&self) -> u32 {
        self.lo
    }

    pub fn hi(&self) -> u32 {
        self.hi
    }

    pub fn contains(&self, month: u32) -> bool {
        self.lo <= month && month <= self.hi
    }
}

/// Current state of the dashboard controls, sent by the browser on every change.
#[derive(Debug, Clone)]
pub struct Selection {
    pub months: MonthRange,
    pub series: Vec<String>,
    pub aggregation: AggregationMode,
    pub axis: AxisMode,
}

impl Selection {
    pub fn includes(&self, row: &impl SeriesRow) -> bool {
        self.months.contains(row.month()) && self.series.iter().any(|s| s == row.series())
    }
}

/// Table cell reported by a click on the detail table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActiveCell {
    pub row: usize,
    pub column: usize,
    pub column_id: String,
}

impl fmt::Display for ActiveCell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{'row': {}, 'column': {}, 'column_id': '{}'}}",
            self.row, self.column, self.column_id
        )
    }
}
