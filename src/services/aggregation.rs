// src/services/aggregation.rs
use chrono::{Datelike, NaiveDate};
use log::info;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{
    DailyAmount, DailyCount, Deal, DealDetail, MonthlyAmount, MonthlyCount, Selection, SeriesRow,
};

/// The loaded deals together with every aggregate view the dashboard draws.
/// Built once at startup and only ever read afterwards.
#[derive(Debug, Clone)]
pub struct DealTables {
    deals: Vec<Deal>,
    pub daily_amounts: Vec<DailyAmount>,
    pub monthly_amounts: Vec<MonthlyAmount>,
    pub daily_counts: Vec<DailyCount>,
    pub monthly_counts: Vec<MonthlyCount>,
    series: Vec<String>,
    month_bounds: (u32, u32),
}

impl DealTables {
    pub fn build(deals: Vec<Deal>) -> Self {
        let series: Vec<String> = deals
            .iter()
            .map(|d| d.series.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let month_bounds = match (
            deals.iter().map(|d| d.month).min(),
            deals.iter().map(|d| d.month).max(),
        ) {
            (Some(lo), Some(hi)) => (lo, hi),
            _ => (1, 12),
        };

        let tables = DealTables {
            daily_amounts: daily_amounts(&deals),
            monthly_amounts: monthly_amounts(&deals),
            daily_counts: daily_counts(&deals),
            monthly_counts: monthly_counts(&deals),
            deals,
            series,
            month_bounds,
        };

        info!(
            "Aggregated {} deals: {} daily sums, {} monthly sums, {} daily counts, {} monthly counts",
            tables.deals.len(),
            tables.daily_amounts.len(),
            tables.monthly_amounts.len(),
            tables.daily_counts.len(),
            tables.monthly_counts.len()
        );
        tables
    }

    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    pub fn details(&self) -> Vec<DealDetail> {
        self.deals.iter().map(DealDetail::from).collect()
    }

    /// Distinct series names, sorted.
    pub fn series(&self) -> &[String] {
        &self.series
    }

    /// Smallest and largest month present in the deals.
    pub fn month_bounds(&self) -> (u32, u32) {
        self.month_bounds
    }
}

/// Group by (Date, Series) and sum the amounts.
pub fn daily_amounts(deals: &[Deal]) -> Vec<DailyAmount> {
    let mut groups: BTreeMap<(NaiveDate, &str), f64> = BTreeMap::new();
    for deal in deals {
        *groups.entry((deal.date, deal.series.as_str())).or_default() +=
            deal.amount.unwrap_or(0.0);
    }

    groups
        .into_iter()
        .map(|((date, series), amount)| DailyAmount {
            date,
            month: date.month(),
            series: series.to_string(),
            amount,
        })
        .collect()
}

/// Group by (Month, Series) and sum the amounts.
pub fn monthly_amounts(deals: &[Deal]) -> Vec<MonthlyAmount> {
    let mut groups: BTreeMap<(u32, &str), f64> = BTreeMap::new();
    for deal in deals {
        *groups.entry((deal.month, deal.series.as_str())).or_default() +=
            deal.amount.unwrap_or(0.0);
    }

    groups
        .into_iter()
        .map(|((month, series), amount)| MonthlyAmount {
            month,
            series: series.to_string(),
            amount,
        })
        .collect()
}

/// Group by (Date, Series) and count the deals.
pub fn daily_counts(deals: &[Deal]) -> Vec<DailyCount> {
    let mut groups: BTreeMap<(NaiveDate, &str), usize> = BTreeMap::new();
    for deal in deals {
        *groups.entry((deal.date, deal.series.as_str())).or_default() += 1;
    }

    groups
        .into_iter()
        .map(|((date, series), count)| DailyCount {
            date,
            month: date.month(),
            series: series.to_string(),
            count,
        })
        .collect()
}

/// Group by (Month, Series) and count the deals.
pub fn monthly_counts(deals: &[Deal]) -> Vec<MonthlyCount> {
    let mut groups: BTreeMap<(u32, &str), usize> = BTreeMap::new();
    for deal in deals {
        *groups.entry((deal.month, deal.series.as_str())).or_default() += 1;
    }

    groups
        .into_iter()
        .map(|((month, series), count)| MonthlyCount {
            month,
            series: series.to_string(),
            count,
        })
        .collect()
}

/// Rows whose month falls in the selected range and whose series is checked.
pub fn filter_rows<'a, R: SeriesRow>(rows: &'a [R], selection: &Selection) -> Vec<&'a R> {
    rows.iter().filter(|row| selection.includes(*row)).collect()
}
