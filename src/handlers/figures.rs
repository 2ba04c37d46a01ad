// src/handlers/figures.rs
use charming::Chart;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::models::{AggregationMode, AxisMode, MonthRange, Selection, DEFAULT_SERIES};
use crate::services::aggregation::DealTables;
use crate::services::figures::{build_figures, YRange};

/// Control state as sent by the dashboard page.
#[derive(Debug, Default, Deserialize)]
pub struct FiguresQuery {
    pub lo: Option<u32>,
    pub hi: Option<u32>,
    /// Comma-separated series names. Present but empty means nothing is checked.
    pub series: Option<String>,
    pub aggregation: Option<AggregationMode>,
    pub axis: Option<AxisMode>,
}

impl FiguresQuery {
    pub fn into_selection(self, tables: &DealTables) -> Result<Selection, ApiError> {
        let (min_month, max_month) = tables.month_bounds();
        let lo = self.lo.unwrap_or(min_month);
        let hi = self.hi.unwrap_or(max_month);
        let months = MonthRange::new(lo, hi).ok_or_else(|| {
            ApiError::bad_request(format!("month range {}..{} is inverted", lo, hi))
        })?;

        let series = match self.series {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_SERIES.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Selection {
            months,
            series,
            aggregation: self.aggregation.unwrap_or_default(),
            axis: self.axis.unwrap_or_default(),
        })
    }
}

#[derive(Serialize)]
struct FiguresResponse {
    amount: Value,
    count: Value,
    amount_y_range: Option<YRange>,
    count_y_range: Option<YRange>,
    amount_rows: usize,
    count_rows: usize,
}

fn chart_json(chart: &Chart) -> Result<Value, Rejection> {
    serde_json::from_str(&chart.to_string()).map_err(|e| {
        error!("Failed to serialize chart options: {}", e);
        warp::reject::custom(ApiError::internal("failed to serialize chart options"))
    })
}

pub async fn get_figures(query: FiguresQuery, tables: Arc<DealTables>) -> Result<Json, Rejection> {
    info!("Handling request to update figures: {:?}", query);

    let selection = query
        .into_selection(&tables)
        .map_err(warp::reject::custom)?;
    let figures = build_figures(&tables, &selection);

    let response = FiguresResponse {
        amount: chart_json(&figures.amount)?,
        count: chart_json(&figures.count)?,
        amount_y_range: figures.amount_range,
        count_y_range: figures.count_range,
        amount_rows: figures.amount_rows,
        count_rows: figures.count_rows,
    };

    Ok(warp::reply::json(&response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Deal;
    use chrono::NaiveDate;

    fn tables() -> DealTables {
        let date = |m, d| NaiveDate::from_ymd_opt(2022, m, d).unwrap();
        DealTables::build(vec![
            Deal::new("Acme", date(3, 1), "Series A", Some(5.0), ""),
            Deal::new("Wayne", date(11, 9), "Series B", Some(40.0), ""),
        ])
    }

    #[test]
    fn defaults_follow_initial_controls() {
        let selection = FiguresQuery::default().into_selection(&tables()).unwrap();

        assert_eq!(selection.months, MonthRange::new(3, 11).unwrap());
        assert_eq!(selection.series, ["Series A", "Series B"]);
        assert_eq!(selection.aggregation, AggregationMode::Daily);
        assert_eq!(selection.axis, AxisMode::Linear);
    }

    #[test]
    fn series_list_is_comma_separated() {
        let query = FiguresQuery {
            series: Some("Seed, Series C,".into()),
            ..Default::default()
        };
        let selection = query.into_selection(&tables()).unwrap();
        assert_eq!(selection.series, ["Seed", "Series C"]);

        let query = FiguresQuery {
            series: Some(String::new()),
            ..Default::default()
        };
        assert!(query.into_selection(&tables()).unwrap().series.is_empty());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let query = FiguresQuery {
            lo: Some(9),
            hi: Some(4),
            ..Default::default()
        };
        let err = query.into_selection(&tables()).unwrap_err();
        assert_eq!(err.status(), warp::http::StatusCode::BAD_REQUEST);
    }
}
