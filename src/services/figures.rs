// src/services/figures.rs
//
// Builds the two chart panes for a control selection: scatter plots of the
// daily tables, or a line chart and a grouped bar chart of the monthly ones.

use charming::{
    component::{Axis, Legend, Title},
    element::{AxisType, Tooltip, Trigger},
    series::{Bar, Line, Scatter},
    Chart,
};
use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::BTreeMap;

use crate::models::{AggregationMode, AxisMode, SeriesRow, Selection};
use crate::services::aggregation::{filter_rows, DealTables};

const AMOUNT_TITLE: &str = "Amount of VC funding over time";
const COUNT_TITLE: &str = "Number of VC deals over time";
const DATE_LABEL: &str = "Date (Month Day, Year)";
const MONTH_LABEL: &str = "Month";
const AMOUNT_LABEL: &str = "Funding amount ($m)";
const COUNT_LABEL: &str = "Number of deals";

/// Explicit y-axis limits applied in linear mode.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct YRange {
    pub min: f64,
    pub max: f64,
}

pub struct Figures {
    pub amount: Chart,
    pub count: Chart,
    pub amount_range: Option<YRange>,
    pub count_range: Option<YRange>,
    pub amount_rows: usize,
    pub count_rows: usize,
}

/// The update step: pick the tables for the aggregation mode, filter them to
/// the selection and lay them out for the chosen axis mode.
pub fn build_figures(tables: &DealTables, selection: &Selection) -> Figures {
    debug!(
        "Building figures for months {}..={}, series {:?}, {:?}/{:?}",
        selection.months.lo(),
        selection.months.hi(),
        selection.series,
        selection.aggregation,
        selection.axis
    );

    match selection.aggregation {
        AggregationMode::Daily => {
            let amounts = filter_rows(&tables.daily_amounts, selection);
            let counts = filter_rows(&tables.daily_counts, selection);
            let amount_range = y_range(&amounts, selection.axis, 0.0, AMOUNT_TITLE);
            let count_range = y_range(&counts, selection.axis, 1.0, COUNT_TITLE);

            let amount_points =
                by_series(amounts.iter().map(|r| (r.series(), date_x(r.date), r.value())));
            let count_points =
                by_series(counts.iter().map(|r| (r.series(), date_x(r.date), r.value())));

            Figures {
                amount: scatter_chart(
                    AMOUNT_TITLE,
                    AMOUNT_LABEL,
                    amount_points,
                    selection.axis,
                    amount_range,
                ),
                count: scatter_chart(
                    COUNT_TITLE,
                    COUNT_LABEL,
                    count_points,
                    selection.axis,
                    count_range,
                ),
                amount_range,
                count_range,
                amount_rows: amounts.len(),
                count_rows: counts.len(),
            }
        }
        AggregationMode::Monthly => {
            let amounts = filter_rows(&tables.monthly_amounts, selection);
            let counts = filter_rows(&tables.monthly_counts, selection);
            let amount_range = y_range(&amounts, selection.axis, 0.0, AMOUNT_TITLE);
            let count_range = y_range(&counts, selection.axis, 1.0, COUNT_TITLE);

            let amount_points =
                by_series(amounts.iter().map(|r| (r.series(), r.month as f64, r.value())));
            let count_points =
                by_series(counts.iter().map(|r| (r.series(), r.month as f64, r.value())));

            Figures {
                amount: line_chart(amount_points, selection.axis, amount_range),
                count: grouped_bar_chart(count_points, selection.axis, count_range),
                amount_range,
                count_range,
                amount_rows: amounts.len(),
                count_rows: counts.len(),
            }
        }
    }
}

/// Linear mode pins the axis to `[0, trunc(1.1 * max) + pad]`. Log mode and
/// empty selections leave the range to the chart.
fn y_range<R: SeriesRow>(rows: &[&R], axis: AxisMode, pad: f64, chart: &str) -> Option<YRange> {
    if axis == AxisMode::Log {
        return None;
    }

    let max = rows.iter().map(|r| r.value()).reduce(f64::max);
    match max {
        Some(max) => Some(YRange {
            min: 0.0,
            max: (1.1 * max).trunc() + pad,
        }),
        None => {
            warn!("No rows selected for '{}', leaving y-range unset", chart);
            None
        }
    }
}

/// Time axes take epoch milliseconds.
fn date_x(date: NaiveDate) -> f64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis() as f64)
        .unwrap_or_default()
}

fn by_series<'a>(
    points: impl Iterator<Item = (&'a str, f64, f64)>,
) -> BTreeMap<&'a str, Vec<Vec<f64>>> {
    let mut grouped: BTreeMap<&str, Vec<Vec<f64>>> = BTreeMap::new();
    for (series, x, y) in points {
        grouped.entry(series).or_default().push(vec![x, y]);
    }
    grouped
}

fn y_axis(label: &str, axis: AxisMode, range: Option<YRange>) -> Axis {
    let y = match axis {
        AxisMode::Linear => Axis::new().type_(AxisType::Value),
        AxisMode::Log => Axis::new().type_(AxisType::Log),
    }
    .name(label);

    match range {
        Some(range) => y.min(range.min).max(range.max),
        None => y,
    }
}

fn base_chart(title: &str) -> Chart {
    Chart::new()
        .title(Title::new().text(title))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().top("bottom"))
}

fn scatter_chart(
    title: &str,
    y_label: &str,
    points: BTreeMap<&str, Vec<Vec<f64>>>,
    axis: AxisMode,
    range: Option<YRange>,
) -> Chart {
    let mut chart = base_chart(title)
        .x_axis(Axis::new().type_(AxisType::Time).name(DATE_LABEL))
        .y_axis(y_axis(y_label, axis, range));

    for (series, data) in points {
        chart = chart.series(Scatter::new().name(series).data(data));
    }
    chart
}

fn line_chart(
    points: BTreeMap<&str, Vec<Vec<f64>>>,
    axis: AxisMode,
    range: Option<YRange>,
) -> Chart {
    let mut chart = base_chart(AMOUNT_TITLE)
        .x_axis(Axis::new().type_(AxisType::Value).name(MONTH_LABEL))
        .y_axis(y_axis(AMOUNT_LABEL, axis, range));

    for (series, data) in points {
        chart = chart.series(Line::new().name(series).data(data));
    }
    chart
}

// Bar series without a stack are drawn side by side.
fn grouped_bar_chart(
    points: BTreeMap<&str, Vec<Vec<f64>>>,
    axis: AxisMode,
    range: Option<YRange>,
) -> Chart {
    let mut chart = base_chart(COUNT_TITLE)
        .x_axis(Axis::new().type_(AxisType::Value).name(MONTH_LABEL))
        .y_axis(y_axis(COUNT_LABEL, axis, range));

    for (series, data) in points {
        chart = chart.series(Bar::new().name(series).data(data));
    }
    chart
}
