// src/services/layout.rs
//
// Server-rendered dashboard page. The inline script only wires the controls
// to /api/figures and the table to /api/active-cell; every figure is built
// on the server.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::handlers::table::CLICK_PROMPT;
use crate::models::{DealDetail, DEFAULT_SERIES, DETAIL_COLUMNS};
use crate::services::aggregation::DealTables;

const ECHARTS_CDN: &str = "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";

const PAGE_TITLE: &str = "Venture deals in 2022 (full March to November)";

const DASHBOARD_SCRIPT: &str = r#"
document.addEventListener('DOMContentLoaded', function () {
    const amountChart = echarts.init(document.getElementById('graph-with-slider'));
    const countChart = echarts.init(document.getElementById('graph-with-slider2'));
    window.addEventListener('resize', function () {
        amountChart.resize();
        countChart.resize();
    });

    const lo = document.getElementById('month-lo');
    const hi = document.getElementById('month-hi');
    const rangeLabel = document.getElementById('month-range-label');

    function checked(name) {
        const input = document.querySelector('input[name="' + name + '"]:checked');
        return input ? input.value : '';
    }

    function update() {
        if (Number(lo.value) > Number(hi.value)) {
            const swap = lo.value;
            lo.value = hi.value;
            hi.value = swap;
        }
        rangeLabel.textContent = lo.value + ' - ' + hi.value;

        const series = Array.from(
            document.querySelectorAll('#series-selection input:checked')
        ).map(function (input) { return input.value; });

        const params = new URLSearchParams({
            lo: lo.value,
            hi: hi.value,
            series: series.join(','),
            aggregation: checked('aggregation-selection'),
            axis: checked('yaxis-type'),
        });

        fetch('/api/figures?' + params.toString())
            .then(function (resp) { return resp.json(); })
            .then(function (figures) {
                if (figures.error) {
                    console.error(figures.error);
                    return;
                }
                amountChart.setOption(figures.amount, true);
                countChart.setOption(figures.count, true);
            });
    }

    document.querySelectorAll('#controls input').forEach(function (input) {
        input.addEventListener('change', update);
    });

    document.querySelectorAll('#tbl td').forEach(function (cell) {
        cell.addEventListener('click', function () {
            const params = new URLSearchParams({
                row: cell.dataset.row,
                column: cell.dataset.column,
                column_id: cell.dataset.columnId,
            });
            fetch('/api/active-cell?' + params.toString())
                .then(function (resp) { return resp.text(); })
                .then(function (text) {
                    document.getElementById('tbl_out').textContent = text;
                });
        });
    });

    update();
});
"#;

fn detail_cells(detail: &DealDetail) -> [&str; 4] {
    [
        detail.name.as_str(),
        detail.date.as_str(),
        detail.series.as_str(),
        detail.description.as_str(),
    ]
}

fn month_slider(min_month: u32, max_month: u32) -> Markup {
    html! {
        div style="width: 44%; display: inline-block" {
            div { "Select range of months to look into" }
            br;
            div id="my-range-slider" {
                input type="range" id="month-lo" name="lo"
                    min=(min_month) max=(max_month) step="1" value=(min_month);
                input type="range" id="month-hi" name="hi"
                    min=(min_month) max=(max_month) step="1" value=(max_month);
                span id="month-range-label" { (min_month) " - " (max_month) }
            }
        }
    }
}

fn radio_group(id: &str, heading: &str, options: &[(&str, &str)], selected: &str) -> Markup {
    html! {
        div style="width: 22%; display: inline-block" {
            div { (heading) }
            div id=(id) {
                @for (value, text) in options {
                    label style="margin-right: 1em" {
                        input type="radio" name=(id) value=(value) checked[*value == selected];
                        " " (text)
                    }
                }
            }
        }
    }
}

fn series_checklist(series: &[String]) -> Markup {
    html! {
        div style="width: 99%; display: inline-block" {
            div { "Select funding series" }
            div id="series-selection" {
                @for name in series {
                    label style="margin-right: 1em" {
                        input type="checkbox" value=(name)
                            checked[DEFAULT_SERIES.contains(&name.as_str())];
                        " " (name)
                    }
                }
            }
        }
    }
}

fn detail_table(details: &[DealDetail]) -> Markup {
    html! {
        table id="tbl" style="text-align: left; border-collapse: collapse" {
            thead {
                tr {
                    @for column in DETAIL_COLUMNS {
                        th style="text-align: left; padding: 4px" { (column) }
                    }
                }
            }
            tbody {
                @for (row, detail) in details.iter().enumerate() {
                    tr {
                        @for (column, value) in detail_cells(detail).into_iter().enumerate() {
                            td style="text-align: left; padding: 4px; cursor: pointer"
                                data-row=(row)
                                data-column=(column)
                                data-column-id=(DETAIL_COLUMNS[column]) {
                                (value)
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn dashboard_page(tables: &DealTables) -> Markup {
    let (min_month, max_month) = tables.month_bounds();

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Deal flow dashboard" }
                script src=(ECHARTS_CDN) {}
                script { (PreEscaped(DASHBOARD_SCRIPT)) }
            }
            body {
                h1 { (PAGE_TITLE) }
                div id="controls" {
                    (month_slider(min_month, max_month))
                    div style="width: 9%; display: inline-block" {}
                    (radio_group(
                        "yaxis-type",
                        "Select scales for plots",
                        &[("linear", "Linear"), ("log", "Log")],
                        "linear",
                    ))
                    (radio_group(
                        "aggregation-selection",
                        "Select aggregation level of data",
                        &[("daily", "Daily (no aggregration)"), ("monthly", "Monthly")],
                        "daily",
                    ))
                    br;
                    br;
                    (series_checklist(tables.series()))
                }
                div id="graph-with-slider" style="width: 49%; height: 450px; display: inline-block" {}
                div id="graph-with-slider2" style="width: 49%; height: 450px; display: inline-block" {}
                label { "Click a cell in the table:" }
                (detail_table(&tables.details()))
                div id="tbl_out" role="alert" { (CLICK_PROMPT) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Deal;
    use chrono::NaiveDate;

    fn page() -> String {
        let date = |m, d| NaiveDate::from_ymd_opt(2022, m, d).unwrap();
        let tables = DealTables::build(vec![
            Deal::new("Acme", date(3, 1), "Series A", Some(5.0), "Rockets <fast>"),
            Deal::new("Initech", date(7, 4), "Seed", Some(1.0), "Software"),
        ]);
        dashboard_page(&tables).into_string()
    }

    #[test]
    fn page_declares_every_control() {
        let page = page();
        for id in [
            "my-range-slider",
            "yaxis-type",
            "aggregation-selection",
            "series-selection",
            "graph-with-slider",
            "graph-with-slider2",
            "tbl",
            "tbl_out",
        ] {
            assert!(page.contains(&format!("id=\"{}\"", id)), "missing {}", id);
        }
        assert!(page.contains(PAGE_TITLE));
    }

    #[test]
    fn slider_spans_loaded_months() {
        let page = page();
        assert!(page.contains("id=\"month-lo\" name=\"lo\" min=\"3\" max=\"7\""));
    }

    #[test]
    fn default_series_are_prechecked() {
        let page = page();
        assert!(page.contains("value=\"Series A\" checked"));
        assert!(!page.contains("value=\"Seed\" checked"));
    }

    #[test]
    fn table_cells_are_escaped() {
        let page = page();
        assert!(page.contains("Rockets &lt;fast&gt;"));
        assert!(page.contains("data-column-id=\"Description\""));
    }
}
