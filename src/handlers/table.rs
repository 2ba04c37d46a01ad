// src/handlers/table.rs
use log::debug;
use serde::Deserialize;
use std::convert::Infallible;

use crate::models::ActiveCell;

pub const CLICK_PROMPT: &str = "Click the table";

/// Query sent when a detail table cell is clicked. All fields are absent
/// when nothing is selected.
#[derive(Debug, Default, Deserialize)]
pub struct ActiveCellQuery {
    pub row: Option<usize>,
    pub column: Option<usize>,
    pub column_id: Option<String>,
}

impl ActiveCellQuery {
    pub fn active_cell(self) -> Option<ActiveCell> {
        match (self.row, self.column, self.column_id) {
            (Some(row), Some(column), Some(column_id)) => Some(ActiveCell {
                row,
                column,
                column_id,
            }),
            _ => None,
        }
    }
}

pub fn describe_active_cell(cell: Option<&ActiveCell>) -> String {
    match cell {
        Some(cell) => cell.to_string(),
        None => CLICK_PROMPT.to_string(),
    }
}

pub async fn get_active_cell(query: ActiveCellQuery) -> Result<impl warp::Reply, Infallible> {
    let cell = query.active_cell();
    debug!("Active table cell: {:?}", cell);
    Ok(describe_active_cell(cell.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_cell_returns_prompt() {
        assert_eq!(describe_active_cell(None), "Click the table");
        assert_eq!(
            describe_active_cell(ActiveCellQuery::default().active_cell().as_ref()),
            CLICK_PROMPT
        );
    }

    #[test]
    fn partial_query_counts_as_no_cell() {
        let query = ActiveCellQuery {
            row: Some(1),
            column: None,
            column_id: Some("Name".into()),
        };
        assert!(query.active_cell().is_none());
    }

    #[test]
    fn active_cell_is_echoed() {
        let cell = ActiveCell {
            row: 4,
            column: 1,
            column_id: "Date".into(),
        };
        assert_eq!(
            describe_active_cell(Some(&cell)),
            "{'row': 4, 'column': 1, 'column_id': 'Date'}"
        );
    }
}
