// src/services/spreadsheet.rs
use anyhow::{anyhow, bail, Context, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use log::{debug, info, warn};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::models::Deal;

pub const DEFAULT_DEALS_URL: &str =
    "https://raw.githubusercontent.com/stevenyoung93/dealFlowDashboard/main/DealsMarNov.xlsx";

/// Where the deal sheet is read from.
#[derive(Debug, Clone, PartialEq)]
pub enum DealSource {
    Url(String),
    Path(PathBuf),
}

impl DealSource {
    fn location(&self) -> &str {
        match self {
            DealSource::Url(url) => url,
            DealSource::Path(path) => path.to_str().unwrap_or_default(),
        }
    }

    pub fn format(&self) -> SheetFormat {
        SheetFormat::from_location(self.location())
    }
}

impl std::fmt::Display for DealSource {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DealSource::Url(url) => write!(f, "{}", url),
            DealSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Workbook,
    Csv,
}

impl SheetFormat {
    /// Picks the format from the file extension. Anything that is not `.csv`
    /// is handed to calamine, which sniffs xlsx/xls/ods itself.
    pub fn from_location(location: &str) -> Self {
        let without_query = location.split(['?', '#']).next().unwrap_or(location);
        let is_csv = Path::new(without_query)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv {
            SheetFormat::Csv
        } else {
            SheetFormat::Workbook
        }
    }
}

/// Download (or read) the deal sheet and parse every deal in it.
pub async fn load_deals(source: &DealSource) -> Result<Vec<Deal>> {
    info!("Loading deal sheet from {}", source);

    let bytes = match source {
        DealSource::Url(url) => reqwest::get(url)
            .await
            .with_context(|| format!("failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("deal sheet request to {} failed", url))?
            .bytes()
            .await
            .with_context(|| format!("failed to read body from {}", url))?
            .to_vec(),
        DealSource::Path(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
    };
    debug!("Read {} bytes of deal sheet", bytes.len());

    let deals = parse_deals(&bytes, source.format())
        .with_context(|| format!("failed to parse deal sheet from {}", source))?;
    info!("Parsed {} deals", deals.len());
    Ok(deals)
}

pub fn parse_deals(bytes: &[u8], format: SheetFormat) -> Result<Vec<Deal>> {
    let rows = match format {
        SheetFormat::Workbook => workbook_rows(bytes)?,
        SheetFormat::Csv => csv_rows(bytes)?,
    };
    deals_from_rows(rows)
}

/// Spreadsheet cell normalised across the csv and calamine readers.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Cell {
    fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) => text.trim().to_string(),
            Cell::Number(value) => value.to_string(),
            Cell::DateTime(value) => value.to_string(),
        }
    }
}

fn csv_rows(bytes: &[u8]) -> Result<Vec<Vec<Cell>>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.context("malformed CSV record")?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(rows)
}

fn workbook_rows(bytes: &[u8]) -> Result<Vec<Vec<Cell>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .context("not a readable workbook")?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("workbook has no worksheets"))?;
    debug!("Reading worksheet '{}'", sheet_name);

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("failed to read worksheet '{}'", sheet_name))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect())
}

fn workbook_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Float(v) => Cell::Number(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Bool(v) => Cell::Text(v.to_string()),
        Data::DateTime(v) => match v.as_datetime() {
            Some(dt) => Cell::DateTime(dt),
            None => Cell::Number(v.as_f64()),
        },
    }
}

/// Positions of the deal columns within a header row.
#[derive(Debug)]
struct Columns {
    name: usize,
    date: usize,
    series: usize,
    amount: Option<usize>,
    description: Option<usize>,
}

impl Columns {
    fn locate(header: &[Cell]) -> Result<Self> {
        let names: Vec<String> = header.iter().map(Cell::text).collect();
        let find = |wanted: &str| names.iter().position(|h| h == wanted);
        let require = |wanted: &str| {
            find(wanted).ok_or_else(|| anyhow!("no '{}' column in deal sheet header", wanted))
        };

        let amount = find("Amount_number").or_else(|| find("Amount"));
        if amount.is_none() {
            warn!("Deal sheet has no amount column, all amounts will be empty");
        }

        Ok(Columns {
            name: require("Name")?,
            date: require("Date")?,
            series: require("Series")?,
            amount,
            description: find("Description"),
        })
    }
}

fn deals_from_rows(rows: Vec<Vec<Cell>>) -> Result<Vec<Deal>> {
    let mut rows = rows.into_iter();
    let header = rows.next().ok_or_else(|| anyhow!("deal sheet is empty"))?;
    let columns = Columns::locate(&header)?;

    let mut deals = Vec::new();
    for (offset, row) in rows.enumerate() {
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        // +2 because sheet rows are 1-based and the first one is the header
        let row_num = offset + 2;
        let cell = |idx: usize| row.get(idx).cloned().unwrap_or(Cell::Empty);

        let date = parse_date(&cell(columns.date))
            .with_context(|| format!("row {}: unreadable Date", row_num))?;
        let name = cell(columns.name).text();
        let series = cell(columns.series).text();
        if name.is_empty() || series.is_empty() {
            warn!("row {}: skipping deal without Name or Series", row_num);
            continue;
        }
        let amount = columns.amount.and_then(|idx| parse_amount(&cell(idx)));
        let description = columns
            .description
            .map(|idx| cell(idx).text())
            .unwrap_or_default();

        deals.push(Deal::new(name, date, series, amount, description));
    }
    Ok(deals)
}

const TEXT_DATE_FORMATS: [&str; 2] = ["%B %d, %Y", "%Y-%m-%d"];

fn parse_date(cell: &Cell) -> Result<NaiveDate> {
    match cell {
        Cell::Empty => bail!("empty date cell"),
        Cell::DateTime(dt) => Ok(dt.date()),
        Cell::Number(serial) => excel_serial_date(*serial),
        Cell::Text(text) => {
            let text = text.trim();
            for format in TEXT_DATE_FORMATS {
                if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                    return Ok(date);
                }
            }
            // pandas writes datetimes with a time part
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
                return Ok(dt.date());
            }
            bail!("'{}' is not a recognised date", text)
        }
    }
}

fn excel_serial_date(serial: f64) -> Result<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        bail!("{} is not a spreadsheet date serial", serial);
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).ok_or_else(|| anyhow!("invalid epoch"))?;
    epoch
        .checked_add_signed(Duration::days(serial.trunc() as i64))
        .ok_or_else(|| anyhow!("date serial {} out of range", serial))
}

fn parse_amount(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(v) if v.is_finite() => Some(*v),
        Cell::Text(text) => text
            .trim()
            .trim_start_matches('$')
            .replace(',', "")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
,Name,Date,Series,Amount_number,Description
0,Acme,\"March 01, 2022\",Series A,5,Rockets
1,Globex,\"March 02, 2022\",Series A,3,Energy
2,Initech,\"April 15, 2022\",Seed,,Software
,,,,,
3,Umbrella,2022-11-30,Series B,12.5,Biotech
";

    #[test]
    fn parses_csv_sheet_and_derives_month() {
        let deals = parse_deals(SHEET.as_bytes(), SheetFormat::Csv).unwrap();

        assert_eq!(deals.len(), 4);
        assert_eq!(deals[0].name, "Acme");
        assert_eq!(deals[0].date, NaiveDate::from_ymd_opt(2022, 3, 1).unwrap());
        assert_eq!(deals[0].month, 3);
        assert_eq!(deals[0].amount, Some(5.0));
        assert_eq!(deals[2].amount, None);
        assert_eq!(deals[2].description, "Software");
        assert_eq!(deals[3].month, 11);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let sheet = "Name,Series,Amount_number\nAcme,Series A,5\n";
        let err = parse_deals(sheet.as_bytes(), SheetFormat::Csv).unwrap_err();
        assert!(format!("{:#}", err).contains("'Date'"));
    }

    #[test]
    fn unreadable_date_names_the_row() {
        let sheet = "Name,Date,Series\nAcme,\"March 01, 2022\",Seed\nGlobex,someday,Seed\n";
        let err = parse_deals(sheet.as_bytes(), SheetFormat::Csv).unwrap_err();
        assert!(format!("{:#}", err).contains("row 3"));
    }

    #[test]
    fn rows_without_name_or_series_are_skipped() {
        let sheet = "Name,Date,Series,Amount_number\n\
Acme,2022-03-01,,5\n\
,2022-03-02,Seed,3\n\
Globex,2022-03-03,Seed,4\n";
        let deals = parse_deals(sheet.as_bytes(), SheetFormat::Csv).unwrap();

        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].name, "Globex");
        assert_eq!(deals[0].series, "Seed");
    }

    #[test]
    fn only_listed_text_date_formats_are_accepted() {
        assert!(parse_date(&Cell::Text("03/01/2022".into())).is_err());
        assert_eq!(
            parse_date(&Cell::Text("March 01, 2022".into())).unwrap(),
            NaiveDate::from_ymd_opt(2022, 3, 1).unwrap()
        );
    }

    #[test]
    fn accepts_spreadsheet_serial_dates() {
        assert_eq!(
            parse_date(&Cell::Number(44621.0)).unwrap(),
            NaiveDate::from_ymd_opt(2022, 3, 1).unwrap()
        );
    }

    #[test]
    fn amount_text_is_cleaned() {
        assert_eq!(parse_amount(&Cell::Text("$1,200.5".into())), Some(1200.5));
        assert_eq!(parse_amount(&Cell::Text("undisclosed".into())), None);
        assert_eq!(parse_amount(&Cell::Empty), None);
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(SheetFormat::from_location("deals.csv"), SheetFormat::Csv);
        assert_eq!(
            SheetFormat::from_location("https://host/deals.CSV?raw=1"),
            SheetFormat::Csv
        );
        assert_eq!(SheetFormat::from_location(DEFAULT_DEALS_URL), SheetFormat::Workbook);
    }
}
