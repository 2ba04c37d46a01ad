pub mod aggregation;
pub mod figures;
pub mod layout;
pub mod spreadsheet;
