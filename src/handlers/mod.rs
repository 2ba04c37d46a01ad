pub mod error;
pub mod figures;
pub mod page;
pub mod table;
