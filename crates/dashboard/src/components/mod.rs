//! Reusable view components.

pub mod product_table;

pub use product_table::{FilterControl, FilterField, HeaderCell, TableColumn, header_cells};
