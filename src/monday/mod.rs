//! monday.com board items
//!
//! Extraction of raw items from a board and their flattening into rows.

mod extractor;
mod flattener;
mod items;

pub use extractor::BoardExtractor;
pub use flattener::ItemFlattener;
pub use items::{ColumnValue, ITEM_ID, ITEM_NAME, Item, Row};
