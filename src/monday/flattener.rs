//! Item flattener transformer
//!
//! Turns raw board items into [`Row`]s keyed by column id.

use super::{Item, Row};
use crate::error::SkipReason;
use crate::etl::{Transformed, Transformer};
use serde_json::Value;

/// Transformer from raw API items to flat rows
///
/// Items that are not objects, or whose `column_values` is not a list, are
/// skipped. Every column id is kept; choosing destination columns is the
/// loader's job.
///
/// # Example
/// ```
/// use monday_asset_sync::etl::Transformer;
/// use monday_asset_sync::monday::ItemFlattener;
/// use serde_json::json;
///
/// let row = ItemFlattener
///     .transform(json!({
///         "id": "1",
///         "name": "Site-A",
///         "column_values": [{"id": "status", "text": "Approved"}]
///     }))
///     .unwrap();
/// assert_eq!(row.get("item_id"), Some("1"));
/// assert_eq!(row.get("item_name"), Some("Site-A"));
/// assert_eq!(row.get("status"), Some("Approved"));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ItemFlattener;

impl Transformer for ItemFlattener {
    type Input = Value;
    type Output = Row;

    fn transform(&self, input: Self::Input) -> Result<Self::Output, SkipReason> {
        Item::from_value(&input).map(Row::from)
    }

    fn transform_many(&self, inputs: Vec<Self::Input>) -> Transformed<Self::Output> {
        if log::log_enabled!(log::Level::Debug) {
            for sample in inputs.iter().take(2) {
                log::debug!("Sample item: {}", sample);
            }
        }

        let batch =
            Transformed::from_results(inputs.into_iter().map(|input| self.transform(input)));

        log::info!("Total rows processed: {}", batch.items.len());
        batch
    }
}
