//! Transformer trait for data transformation

use crate::error::SkipReason;

/// Transformer trait for transforming data items
///
/// A transformer never fails a batch. Each input either becomes an output or
/// is skipped with a [`SkipReason`], and the batch carries on.
///
/// # Example
/// ```
/// use monday_asset_sync::error::SkipReason;
/// use monday_asset_sync::etl::Transformer;
/// use serde_json::{Value, json};
///
/// struct ObjectsOnly;
///
/// impl Transformer for ObjectsOnly {
///     type Input = Value;
///     type Output = Value;
///
///     fn transform(&self, input: Self::Input) -> Result<Self::Output, SkipReason> {
///         match input.is_object() {
///             true => Ok(input),
///             false => Err(SkipReason::NotAMapping(input.to_string())),
///         }
///     }
/// }
///
/// let batch = ObjectsOnly.transform_many(vec![json!({"id": 1}), json!(7)]);
/// assert_eq!(batch.items.len(), 1);
/// assert_eq!(batch.skipped.len(), 1);
/// ```
pub trait Transformer: Send + Sync {
    /// Input item type
    type Input: Send;

    /// Output item type after transformation
    type Output: Send;

    /// Transform a single item, or say why it cannot be used
    fn transform(&self, input: Self::Input) -> Result<Self::Output, SkipReason>;

    /// Transform multiple items, collecting skips instead of stopping
    fn transform_many(&self, inputs: Vec<Self::Input>) -> Transformed<Self::Output> {
        Transformed::from_results(inputs.into_iter().map(|input| self.transform(input)))
    }
}

/// An input left out of a batch, by position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub index: usize,
    pub reason: SkipReason,
}

/// Result of transforming a batch
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed<T> {
    pub items: Vec<T>,
    pub skipped: Vec<Skipped>,
}

impl<T> Transformed<T> {
    /// Split per-item results into outputs and skips, logging each skip
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<T, SkipReason>>,
    {
        let mut batch = Self {
            items: Vec::new(),
            skipped: Vec::new(),
        };
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(output) => batch.items.push(output),
                Err(reason) => {
                    log::warn!("Skipping item {}: {}", index, reason);
                    batch.skipped.push(Skipped { index, reason });
                }
            }
        }
        batch
    }
}
