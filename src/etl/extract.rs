//! Extractor trait for data extraction from various sources

use eyre::Result;

/// Extractor trait for extracting data from a source
///
/// # Example
/// ```no_run
/// use monday_asset_sync::etl::Extractor;
/// use eyre::Result;
///
/// struct FixedExtractor(Vec<String>);
///
/// impl Extractor for FixedExtractor {
///     type Item = String;
///
///     async fn extract(&self) -> Result<Vec<Self::Item>> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// The type of items extracted
    type Item: Send;

    /// Extract every item from the source
    ///
    /// # Errors
    /// Returns an error if extraction fails (network, parsing, etc.)
    fn extract(&self) -> impl std::future::Future<Output = Result<Vec<Self::Item>>> + Send;
}
