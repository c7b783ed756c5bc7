//! Pipeline orchestration for ETL operations

use super::{Extractor, Loader, Transformer};
use eyre::Result;

/// Where a pipeline run currently is
///
/// Runs move strictly forward: `Idle → Fetching → Transforming → Loading`,
/// ending in `Committed` or `RolledBack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Fetching,
    Transforming,
    Loading,
    Committed,
    RolledBack,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Transforming => "transforming",
            Self::Loading => "loading",
            Self::Committed => "committed",
            Self::RolledBack => "rolled back",
        };
        write!(f, "{}", name)
    }
}

/// Counts from a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunReport {
    pub extracted: usize,
    pub skipped: usize,
    pub loaded: usize,
}

/// ETL Pipeline that orchestrates Extract, Transform, and Load operations
///
/// # Type Parameters
/// - `E`: Extractor type
/// - `T`: Transformer type (must transform from E::Item)
/// - `L`: Loader type (must load T::Output)
///
/// # Example
/// ```no_run
/// use monday_asset_sync::etl::Pipeline;
/// # use monday_asset_sync::etl::{Extractor, Transformer, Loader};
/// # use monday_asset_sync::error::SkipReason;
/// # use eyre::Result;
/// # struct MyExtractor;
/// # impl Extractor for MyExtractor {
/// #     type Item = i32;
/// #     async fn extract(&self) -> Result<Vec<Self::Item>> { Ok(vec![]) }
/// # }
/// # struct MyTransformer;
/// # impl Transformer for MyTransformer {
/// #     type Input = i32;
/// #     type Output = i32;
/// #     fn transform(&self, input: Self::Input) -> Result<Self::Output, SkipReason> { Ok(input) }
/// # }
/// # struct MyLoader;
/// # impl Loader for MyLoader {
/// #     type Item = i32;
/// #     async fn load(&self, items: Vec<Self::Item>) -> Result<usize> { Ok(items.len()) }
/// # }
///
/// # async fn example() -> Result<()> {
/// let pipeline = Pipeline::new(MyExtractor, MyTransformer, MyLoader);
///
/// let report = pipeline.run().await?;
/// println!("Loaded {} rows", report.loaded);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor,
    T: Transformer<Input = E::Item>,
    L: Loader<Item = T::Output>,
{
    /// Create a new pipeline
    pub fn new(extractor: E, transformer: T, loader: L) -> Self {
        Self {
            extractor,
            transformer,
            loader,
        }
    }

    /// Run the complete ETL pipeline
    ///
    /// Steps:
    /// 1. Extract every item from the source
    /// 2. Transform each item, skipping the ones that cannot be used
    /// 3. Load the transformed items to the destination
    ///
    /// An empty extraction is still loaded so the destination mirrors the
    /// source.
    ///
    /// # Errors
    /// Returns an error if extraction or loading fails
    pub async fn run(&self) -> Result<RunReport> {
        log::debug!("Pipeline {}", Stage::Idle);

        log::info!("Pipeline {}", Stage::Fetching);
        let items = self.extractor.extract().await?;
        log::info!("Extracted {} items", items.len());
        if items.is_empty() {
            log::warn!("No items extracted, destination will be emptied");
        }
        let extracted = items.len();

        log::info!("Pipeline {}", Stage::Transforming);
        let batch = self.transformer.transform_many(items);
        log::info!(
            "Transformed {} items ({} skipped)",
            batch.items.len(),
            batch.skipped.len()
        );
        let skipped = batch.skipped.len();

        log::info!("Pipeline {}", Stage::Loading);
        let loaded = match self.loader.load(batch.items).await {
            Ok(count) => count,
            Err(e) => {
                log::error!("Pipeline {}", Stage::RolledBack);
                return Err(e);
            }
        };
        log::info!("Pipeline {}: loaded {} items", Stage::Committed, loaded);

        Ok(RunReport {
            extracted,
            skipped,
            loaded,
        })
    }
}
