//! Accuracy layer of the pricelens resolver: fallback data sources,
//! validation, correction and accuracy bookkeeping.

pub mod alternative;
pub mod context;
pub mod enhancer;
pub mod error;
pub mod monitor;
pub mod store;
pub mod validator;

pub use alternative::{AlternativeDataSource, CuratedDatabase, LookupProvider, ProductId, RecordCache};
pub use context::ResolverContext;
pub use enhancer::{AccuracyEnhancer, CrossReference, PassThrough};
pub use error::{AccuracyError, LookupError, StoreError};
pub use monitor::AccuracyMonitor;
pub use store::{JsonFileStore, MetricsSnapshot, MetricsStore};
pub use validator::Validator;
