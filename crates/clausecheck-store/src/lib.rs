//! Storage layer: static country guides and sample contracts on disk.

mod error;
pub use error::StoreError;

mod guides;
pub use guides::GuideStore;

mod samples;
pub use samples::{SampleCatalogue, SampleContract};
