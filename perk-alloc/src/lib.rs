pub mod allocator;
pub mod fallback;
pub mod history;
pub mod placeholder;
pub mod recorder;
pub mod selection;

#[cfg(test)]
pub(crate) mod testutil;

pub use allocator::Allocator;
pub use fallback::{FallbackResolver, Tier};
pub use history::ExposureHistory;
pub use recorder::ExposureRecorder;

/// Failure of the allocation read path. Always degrades to placeholders
/// at the boundary, never surfaces to the caller.
#[derive(Debug, thiserror::Error)]
pub enum AllocError {
    #[error("store query failed: {0}")]
    Store(perk_core::repository::BoxError),

    #[error("store query timed out after {0:?}")]
    Timeout(std::time::Duration),
}
