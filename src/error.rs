//! Error types for the splat engine

use std::collections::TryReserveError;
use thiserror::Error;

/// Result type for engine operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while setting up or resizing the render target.
///
/// Nothing inside a frame fails: culling and data correction absorb every
/// degenerate input, so these only surface from buffer allocation.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid viewport {width}x{height}: both dimensions must be non-zero")]
    InvalidViewport { width: usize, height: usize },

    #[error("viewport {width}x{height} overflows the addressable buffer size")]
    ViewportTooLarge { width: usize, height: usize },

    #[error("failed to allocate frame buffers for {width}x{height}: {source}")]
    BufferAllocation {
        width: usize,
        height: usize,
        #[source]
        source: TryReserveError,
    },
}
