pub mod debug;
pub mod framebuffer;
/// Software splat rasterization pipeline
/// Depth-gated compositing into an owned RGB framebuffer
pub mod rasterizer;

pub use debug::DebugMode;
pub use framebuffer::{FrameSlice, Framebuffer};
pub use rasterizer::{
    rasterize_splat, FrameView, PixelTarget, ProjectedSplat, Projection, RenderConfig, RenderStats,
    SplatRenderer,
};
