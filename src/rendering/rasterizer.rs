/// Splat rasterizer: projection, circular footprint fill, depth-gated blending
/// Sequential reference path plus stripe-parallel execution over rayon
use super::debug::{trace_splat, DebugMode, TraceDecision};
use super::framebuffer::{FrameSlice, Framebuffer};
use crate::camera::Camera;
use crate::error::RenderResult;
use crate::perf::FUNCTION_COUNTERS;
use crate::splat::Splat;
use crate::{count_add, count_call};
use glam::Vec3;
use rayon::prelude::*;
use std::ops::Add;

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Horizontal field of view in degrees
    pub fov_degrees: f32,
    /// Stages that emit per-splat trace events
    pub debug_mode: DebugMode,
    /// Maximum number of splats traced per frame
    pub trace_limit: usize,
    /// Rasterize horizontal stripes on the rayon pool instead of walking
    /// splats on the calling thread
    pub parallel: bool,
    /// Stripes per rayon thread; over-subscription helps load balancing
    pub stripes_per_thread: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 90.0,
            debug_mode: DebugMode::NONE,
            trace_limit: 10,
            parallel: true,
            stripes_per_thread: 4,
        }
    }
}

/// Per-frame splat classification counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub behind_camera: usize,
    pub outside_screen: usize,
    pub visible: usize,
}

impl RenderStats {
    #[inline]
    pub fn total(&self) -> usize {
        self.behind_camera + self.outside_screen + self.visible
    }

    #[inline]
    fn record(&mut self, projection: &Projection) {
        match projection {
            Projection::BehindCamera => self.behind_camera += 1,
            Projection::OutsideScreen { .. } => self.outside_screen += 1,
            Projection::Visible(_) => self.visible += 1,
        }
    }
}

impl Add for RenderStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            behind_camera: self.behind_camera + rhs.behind_camera,
            outside_screen: self.outside_screen + rhs.outside_screen,
            visible: self.visible + rhs.visible,
        }
    }
}

/// Screen-space footprint of a visible splat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedSplat {
    /// Index into the splat slice; defines the blend order
    pub index: usize,
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
    /// Camera-space distance along the view direction
    pub depth: f32,
    pub alpha: f32,
    /// Source color scaled to 0..=255
    pub color: [f32; 3],
}

impl ProjectedSplat {
    /// Inclusive pixel bounding box `(min_x, max_x, min_y, max_y)` clamped to
    /// the viewport. Only valid for splats that passed the screen cull, which
    /// guarantees a non-empty box.
    #[inline]
    pub fn pixel_bounds(&self, width: usize, height: usize) -> (usize, usize, usize, usize) {
        let max_x = (width - 1) as f32;
        let max_y = (height - 1) as f32;
        (
            (self.center_x - self.radius).max(0.0) as usize,
            (self.center_x + self.radius).min(max_x) as usize,
            (self.center_y - self.radius).max(0.0) as usize,
            (self.center_y + self.radius).min(max_y) as usize,
        )
    }
}

/// Result of transforming and culling one splat
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    BehindCamera,
    OutsideScreen { center_x: f32, center_y: f32, radius: f32 },
    Visible(ProjectedSplat),
}

/// Camera basis and viewport constants captured once per frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView {
    position: Vec3,
    right: Vec3,
    up: Vec3,
    front: Vec3,
    width: usize,
    height: usize,
    half_width: f32,
    half_height: f32,
    aspect_ratio: f32,
    fov_tan: f32,
}

impl FrameView {
    pub fn new(camera: &Camera, width: usize, height: usize, fov_degrees: f32) -> Self {
        Self {
            position: camera.position,
            right: camera.right(),
            up: camera.up(),
            front: camera.front(),
            width,
            height,
            half_width: width as f32 * 0.5,
            half_height: height as f32 * 0.5,
            aspect_ratio: width as f32 / height as f32,
            fov_tan: (fov_degrees.to_radians() * 0.5).tan(),
        }
    }

    /// Camera-space coordinates (right, up, front) of a world point
    #[inline]
    pub fn to_camera_space(&self, world: Vec3) -> Vec3 {
        let offset = world - self.position;
        Vec3::new(offset.dot(self.right), offset.dot(self.up), offset.dot(self.front))
    }

    /// Transform, project and cull one splat.
    #[inline]
    pub fn project(&self, index: usize, splat: &Splat) -> Projection {
        let cam = self.to_camera_space(splat.position());

        if cam.z <= 0.0 {
            return Projection::BehindCamera;
        }

        let scale = self.fov_tan * cam.z;
        let center_x = (cam.x / (self.aspect_ratio * scale)) * self.half_width + self.half_width;
        let center_y = -(cam.y / scale) * self.half_height + self.half_height;

        // Shrinks with distance; intentionally no field-of-view factor
        let radius = splat.scale() / cam.z * self.width as f32;

        let width = self.width as f32;
        let height = self.height as f32;
        let finite = center_x.is_finite() && center_y.is_finite() && radius.is_finite();
        if !finite
            || center_x + radius < 0.0
            || center_x - radius >= width
            || center_y + radius < 0.0
            || center_y - radius >= height
        {
            return Projection::OutsideScreen { center_x, center_y, radius };
        }

        let color = splat.color() * 255.0;
        Projection::Visible(ProjectedSplat {
            index,
            center_x,
            center_y,
            radius,
            depth: cam.z,
            alpha: splat.alpha(),
            color: color.to_array(),
        })
    }
}

/// Pixel sink for splat rasterization
pub trait PixelTarget {
    /// Full framebuffer width
    fn width(&self) -> usize;
    /// Full framebuffer height
    fn full_height(&self) -> usize;
    /// Global rows `[start, end)` this target may write
    fn row_span(&self) -> (usize, usize);
    /// Depth test (strictly nearer wins) then blend; true if accepted
    fn depth_test_and_blend(&mut self, x: usize, y: usize, depth: f32, alpha: f32, src: [f32; 3]) -> bool;
}

impl<'a> PixelTarget for FrameSlice<'a> {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn full_height(&self) -> usize {
        self.full_height
    }

    #[inline]
    fn row_span(&self) -> (usize, usize) {
        (self.y0, self.y0 + self.height)
    }

    #[inline]
    fn depth_test_and_blend(&mut self, x: usize, y: usize, depth: f32, alpha: f32, src: [f32; 3]) -> bool {
        FrameSlice::depth_test_and_blend(self, x, y, depth, alpha, src)
    }
}

/// Fill the circular footprint of `splat` into `target`, restricted to the
/// target's rows. Returns the number of pixels that passed the depth test.
pub fn rasterize_splat<T: PixelTarget>(splat: &ProjectedSplat, target: &mut T) -> usize {
    let (min_x, max_x, min_y, max_y) = splat.pixel_bounds(target.width(), target.full_height());
    let (row_start, row_end) = target.row_span();

    let y_start = min_y.max(row_start);
    let y_end = (max_y + 1).min(row_end);

    let mut written = 0usize;

    for y in y_start..y_end {
        let dy = (y as f32 - splat.center_y) / splat.radius;
        let dy_sq = dy * dy;

        for x in min_x..=max_x {
            let dx = (x as f32 - splat.center_x) / splat.radius;
            let dist_sq = dx * dx + dy_sq;

            // Circular footprint; also rejects NaN distances
            if !(dist_sq <= 1.0) {
                continue;
            }
            count_call!(FUNCTION_COUNTERS.pixels_tested);

            let alpha = splat.alpha * (-dist_sq).exp();
            if target.depth_test_and_blend(x, y, splat.depth, alpha, splat.color) {
                count_call!(FUNCTION_COUNTERS.depth_test_passed);
                written += 1;
            } else {
                count_call!(FUNCTION_COUNTERS.depth_test_failed);
            }
        }
    }

    written
}

/// Rendering engine: owns the frame buffers and per-thread stripe bins.
pub struct SplatRenderer {
    framebuffer: Framebuffer,
    config: RenderConfig,
    // Persistent bins to avoid reallocation every frame
    stripe_bins: Vec<Vec<usize>>,
    projections: Vec<Projection>,
}

impl SplatRenderer {
    pub fn new(width: usize, height: usize, config: RenderConfig) -> RenderResult<Self> {
        let framebuffer = Framebuffer::new(width, height)?;
        tracing::debug!(width, height, ?config, "splat renderer initialized");
        Ok(Self {
            framebuffer,
            config,
            stripe_bins: Vec::new(),
            projections: Vec::new(),
        })
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RenderConfig {
        &mut self.config
    }

    /// Reallocate the frame buffers for a new viewport.
    pub fn resize(&mut self, width: usize, height: usize) -> RenderResult<()> {
        self.framebuffer.resize(width, height)?;
        tracing::debug!(width, height, "frame buffers resized");
        Ok(())
    }

    /// Render one frame. Buffers are cleared first, so the result depends
    /// only on `splats`, `camera` and the configuration.
    pub fn render(&mut self, splats: &[Splat], camera: &Camera) -> RenderStats {
        count_call!(FUNCTION_COUNTERS.render_calls);
        crate::perf_scope!("render_frame");

        self.framebuffer.clear();

        let view = FrameView::new(
            camera,
            self.framebuffer.width(),
            self.framebuffer.height(),
            self.config.fov_degrees,
        );

        // --- 1. PROJECTION PASS ---
        self.projections.clear();
        if self.config.parallel {
            splats
                .par_iter()
                .enumerate()
                .map(|(i, splat)| view.project(i, splat))
                .collect_into_vec(&mut self.projections);
        } else {
            self.projections
                .extend(splats.iter().enumerate().map(|(i, splat)| view.project(i, splat)));
        }
        count_add!(FUNCTION_COUNTERS.splats_projected, splats.len() as u64);

        let mut stats = RenderStats::default();
        for projection in &self.projections {
            stats.record(projection);
        }

        if self.config.debug_mode.is_enabled() {
            self.trace_decisions(splats, &view);
        }

        // --- 2. RASTERIZATION PASS ---
        if self.config.parallel {
            self.rasterize_parallel();
        } else {
            self.rasterize_sequential();
        }

        tracing::debug!(
            behind_camera = stats.behind_camera,
            outside_screen = stats.outside_screen,
            visible = stats.visible,
            "frame rendered"
        );

        stats
    }

    /// Reference path: splat-index order over the whole buffer
    fn rasterize_sequential(&mut self) {
        let mut target = self.framebuffer.as_full_slice_mut();
        for projection in &self.projections {
            if let Projection::Visible(splat) = projection {
                rasterize_splat(splat, &mut target);
            }
        }
    }

    /// Stripe path: each stripe is owned by one worker and walks its bin in
    /// ascending splat index, so every pixel sees the sequential blend order.
    fn rasterize_parallel(&mut self) {
        let width = self.framebuffer.width();
        let height = self.framebuffer.height();
        let stripe_count = rayon::current_num_threads()
            .saturating_mul(self.config.stripes_per_thread.max(1))
            .min(height);
        let stripe_h = self.framebuffer.stripe_height(stripe_count);
        let used_stripes = height.div_ceil(stripe_h);

        // Resize and clear bins without deallocating inner Vec capacities
        if self.stripe_bins.len() < used_stripes {
            self.stripe_bins.resize_with(used_stripes, Vec::new);
        }
        for bin in self.stripe_bins.iter_mut() {
            bin.clear();
        }

        // --- 3. STRIPE BINNING ---
        // Bins hold indices into `projections`; only visible entries are binned
        let mut bins = std::mem::take(&mut self.stripe_bins);
        for (index, projection) in self.projections.iter().enumerate() {
            if let Projection::Visible(splat) = projection {
                let (_, _, min_y, max_y) = splat.pixel_bounds(width, height);
                for bin in &mut bins[min_y / stripe_h..=max_y / stripe_h] {
                    bin.push(index);
                }
            }
        }

        // --- 4. PARALLEL STRIPE RENDERING ---
        let projections = &self.projections;
        let slices = self.framebuffer.split_into_stripes(stripe_count);
        slices
            .into_par_iter()
            .zip(bins.par_iter())
            .filter(|(_, bin)| !bin.is_empty())
            .for_each(|(mut slice, bin)| {
                for &index in bin {
                    if let Projection::Visible(splat) = &projections[index] {
                        rasterize_splat(splat, &mut slice);
                    }
                }
            });

        self.stripe_bins = bins;
    }

    /// Bounded per-splat trace, in splat-index order
    fn trace_decisions(&self, splats: &[Splat], view: &FrameView) {
        let mode = self.config.debug_mode;
        let width = self.framebuffer.width();
        let height = self.framebuffer.height();

        for (index, (splat, projection)) in splats
            .iter()
            .zip(&self.projections)
            .enumerate()
            .take(self.config.trace_limit)
        {
            let decision = match *projection {
                Projection::BehindCamera => TraceDecision::BehindCamera,
                Projection::OutsideScreen { center_x, center_y, radius } => TraceDecision::OutsideScreen {
                    center: (center_x, center_y),
                    radius,
                },
                Projection::Visible(p) => TraceDecision::Visible {
                    center: (p.center_x, p.center_y),
                    radius: p.radius,
                    bounds: p.pixel_bounds(width, height),
                },
            };
            trace_splat(mode, index, splat.position(), view.to_camera_space(splat.position()), decision);
        }
    }
}
