/// Framebuffer for software rendering
/// Stores RGB color bytes and camera-space depth per pixel
///
/// Memory layout:
/// - Hot metadata (width, height) stored first for bounds checking
/// - Color is packed RGB, 3 bytes per pixel, row 0 at the top
/// - Depth is one f32 per pixel in a separate allocation
use crate::count_call;
use crate::error::{RenderError, RenderResult};
use crate::perf::FUNCTION_COUNTERS;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{_mm256_set1_ps, _mm256_storeu_ps};

/// Bytes per color pixel (R, G, B)
pub const CHANNELS: usize = 3;

/// View into a contiguous set of rows in the framebuffer.
/// Used for multi-core rasterization where each worker owns a disjoint slice.
pub struct FrameSlice<'a> {
    pub width: usize,
    pub full_height: usize,
    pub y0: usize,
    pub height: usize,
    pub color: &'a mut [u8],
    pub depth: &'a mut [f32],
}

impl<'a> FrameSlice<'a> {
    /// Depth-test at (x, y_global) and, if `depth` is strictly nearer than the
    /// stored value, blend `src` over the stored color and record the depth.
    ///
    /// Returns false for pixels outside the slice or failing the depth test.
    #[inline]
    pub fn depth_test_and_blend(
        &mut self,
        x: usize,
        y_global: usize,
        depth: f32,
        alpha: f32,
        src: [f32; 3],
    ) -> bool {
        if x >= self.width || y_global < self.y0 {
            return false;
        }
        let y_local = y_global - self.y0;
        if y_local >= self.height {
            return false;
        }

        let index = y_local * self.width + x;
        if depth < self.depth[index] {
            let base = index * CHANNELS;
            let pixel = &mut self.color[base..base + CHANNELS];
            for (dst, &s) in pixel.iter_mut().zip(src.iter()) {
                *dst = blend_channel(*dst, s, alpha);
            }
            self.depth[index] = depth;
            true
        } else {
            false
        }
    }
}

/// Straight (non-premultiplied) over-compositing of one 0..=255 channel:
/// `(1 - alpha) * dst + alpha * src`, rounded to the nearest byte with ties
/// going to the even value.
#[inline]
pub fn blend_channel(dst: u8, src: f32, alpha: f32) -> u8 {
    let blended = (1.0 - alpha) * dst as f32 + alpha * src;
    blended.round_ties_even().clamp(0.0, 255.0) as u8
}

pub struct Framebuffer {
    // Hot data: used for every bounds check and index calculation
    width: usize,
    height: usize,
    color_buffer: Vec<u8>,
    depth_buffer: Vec<f32>,
}

impl Framebuffer {
    /// Allocate buffers for a `width` x `height` viewport.
    ///
    /// Allocation is fallible: the engine cannot run without its buffers, so
    /// failure is reported to the caller instead of aborting.
    pub fn new(width: usize, height: usize) -> RenderResult<Self> {
        let (pixels, bytes) = Self::buffer_lengths(width, height)?;

        let mut color_buffer = Vec::new();
        let mut depth_buffer = Vec::new();
        color_buffer
            .try_reserve_exact(bytes)
            .map_err(|source| RenderError::BufferAllocation { width, height, source })?;
        depth_buffer
            .try_reserve_exact(pixels)
            .map_err(|source| RenderError::BufferAllocation { width, height, source })?;
        color_buffer.resize(bytes, 0);
        depth_buffer.resize(pixels, f32::INFINITY);

        Ok(Self {
            width,
            height,
            color_buffer,
            depth_buffer,
        })
    }

    fn buffer_lengths(width: usize, height: usize) -> RenderResult<(usize, usize)> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidViewport { width, height });
        }
        let pixels = width
            .checked_mul(height)
            .ok_or(RenderError::ViewportTooLarge { width, height })?;
        let bytes = pixels
            .checked_mul(CHANNELS)
            .ok_or(RenderError::ViewportTooLarge { width, height })?;
        Ok((pixels, bytes))
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Reset color to black and depth to +infinity.
    pub fn clear(&mut self) {
        count_call!(FUNCTION_COUNTERS.framebuffer_clear_calls);
        self.color_buffer.fill(0);
        self.clear_depth();
    }

    #[inline]
    fn clear_depth(&mut self) {
        #[cfg(target_arch = "x86_64")]
        {
            if std::arch::is_x86_feature_detected!("avx") {
                // SAFETY: AVX support was just detected at runtime.
                unsafe {
                    return self.clear_depth_avx();
                }
            }
        }

        self.depth_buffer.fill(f32::INFINITY);
    }

    /// Fill the depth buffer 8 lanes at a time.
    #[cfg(target_arch = "x86_64")]
    #[target_feature(enable = "avx")]
    unsafe fn clear_depth_avx(&mut self) {
        let len = self.depth_buffer.len();
        let ptr = self.depth_buffer.as_mut_ptr();
        let inf = _mm256_set1_ps(f32::INFINITY);

        let mut i = 0usize;
        while i + 8 <= len {
            _mm256_storeu_ps(ptr.add(i), inf);
            i += 8;
        }
        // Tail
        self.depth_buffer[i..].fill(f32::INFINITY);
    }

    /// Packed RGB bytes, `width * height * 3` long, row 0 at the top.
    pub fn color_buffer(&self) -> &[u8] {
        &self.color_buffer
    }

    pub fn depth_buffer(&self) -> &[f32] {
        &self.depth_buffer
    }

    /// RGB triple at (x, y). Panics when out of bounds.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let base = (y * self.width + x) * CHANNELS;
        [
            self.color_buffer[base],
            self.color_buffer[base + 1],
            self.color_buffer[base + 2],
        ]
    }

    /// Depth at (x, y). Panics when out of bounds.
    #[inline]
    pub fn depth(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.depth_buffer[y * self.width + x]
    }

    /// Pack the RGB buffer into 0x00RRGGBB words for a presentation surface.
    /// Writes `min(out.len(), width * height)` pixels.
    pub fn write_xrgb(&self, out: &mut [u32]) {
        for (dst, rgb) in out.iter_mut().zip(self.color_buffer.chunks_exact(CHANNELS)) {
            *dst = ((rgb[0] as u32) << 16) | ((rgb[1] as u32) << 8) | rgb[2] as u32;
        }
    }

    /// Reallocate for a new viewport size. Contents are reset.
    pub fn resize(&mut self, width: usize, height: usize) -> RenderResult<()> {
        if width == self.width && height == self.height {
            return Ok(());
        }
        *self = Self::new(width, height)?;
        Ok(())
    }

    /// Create a FrameSlice covering the entire framebuffer
    pub fn as_full_slice_mut(&mut self) -> FrameSlice<'_> {
        FrameSlice {
            width: self.width,
            full_height: self.height,
            y0: 0,
            height: self.height,
            color: &mut self.color_buffer,
            depth: &mut self.depth_buffer,
        }
    }

    /// Rows per stripe when splitting into `stripes` stripes
    #[inline]
    pub fn stripe_height(&self, stripes: usize) -> usize {
        self.height.div_ceil(stripes.max(1))
    }

    /// Split the framebuffer into horizontal stripes for multi-core rendering.
    /// Each stripe owns a disjoint subset of rows, so they can be rendered in parallel.
    /// Stripe `i` starts at row `i * stripe_height(stripes)`.
    pub fn split_into_stripes(&mut self, stripes: usize) -> Vec<FrameSlice<'_>> {
        let width = self.width;
        let height = self.height;
        let rows_per_stripe = self.stripe_height(stripes);

        let mut slices = Vec::with_capacity(height.div_ceil(rows_per_stripe));

        let mut remaining_color: &mut [u8] = self.color_buffer.as_mut_slice();
        let mut remaining_depth: &mut [f32] = self.depth_buffer.as_mut_slice();

        let mut y0 = 0usize;
        while y0 < height {
            let rows = (height - y0).min(rows_per_stripe);
            let pixels = rows * width;

            let (color_head, color_tail) = remaining_color.split_at_mut(pixels * CHANNELS);
            let (depth_head, depth_tail) = remaining_depth.split_at_mut(pixels);

            slices.push(FrameSlice {
                width,
                full_height: height,
                y0,
                height: rows,
                color: color_head,
                depth: depth_head,
            });

            remaining_color = color_tail;
            remaining_depth = depth_tail;
            y0 += rows;
        }

        slices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_viewport_is_rejected() {
        assert!(matches!(
            Framebuffer::new(0, 10),
            Err(RenderError::InvalidViewport { width: 0, height: 10 })
        ));
        assert!(matches!(
            Framebuffer::new(usize::MAX, 2),
            Err(RenderError::ViewportTooLarge { .. })
        ));
    }

    #[test]
    fn clear_is_idempotent_over_any_contents() {
        let mut fb = Framebuffer::new(13, 7).unwrap();
        {
            let mut slice = fb.as_full_slice_mut();
            slice.color.fill(200);
            slice.depth.fill(3.0);
        }
        fb.clear();
        assert!(fb.color_buffer().iter().all(|&c| c == 0));
        assert!(fb.depth_buffer().iter().all(|&d| d == f32::INFINITY));
        fb.clear();
        assert!(fb.color_buffer().iter().all(|&c| c == 0));
        assert!(fb.depth_buffer().iter().all(|&d| d == f32::INFINITY));
    }

    #[test]
    fn stripes_cover_every_row_once() {
        let mut fb = Framebuffer::new(5, 17).unwrap();
        let stripe_h = fb.stripe_height(4);
        let slices = fb.split_into_stripes(4);
        let mut next_row = 0;
        for (i, slice) in slices.iter().enumerate() {
            assert_eq!(slice.y0, next_row);
            assert_eq!(slice.y0, i * stripe_h);
            assert_eq!(slice.color.len(), slice.height * 5 * CHANNELS);
            assert_eq!(slice.depth.len(), slice.height * 5);
            next_row += slice.height;
        }
        assert_eq!(next_row, 17);
    }

    #[test]
    fn blend_rejects_ties_and_farther_depths() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        let mut slice = fb.as_full_slice_mut();
        assert!(slice.depth_test_and_blend(1, 2, 2.0, 1.0, [255.0, 0.0, 0.0]));
        assert!(!slice.depth_test_and_blend(1, 2, 2.0, 1.0, [0.0, 255.0, 0.0]));
        assert!(!slice.depth_test_and_blend(1, 2, 5.0, 1.0, [0.0, 255.0, 0.0]));
        assert!(!slice.depth_test_and_blend(4, 0, 1.0, 1.0, [0.0, 255.0, 0.0]));
        assert_eq!(fb.pixel(1, 2), [255, 0, 0]);
        assert_eq!(fb.depth(1, 2), 2.0);
    }

    #[test]
    fn blend_rounds_half_to_even() {
        assert_eq!(blend_channel(1, 0.0, 0.5), 0);
        assert_eq!(blend_channel(5, 0.0, 0.5), 2);
        assert_eq!(blend_channel(3, 0.0, 0.5), 2);
        assert_eq!(blend_channel(0, 255.0, 0.5), 128);
        assert_eq!(blend_channel(0, 255.0, 1.0), 255);
        assert_eq!(blend_channel(200, 0.0, 0.0), 200);
    }

    #[test]
    fn resize_reallocates_and_resets() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        fb.as_full_slice_mut().color.fill(9);
        fb.resize(8, 2).unwrap();
        assert_eq!((fb.width(), fb.height()), (8, 2));
        assert_eq!(fb.color_buffer().len(), 8 * 2 * CHANNELS);
        assert!(fb.color_buffer().iter().all(|&c| c == 0));
        assert!(fb.resize(0, 2).is_err());
    }

    #[test]
    fn xrgb_packing() {
        let mut fb = Framebuffer::new(2, 1).unwrap();
        fb.as_full_slice_mut().color.copy_from_slice(&[1, 2, 3, 255, 128, 0]);
        let mut out = [0u32; 2];
        fb.write_xrgb(&mut out);
        assert_eq!(out, [0x0001_0203, 0x00FF_8000]);
    }
}
