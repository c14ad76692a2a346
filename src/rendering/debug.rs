/// Per-splat decision tracing
/// Bounded, bitmask-gated diagnostics routed through `tracing`
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use glam::Vec3;

/// Target for per-splat trace events, so they can be filtered independently
/// of the per-frame summary (e.g. `RUST_LOG=splat_engine::trace=debug`).
pub const TRACE_TARGET: &str = "splat_engine::trace";

/// Which pipeline stages emit per-splat trace events.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DebugMode(u8);

impl DebugMode {
    pub const NONE: Self = Self(0);
    pub const TRANSFORM: Self = Self(1);
    pub const PROJECTION: Self = Self(2);
    pub const RENDERING: Self = Self(4);
    pub const ALL: Self = Self(1 | 2 | 4);

    /// Unknown bits are dropped.
    #[inline]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn is_enabled(self) -> bool {
        self.0 != 0
    }
}

impl BitOr for DebugMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DebugMode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for DebugMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_enabled() {
            return f.write_str("DebugMode(NONE)");
        }
        let mut names = Vec::with_capacity(3);
        if self.contains(Self::TRANSFORM) {
            names.push("TRANSFORM");
        }
        if self.contains(Self::PROJECTION) {
            names.push("PROJECTION");
        }
        if self.contains(Self::RENDERING) {
            names.push("RENDERING");
        }
        write!(f, "DebugMode({})", names.join(" | "))
    }
}

/// Outcome of projecting one splat, as reported in traces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraceDecision {
    BehindCamera,
    OutsideScreen { center: (f32, f32), radius: f32 },
    Visible {
        center: (f32, f32),
        radius: f32,
        bounds: (usize, usize, usize, usize),
    },
}

/// Emit trace events for one splat according to `mode`.
pub fn trace_splat(mode: DebugMode, index: usize, world: Vec3, camera_space: Vec3, decision: TraceDecision) {
    if mode.contains(DebugMode::TRANSFORM) {
        tracing::debug!(
            target: TRACE_TARGET,
            splat = index,
            world = ?world,
            camera = ?camera_space,
            "transform"
        );
    }

    match decision {
        TraceDecision::BehindCamera => {
            if mode.contains(DebugMode::TRANSFORM) {
                tracing::debug!(target: TRACE_TARGET, splat = index, depth = camera_space.z, "behind camera");
            }
        }
        TraceDecision::OutsideScreen { center, radius } => {
            if mode.contains(DebugMode::PROJECTION) {
                tracing::debug!(
                    target: TRACE_TARGET,
                    splat = index,
                    x = center.0,
                    y = center.1,
                    radius,
                    "outside screen"
                );
            }
        }
        TraceDecision::Visible { center, radius, bounds } => {
            if mode.contains(DebugMode::PROJECTION) {
                tracing::debug!(
                    target: TRACE_TARGET,
                    splat = index,
                    x = center.0,
                    y = center.1,
                    radius,
                    "projected"
                );
            }
            if mode.contains(DebugMode::RENDERING) {
                let (min_x, max_x, min_y, max_y) = bounds;
                tracing::debug!(
                    target: TRACE_TARGET,
                    splat = index,
                    min_x,
                    max_x,
                    min_y,
                    max_y,
                    "rasterizing"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmask_combines_and_queries() {
        let mode = DebugMode::TRANSFORM | DebugMode::RENDERING;
        assert!(mode.contains(DebugMode::TRANSFORM));
        assert!(!mode.contains(DebugMode::PROJECTION));
        assert!(mode.is_enabled());
        assert!(!DebugMode::NONE.is_enabled());
        assert_eq!(DebugMode::from_bits_truncate(0xFF), DebugMode::ALL);
        assert_eq!(format!("{:?}", mode), "DebugMode(TRANSFORM | RENDERING)");
    }
}
