//! Monotonic progress shared between a running task and its observers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Cheaply cloneable progress cell in `[0, 1]`.
///
/// Values only ever increase: reporting a lower fraction than the current one
/// is ignored. Stored as the bit pattern of a non-negative `f32` (never
/// `-0.0`), whose integer ordering matches its float ordering.
#[derive(Clone, Debug, Default)]
pub struct ProgressReporter {
    bits: Arc<AtomicU32>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise progress to `fraction` (clamped to `[0, 1]`).
    pub fn report(&self, fraction: f32) {
        // `-0.0` has the sign bit set and would compare above every positive value.
        let fraction = if fraction.is_nan() || fraction <= 0.0 {
            0.0
        } else {
            fraction.min(1.0)
        };
        self.bits.fetch_max(fraction.to_bits(), Ordering::AcqRel);
    }

    pub fn complete(&self) {
        self.report(1.0);
    }

    pub fn value(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }
}
