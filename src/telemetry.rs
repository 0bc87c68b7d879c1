//! Frame-rate telemetry over a sliding window.

use std::collections::VecDeque;

use serde::Serialize;

/// Samples kept in the sliding window.
pub const DEFAULT_WINDOW: usize = 100;

/// Aggregates over the current window, in frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FpsStats {
    pub latest: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Sliding-window frame-rate tracker.
///
/// Feed it a monotonic timestamp once per rendered frame; each pair of
/// consecutive timestamps contributes one instantaneous fps sample. The
/// first call only establishes the baseline, and non-positive deltas from a
/// stalled or stepped clock are dropped without a sample.
#[derive(Debug)]
pub struct FpsWindow {
    samples: VecDeque<f64>,
    capacity: usize,
    last_sample_ms: Option<f64>,
}

impl Default for FpsWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl FpsWindow {
    /// Window holding the last `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "fps window needs at least one sample");
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            last_sample_ms: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Record a frame rendered at `now_ms` milliseconds.
    pub fn record(&mut self, now_ms: f64) {
        let last = self.last_sample_ms.replace(now_ms);
        let Some(last) = last else { return };
        let delta = now_ms - last;
        if delta <= 0.0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(1000.0 / delta);
    }

    /// Aggregates over the window, or `None` before the second frame.
    pub fn stats(&self) -> Option<FpsStats> {
        let latest = *self.samples.back()?;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &fps in &self.samples {
            sum += fps;
            min = min.min(fps);
            max = max.max(fps);
        }
        Some(FpsStats {
            latest,
            mean: sum / self.samples.len() as f64,
            min,
            max,
        })
    }

    /// Render the window as the classic fps readout block.
    pub fn summary(&self) -> String {
        let Some(stats) = self.stats() else {
            return String::from("Frames per Second:\n         latest = -");
        };
        format!(
            "Frames per Second:\n         latest = {}\navg of last {} = {}\nmin of last {} = {}\nmax of last {} = {}",
            stats.latest.round(),
            self.capacity,
            stats.mean.round(),
            self.capacity,
            stats.min.round(),
            self.capacity,
            stats.max.round(),
        )
    }
}
