//! Domain to pixel scales
//!
//! Controllers keep the scales of their latest render and invert gesture
//! coordinates against them immediately, so a selection is always stored in
//! data units.

/// Linear mapping between a numeric domain and a pixel range.
/// The range may be reversed (y axes grow downwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Domain value to pixel. A zero-width domain maps to the middle of the range.
    pub fn apply(&self, value: f64) -> f32 {
        let (d0, d1) = self.domain;
        let (r0, r1) = (self.range.0 as f64, self.range.1 as f64);
        let t = if d1 == d0 { 0.5 } else { (value - d0) / (d1 - d0) };
        (r0 + t * (r1 - r0)) as f32
    }

    /// Pixel to domain value
    pub fn invert(&self, pixel: f32) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = (self.range.0 as f64, self.range.1 as f64);
        if r1 == r0 {
            return d0;
        }
        d0 + (pixel as f64 - r0) / (r1 - r0) * (d1 - d0)
    }

    /// Evenly spaced tick values across the domain
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        if count < 2 || d1 == d0 {
            return vec![d0];
        }
        let step = (d1 - d0) / (count - 1) as f64;
        (0..count).map(|i| d0 + step * i as f64).collect()
    }
}

/// Evenly sized bands for `count` discrete values with equal inner and outer
/// padding, expressed as a fraction of the step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    count: usize,
    range: (f32, f32),
    padding: f32,
}

impl BandScale {
    pub fn new(count: usize, range: (f32, f32), padding: f32) -> Self {
        Self {
            count,
            range,
            padding: padding.clamp(0.0, 1.0),
        }
    }

    /// Distance between the starts of adjacent bands
    pub fn step(&self) -> f32 {
        let n = self.count as f32;
        let span = self.range.1 - self.range.0;
        span / (n - self.padding + 2.0 * self.padding).max(1.0)
    }

    pub fn bandwidth(&self) -> f32 {
        self.step() * (1.0 - self.padding)
    }

    /// Start pixel of band `index`, `None` when out of range
    pub fn band(&self, index: usize) -> Option<f32> {
        if index >= self.count {
            return None;
        }
        let step = self.step();
        let outer = step * self.padding;
        Some(self.range.0 + outer + step * index as f32)
    }

    /// Band index under a pixel, counted from the range start in whole steps
    /// and clamped to the valid indices
    pub fn index_at(&self, pixel: f32) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let step = self.step();
        if step == 0.0 || !pixel.is_finite() {
            return None;
        }
        let raw = ((pixel - self.range.0) / step).floor();
        Some(raw.clamp(0.0, (self.count - 1) as f32) as usize)
    }
}
