use ndarray::Array2;

use crate::numeric::stats::robust_location_scale;

/// A single monochrome light frame: pixel values are f32, row-major,
/// shape = (height, width).
///
/// `stats`, `stars`, and `hfr` are derived metadata that must be recomputed
/// whenever `data` is mutated in place — this crate never mutates `data`
/// through a `Frame` without clearing them (see [`Frame::invalidate`]).
#[derive(Clone, Debug)]
pub struct Frame {
    pub data: Array2<f32>,
    pub stats: Option<FrameStats>,
    pub stars: Vec<Star>,
    pub hfr: Option<f64>,
}

impl Frame {
    pub fn new(data: Array2<f32>) -> Self {
        Self {
            data,
            stats: None,
            stars: Vec::new(),
            hfr: None,
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Clears derived metadata. Call after any in-place mutation of `data`.
    pub fn invalidate(&mut self) {
        self.stats = None;
        self.stars.clear();
        self.hfr = None;
    }

    /// Computes and caches [`FrameStats`] (robust location/scale plus plain
    /// min/max) from the current `data`, the precondition `find_stars` and
    /// `Background::new` both depend on (spec ss7 `MissingPrecondition`).
    pub fn compute_stats(&mut self) -> FrameStats {
        let flat: Vec<f32> = self.data.iter().copied().collect();
        let (location, scale) = robust_location_scale(flat);
        let min = self.data.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = self.data.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let stats = FrameStats { location, scale, min, max };
        self.stats = Some(stats);
        stats
    }
}

/// Robust global statistics for a frame: location/scale (robust analogs of
/// mean/stddev) plus plain min/max.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStats {
    pub location: f64,
    pub scale: f64,
    pub min: f32,
    pub max: f32,
}

/// A detected star.
///
/// `index` is the flat row-major index `x + width * y` into the frame that
/// produced it; `x`/`y` are the sub-pixel center-of-mass refined position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    pub index: usize,
    pub value: f32,
    pub x: f64,
    pub y: f64,
    pub mass: f64,
    pub hfr: f64,
}
