mod fit;
mod grid;
mod outliers;
mod render;
mod smooth;

use ndarray::Array2;
use tracing::debug;

use crate::frame::Star;
use crate::numeric::stats::robust_location_scale;

use grid::{bin_stars, compute_grid_layout};

/// A piecewise-bilinear sky background model fit to a star-masked grid over
/// a frame.
///
/// Built once per frame via [`Background::new`]; consumed by
/// [`Background::render`] / [`Background::subtract`]. See spec ss4.3.
#[derive(Clone, Debug)]
pub struct Background {
    pub width: usize,
    pub height: usize,
    pub grid_spacing: f64,
    pub grid_cells_x: usize,
    pub grid_cells_y: usize,
    pub grid_spacing_x: f64,
    pub grid_spacing_y: f64,
    pub cells: Vec<f32>,
    pub cell_stars: Vec<Vec<usize>>,
    pub outlier_cells: usize,
    pub min: f32,
    pub max: f32,
    pub hfr_factor: f32,
}

impl Background {
    /// Fits a background model to `src`.
    ///
    /// `grid_spacing` is the user-requested cell size in pixels; `sigma` is
    /// the per-cell trimmed-median clip sigma; `clip` is the number of
    /// outlier cells to detect and interpolate away (0 disables outlier
    /// clipping); `stars` excludes star-covered pixels from each cell's fit,
    /// using an exclusion radius of `star.hfr * hfr_factor`.
    pub fn new(
        src: &Array2<f32>,
        grid_spacing: f64,
        sigma: f32,
        clip: usize,
        stars: &[Star],
        hfr_factor: f32,
    ) -> Self {
        let (height, width) = src.dim();
        let layout = compute_grid_layout(width, height, grid_spacing);
        let cell_stars = bin_stars(stars, &layout, width, height, hfr_factor);

        let mut cells = vec![0.0f32; layout.cells_x * layout.cells_y];
        let mut med_buf = Vec::new();
        let mut mad_buf = Vec::new();
        for cy in 0..layout.cells_y {
            for cx in 0..layout.cells_x {
                let (x_start, x_end) = layout.cell_x_bounds(cx, width);
                let (y_start, y_end) = layout.cell_y_bounds(cy, height);
                let bound_stars: Vec<Star> = cell_stars[cy * layout.cells_x + cx]
                    .iter()
                    .map(|&i| stars[i])
                    .collect();
                cells[cy * layout.cells_x + cx] = fit::fit_cell(
                    src,
                    x_start,
                    x_end,
                    y_start,
                    y_end,
                    &bound_stars,
                    sigma,
                    hfr_factor,
                    &mut med_buf,
                    &mut mad_buf,
                );
            }
        }

        let fallback = {
            let flat: Vec<f32> = src.iter().cloned().collect();
            let (location, _) = robust_location_scale(flat);
            location as f32
        };
        let outlier_cells =
            outliers::clip_and_interpolate(&mut cells, layout.cells_x, layout.cells_y, clip, fallback);

        let cells = smooth::smooth_grid(&cells, layout.cells_x, layout.cells_y);

        let min = cells.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = cells.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        debug!(
            cells_x = layout.cells_x,
            cells_y = layout.cells_y,
            outlier_cells,
            "fit background grid"
        );

        Self {
            width,
            height,
            grid_spacing,
            grid_cells_x: layout.cells_x,
            grid_cells_y: layout.cells_y,
            grid_spacing_x: layout.spacing_x,
            grid_spacing_y: layout.spacing_y,
            cells,
            cell_stars,
            outlier_cells,
            min,
            max,
            hfr_factor,
        }
    }
}
