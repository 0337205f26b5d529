//! Elevation raster lookup.
//!
//! The elevation collaborator hands the pipeline a rectangular grid of
//! samples over a bounding box. The pipeline never assumes a continuous
//! elevation function; every read goes through the clamped coordinate-to-cell
//! mapping here, so a point just outside the box still resolves to the
//! nearest valid cell instead of erroring.

use serde::{Deserialize, Serialize};

use crate::error::{CleanError, Result};
use crate::Bounds;

/// A row-major elevation raster over a bounding box.
///
/// Row 0 sits at `min_lat`, column 0 at `min_lon`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationGrid {
    bounds: Bounds,
    rows: usize,
    cols: usize,
    samples: Vec<f64>,
}

impl ElevationGrid {
    /// Build a grid, validating that the sample count matches the shape.
    pub fn new(bounds: Bounds, rows: usize, cols: usize, samples: Vec<f64>) -> Result<Self> {
        if rows == 0 || cols == 0 || samples.len() != rows * cols {
            return Err(CleanError::Elevation(format!(
                "grid shape {rows}x{cols} does not match {} samples",
                samples.len()
            )));
        }
        Ok(Self {
            bounds,
            rows,
            cols,
            samples,
        })
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Map a coordinate to its grid cell.
    ///
    /// Out-of-range coordinates clamp to the nearest valid cell; a
    /// degenerate (zero-span) axis always maps to index 0.
    pub fn cell(&self, latitude: f64, longitude: f64) -> (usize, usize) {
        let row = clamp_axis(latitude, self.bounds.min_lat, self.bounds.max_lat, self.rows);
        let col = clamp_axis(longitude, self.bounds.min_lon, self.bounds.max_lon, self.cols);
        (row, col)
    }

    /// Elevation of the cell containing (or nearest to) the coordinate.
    pub fn sample(&self, latitude: f64, longitude: f64) -> f64 {
        let (row, col) = self.cell(latitude, longitude);
        self.samples[row * self.cols + col]
    }
}

fn clamp_axis(value: f64, min: f64, max: f64, cells: usize) -> usize {
    let span = max - min;
    if span <= 0.0 || cells <= 1 {
        return 0;
    }
    let index = ((value - min) / span * cells as f64).floor();
    if index < 0.0 {
        0
    } else {
        (index as usize).min(cells - 1)
    }
}
