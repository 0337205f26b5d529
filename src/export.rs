//! Map front-end export.
//!
//! Serializes the cleaned result into the JSON the map renderer consumes:
//! one record per trip carrying its path, per-point offsets from the trip
//! start, and the cumulative metrics.

use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::Result;
use crate::{CleanResult, TrackPoint};

/// One renderable trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackFeature {
    /// Renderer color bucket; a single-tracker deployment uses 0.
    pub vendor: u32,
    /// `[longitude, latitude]` pairs in trip order.
    pub path: Vec<[f64; 2]>,
    /// Seconds since the trip's first point.
    pub timestamps: Vec<i64>,
    /// Epoch seconds of the trip's first point.
    pub start: i64,
    /// Per-point speeds in km/h.
    pub speeds: Vec<u32>,
    /// Cumulative distance from the trip start, km.
    pub distances_km: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevations_m: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_gain_m: Option<Vec<f64>>,
}

/// Build one feature per trip, in trip-ID order.
pub fn build_features(result: &CleanResult) -> Vec<TrackFeature> {
    result
        .trips
        .iter()
        .map(|trip| {
            let points: Vec<&TrackPoint> = result
                .points
                .iter()
                .filter(|p| p.trip_id == trip.trip_id)
                .collect();
            let start = points.iter().map(|p| p.time).min().unwrap_or(0);

            TrackFeature {
                vendor: 0,
                path: points.iter().map(|p| [p.longitude, p.latitude]).collect(),
                timestamps: points.iter().map(|p| p.time - start).collect(),
                start,
                speeds: points.iter().map(|p| p.speed).collect(),
                distances_km: points.iter().map(|p| p.dist_total_km).collect(),
                elevations_m: points.iter().map(|p| p.elevation_m).collect(),
                elevation_gain_m: points.iter().map(|p| p.gain_total_m).collect(),
            }
        })
        .collect()
}

/// Write the per-trip features to a JSON file.
pub fn write_json(path: &Path, result: &CleanResult) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer(writer, &build_features(result))?;
    Ok(())
}

/// Write the trip summaries to a JSON file.
pub fn write_trips_json(path: &Path, result: &CleanResult) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer(writer, &result.trips)?;
    Ok(())
}
