//! End-to-end cleaning pipeline.
//!
//! Each stage produces a new sequence; nothing upstream is mutated. The
//! per-trip trim/metrics stage has no cross-trip dependency and fans out
//! over rayon when the `parallel` feature is enabled — order within each
//! trip, and across trips, is preserved either way.

use log::info;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::aggregate::aggregate;
use crate::elevation::ElevationGrid;
use crate::error::{CleanError, Result};
use crate::normalize::normalize;
use crate::segment::{segment, ProvisionalTrip};
use crate::trim::{trim_and_measure, TrimmedTrip};
use crate::{CleanConfig, CleanResult, PointBatch};

/// Clean raw vendor batches into trips and points.
///
/// `elevations` is the collaborator-supplied raster; it is required when
/// `config.get_elevations` is set and ignored otherwise. Re-running on
/// identical input and config yields an identical result, including trip-ID
/// assignment order. No points, or no surviving trips, is a valid empty
/// result, not an error.
pub fn clean(
    batches: &[PointBatch],
    config: &CleanConfig,
    elevations: Option<&ElevationGrid>,
) -> Result<CleanResult> {
    let grid = if config.get_elevations {
        Some(elevations.ok_or_else(|| {
            CleanError::Elevation("get_elevations is set but no grid was supplied".to_string())
        })?)
    } else {
        None
    };

    let pings = normalize(batches, config)?;
    info!("normalized {} pings", pings.len());

    let provisional = segment(pings, config.tracks_delta);
    info!("segmented into {} provisional trips", provisional.len());

    let trimmed = trim_all(provisional, config.remove_start_end_points_speed, grid);

    let (trips, points) = aggregate(trimmed, config);
    info!("kept {} trips ({} points) after filtering", trips.len(), points.len());

    Ok(CleanResult { trips, points })
}

#[cfg(feature = "parallel")]
fn trim_all(
    trips: Vec<ProvisionalTrip>,
    threshold: u32,
    grid: Option<&ElevationGrid>,
) -> Vec<TrimmedTrip> {
    trips
        .into_par_iter()
        .filter_map(|trip| trim_and_measure(trip, threshold, grid))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn trim_all(
    trips: Vec<ProvisionalTrip>,
    threshold: u32,
    grid: Option<&ElevationGrid>,
) -> Vec<TrimmedTrip> {
    trips
        .into_iter()
        .filter_map(|trip| trim_and_measure(trip, threshold, grid))
        .collect()
}
