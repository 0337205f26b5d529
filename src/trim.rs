//! Trip trimming and per-point metrics.
//!
//! Trips begin and end with the vehicle parked or crawling; those edge
//! samples are noise for trip semantics. This stage cuts them and computes
//! cumulative distance, duration, and (optionally) elevation gain over the
//! kept range only.

use std::ops::Range;

use geo::{Distance, Geodesic, Point};

use crate::elevation::ElevationGrid;
use crate::segment::ProvisionalTrip;
use crate::Ping;

/// A trimmed-trip point with its per-point metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPoint {
    pub ping: Ping,
    /// Geodesic distance to the previous kept point, km. Zero for the first.
    pub leg_km: f64,
    pub dist_total_km: f64,
    /// Minutes since the previous kept point. Zero for the first.
    pub leg_min: f64,
    pub duration_total_min: f64,
    pub elevation_m: Option<f64>,
    pub gain_total_m: Option<f64>,
}

/// A provisional trip after edge trimming; never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimmedTrip {
    pub track_id: u32,
    pub points: Vec<TripPoint>,
}

/// Trim a provisional trip's slow edges and compute per-point metrics.
///
/// The kept range runs from the first point whose speed exceeds `threshold`
/// through the last such point, inclusive. When no point exceeds the
/// threshold the whole trip is cut and `None` is returned; the all-slow trip
/// never reaches aggregation.
pub fn trim_and_measure(
    trip: ProvisionalTrip,
    threshold: u32,
    elevations: Option<&ElevationGrid>,
) -> Option<TrimmedTrip> {
    let range = trim_range(&trip.points, threshold)?;

    let mut pings = trip.points;
    pings.truncate(range.end);
    pings.drain(..range.start);

    let mut points = Vec::with_capacity(pings.len());
    let mut dist_total = 0.0;
    let mut duration_total = 0.0;
    let mut gain_total = 0.0;
    let mut prev: Option<(i64, f64, f64)> = None;
    let mut prev_elevation: Option<f64> = None;

    for ping in pings {
        let (leg_km, leg_min) = match prev {
            Some((time, lat, lon)) => (
                geodesic_km(lat, lon, ping.latitude, ping.longitude),
                (ping.time - time) as f64 / 60.0,
            ),
            None => (0.0, 0.0),
        };
        dist_total += leg_km;
        duration_total += leg_min;

        let (elevation_m, gain_total_m) = match elevations {
            Some(grid) => {
                let elevation = grid.sample(ping.latitude, ping.longitude);
                // The first point's "previous" elevation is its own: the
                // diff seed resets per trip, never carried across trips.
                let diff = elevation - prev_elevation.unwrap_or(elevation);
                gain_total += diff.max(0.0);
                prev_elevation = Some(elevation);
                (Some(elevation), Some(gain_total))
            }
            None => (None, None),
        };

        prev = Some((ping.time, ping.latitude, ping.longitude));
        points.push(TripPoint {
            ping,
            leg_km,
            dist_total_km: dist_total,
            leg_min,
            duration_total_min: duration_total,
            elevation_m,
            gain_total_m,
        });
    }

    Some(TrimmedTrip {
        track_id: trip.track_id,
        points,
    })
}

/// Index range of the points that survive edge trimming, or `None` when
/// trimming consumes the whole trip.
fn trim_range(points: &[Ping], threshold: u32) -> Option<Range<usize>> {
    let len = points.len();
    let start = points
        .iter()
        .position(|p| p.speed > threshold)
        .unwrap_or(0);
    let cut_from_end = points
        .iter()
        .rev()
        .position(|p| p.speed > threshold)
        .unwrap_or(len);
    let end = len - cut_from_end;

    if start < end {
        Some(start..end)
    } else {
        None
    }
}

/// Karney geodesic distance between two coordinates, in kilometers.
fn geodesic_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Geodesic::distance(Point::new(lon1, lat1), Point::new(lon2, lat2)) / 1000.0
}
