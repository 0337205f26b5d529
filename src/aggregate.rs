//! Trip aggregation, filtering, and final ID reconciliation.
//!
//! Summarizes each trimmed trip, drops trips that do not look like genuine
//! vehicle trips (too slow, too fast, too short), renumbers the survivors
//! densely, and re-tags their points. Exclusion is all-or-nothing: a dropped
//! trip contributes no points to the output.

use chrono::DateTime;
use chrono_tz::Tz;
use log::debug;

use crate::trim::{TrimmedTrip, TripPoint};
use crate::{CleanConfig, TrackPoint, Trip};

/// Summary statistics for one trimmed trip, prior to filtering.
struct TripStats {
    start_date: DateTime<Tz>,
    end_date: DateTime<Tz>,
    max_speed: u32,
    dist_total_km: f64,
    gain_total_m: Option<f64>,
    duration_min: f64,
}

fn summarize(trip: &TrimmedTrip) -> TripStats {
    // Trimmed trips are never empty by construction.
    let mut start_date = trip.points[0].ping.local_time;
    let mut end_date = trip.points[0].ping.local_time;
    let mut max_speed = 0u32;

    for point in &trip.points {
        if point.ping.local_time < start_date {
            start_date = point.ping.local_time;
        }
        if point.ping.local_time > end_date {
            end_date = point.ping.local_time;
        }
        max_speed = max_speed.max(point.ping.speed);
    }

    let last = &trip.points[trip.points.len() - 1];
    let duration_min = (end_date - start_date).num_seconds() as f64 / 60.0;

    TripStats {
        start_date,
        end_date,
        max_speed,
        dist_total_km: last.dist_total_km,
        gain_total_m: last.gain_total_m,
        duration_min,
    }
}

fn passes_filters(stats: &TripStats, config: &CleanConfig) -> bool {
    // A zero-duration trip has no defined mean speed; it can never pass the
    // duration filter, which keeps the division below safe.
    if stats.duration_min <= 0.0 {
        return false;
    }
    stats.max_speed >= config.min_max_speed_for_valid_tracks
        && stats.max_speed <= config.max_max_speed_for_valid_tracks
        && stats.duration_min >= config.min_duration
}

/// Filter trimmed trips and reconcile IDs.
///
/// Survivors are renumbered 0..K-1 preserving provisional order; every
/// surviving point is re-tagged with its trip's final ID, and the points of
/// dropped trips are discarded entirely.
pub fn aggregate(trimmed: Vec<TrimmedTrip>, config: &CleanConfig) -> (Vec<Trip>, Vec<TrackPoint>) {
    let mut trips = Vec::new();
    let mut points = Vec::new();

    for trip in trimmed {
        let stats = summarize(&trip);
        if !passes_filters(&stats, config) {
            debug!(
                "dropping provisional trip {} (max_speed {} km/h, {:.1} min)",
                trip.track_id, stats.max_speed, stats.duration_min
            );
            continue;
        }

        let trip_id = trips.len() as u32;
        let mean_speed_kmh = stats.dist_total_km / (stats.duration_min / 60.0);

        trips.push(Trip {
            trip_id,
            formatted_start_date: stats.start_date.format("%Y-%m-%d,%H:%M").to_string(),
            start_date: stats.start_date,
            end_date: stats.end_date,
            max_speed: stats.max_speed,
            dist_total_km: stats.dist_total_km,
            elevation_gain_m: stats.gain_total_m,
            duration_min: stats.duration_min,
            mean_speed_kmh,
        });

        points.extend(
            trip.points
                .into_iter()
                .map(|point| into_track_point(trip_id, point)),
        );
    }

    (trips, points)
}

fn into_track_point(trip_id: u32, point: TripPoint) -> TrackPoint {
    TrackPoint {
        trip_id,
        time: point.ping.time,
        latitude: point.ping.latitude,
        longitude: point.ping.longitude,
        speed: point.ping.speed,
        local_time: point.ping.local_time,
        seq: point.ping.seq,
        leg_km: point.leg_km,
        dist_total_km: point.dist_total_km,
        leg_min: point.leg_min,
        duration_total_min: point.duration_total_min,
        elevation_m: point.elevation_m,
        gain_total_m: point.gain_total_m,
    }
}
