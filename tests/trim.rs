//! Tests for the trim module

use chrono::TimeZone;
use tripclean::{trim_and_measure, Bounds, ElevationGrid, Ping, ProvisionalTrip};

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn ping(time: i64, lat: f64, lon: f64, speed: u32, seq: usize) -> Ping {
    Ping {
        time,
        latitude: lat,
        longitude: lon,
        speed,
        local_time: chrono::Utc
            .timestamp_opt(time, 0)
            .unwrap()
            .with_timezone(&chrono_tz::Europe::Paris),
        seq,
    }
}

fn trip_with_speeds(speeds: &[u32]) -> ProvisionalTrip {
    let points = speeds
        .iter()
        .enumerate()
        .map(|(i, &s)| ping(i as i64 * 60, 48.85 + i as f64 * 0.001, 2.35, s, i))
        .collect();
    ProvisionalTrip {
        track_id: 0,
        points,
    }
}

#[test]
fn test_slow_edges_trimmed_to_single_point() {
    // Speeds [2, 20, 2] with threshold 5: both edges cut, one point left.
    let trimmed = trim_and_measure(trip_with_speeds(&[2, 20, 2]), 5, None).unwrap();
    assert_eq!(trimmed.points.len(), 1);
    assert_eq!(trimmed.points[0].ping.speed, 20);
    assert_eq!(trimmed.points[0].leg_km, 0.0);
    assert_eq!(trimmed.points[0].duration_total_min, 0.0);
}

#[test]
fn test_all_slow_trip_trims_to_nothing() {
    // Known edge case: when no point exceeds the threshold, the kept range
    // is empty and the whole trip is cut.
    assert!(trim_and_measure(trip_with_speeds(&[2, 3, 4]), 5, None).is_none());
}

#[test]
fn test_threshold_is_strictly_greater_than() {
    let trimmed = trim_and_measure(trip_with_speeds(&[5, 10, 5]), 5, None).unwrap();
    assert_eq!(trimmed.points.len(), 1);
    assert_eq!(trimmed.points[0].ping.speed, 10);
}

#[test]
fn test_trimming_removes_prefix_and_suffix_only() {
    // A slow point in the middle is kept: membership of the middle range
    // is untouched and order is preserved.
    let trimmed = trim_and_measure(trip_with_speeds(&[2, 10, 3, 12, 2]), 5, None).unwrap();
    let speeds: Vec<u32> = trimmed.points.iter().map(|p| p.ping.speed).collect();
    assert_eq!(speeds, vec![10, 3, 12]);
}

#[test]
fn test_fast_edges_keep_everything() {
    let trimmed = trim_and_measure(trip_with_speeds(&[10, 2, 10]), 5, None).unwrap();
    assert_eq!(trimmed.points.len(), 3);
}

#[test]
fn test_geodesic_distance_accumulates() {
    // 0.001 degrees of latitude is roughly 111 m on the WGS84 ellipsoid.
    let points = vec![
        ping(0, 48.850, 2.35, 20, 0),
        ping(60, 48.851, 2.35, 20, 1),
        ping(120, 48.852, 2.35, 20, 2),
    ];
    let trimmed = trim_and_measure(
        ProvisionalTrip {
            track_id: 0,
            points,
        },
        5,
        None,
    )
    .unwrap();

    assert_eq!(trimmed.points[0].leg_km, 0.0);
    assert!(approx_eq(trimmed.points[1].leg_km, 0.111, 0.005));
    assert!(approx_eq(trimmed.points[2].dist_total_km, 0.222, 0.01));

    // Cumulative distance never decreases.
    for pair in trimmed.points.windows(2) {
        assert!(pair[1].dist_total_km >= pair[0].dist_total_km);
    }
}

#[test]
fn test_duration_legs_within_trimmed_range() {
    let points = vec![
        ping(0, 48.85, 2.35, 2, 0), // trimmed away
        ping(600, 48.85, 2.35, 20, 1),
        ping(660, 48.85, 2.35, 22, 2),
        ping(840, 48.85, 2.35, 21, 3),
    ];
    let trimmed = trim_and_measure(
        ProvisionalTrip {
            track_id: 0,
            points,
        },
        5,
        None,
    )
    .unwrap();

    // The first kept point does not inherit the gap to the trimmed-off
    // predecessor.
    let legs: Vec<f64> = trimmed.points.iter().map(|p| p.leg_min).collect();
    assert_eq!(legs, vec![0.0, 1.0, 3.0]);
    let totals: Vec<f64> = trimmed.points.iter().map(|p| p.duration_total_min).collect();
    assert_eq!(totals, vec![0.0, 1.0, 4.0]);
}

fn column_grid(samples: Vec<f64>) -> ElevationGrid {
    // One column, one row per unit of latitude starting at 0.
    let rows = samples.len();
    ElevationGrid::new(
        Bounds {
            min_lat: 0.0,
            max_lat: rows as f64,
            min_lon: 0.0,
            max_lon: 1.0,
        },
        rows,
        1,
        samples,
    )
    .unwrap()
}

#[test]
fn test_elevation_gain_ignores_descents() {
    // Elevations [100, 95, 110, 108]: diffs [0, -5, 15, -2], cumulative
    // gain [0, 0, 15, 15].
    let grid = column_grid(vec![100.0, 95.0, 110.0, 108.0]);
    let points = (0..4)
        .map(|i| ping(i as i64 * 60, i as f64 + 0.5, 0.5, 20, i))
        .collect();
    let trimmed = trim_and_measure(
        ProvisionalTrip {
            track_id: 0,
            points,
        },
        5,
        Some(&grid),
    )
    .unwrap();

    let elevations: Vec<f64> = trimmed.points.iter().map(|p| p.elevation_m.unwrap()).collect();
    assert_eq!(elevations, vec![100.0, 95.0, 110.0, 108.0]);
    let gains: Vec<f64> = trimmed.points.iter().map(|p| p.gain_total_m.unwrap()).collect();
    assert_eq!(gains, vec![0.0, 0.0, 15.0, 15.0]);
}

#[test]
fn test_elevation_seed_resets_per_trip() {
    // The first point's previous elevation is its own, even when another
    // trip ended at a very different altitude just before.
    let grid = column_grid(vec![50.0, 500.0]);
    let low = ProvisionalTrip {
        track_id: 0,
        points: vec![ping(0, 0.5, 0.5, 20, 0), ping(60, 0.5, 0.5, 21, 1)],
    };
    let high = ProvisionalTrip {
        track_id: 1,
        points: vec![ping(7200, 1.5, 0.5, 20, 2), ping(7260, 1.5, 0.5, 21, 3)],
    };

    let low = trim_and_measure(low, 5, Some(&grid)).unwrap();
    let high = trim_and_measure(high, 5, Some(&grid)).unwrap();

    assert_eq!(low.points[0].gain_total_m, Some(0.0));
    // 450 m between the trips never counts as a climb.
    assert_eq!(high.points[0].gain_total_m, Some(0.0));
    assert_eq!(high.points[1].gain_total_m, Some(0.0));
}

#[test]
fn test_no_grid_no_elevation_metrics() {
    let trimmed = trim_and_measure(trip_with_speeds(&[10, 12, 10]), 5, None).unwrap();
    assert!(trimmed.points.iter().all(|p| p.elevation_m.is_none()));
    assert!(trimmed.points.iter().all(|p| p.gain_total_m.is_none()));
}

#[test]
fn test_track_id_carried_through() {
    let mut trip = trip_with_speeds(&[10, 12, 10]);
    trip.track_id = 7;
    let trimmed = trim_and_measure(trip, 5, None).unwrap();
    assert_eq!(trimmed.track_id, 7);
}
