//! Tests for the aggregate module

use chrono::TimeZone;
use tripclean::{aggregate, trim_and_measure, CleanConfig, Ping, ProvisionalTrip, TrimmedTrip};

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn ping(time: i64, lat: f64, speed: u32, seq: usize) -> Ping {
    Ping {
        time,
        latitude: lat,
        longitude: 2.35,
        speed,
        local_time: chrono::Utc
            .timestamp_opt(time, 0)
            .unwrap()
            .with_timezone(&chrono_tz::Europe::Paris),
        seq,
    }
}

/// Build a trimmed trip starting at `start` with one point per entry in
/// `speeds`, spaced `step_secs` apart. Speeds must exceed 2 so nothing is
/// trimmed away here.
fn trimmed_trip(track_id: u32, start: i64, step_secs: i64, speeds: &[u32]) -> TrimmedTrip {
    let points = speeds
        .iter()
        .enumerate()
        .map(|(i, &s)| ping(start + i as i64 * step_secs, 48.85 + i as f64 * 0.001, s, i))
        .collect();
    trim_and_measure(
        ProvisionalTrip {
            track_id,
            points,
        },
        2,
        None,
    )
    .unwrap()
}

const T0: i64 = 1_740_909_600; // 2025-03-02T10:00:00Z, 11:00 in Paris

#[test]
fn test_trip_summary_fields() {
    let (trips, points) = aggregate(
        vec![trimmed_trip(3, T0, 60, &[10, 30, 20, 12])],
        &CleanConfig::default(),
    );

    assert_eq!(trips.len(), 1);
    let trip = &trips[0];
    assert_eq!(trip.trip_id, 0);
    assert_eq!(trip.max_speed, 30);
    assert!(approx_eq(trip.duration_min, 3.0, 1e-9));
    assert_eq!(trip.formatted_start_date, "2025-03-02,11:00");
    assert_eq!(trip.start_date.timestamp(), T0);
    assert_eq!(trip.end_date.timestamp(), T0 + 180);
    assert_eq!(trip.elevation_gain_m, None);

    // dist_total is the final cumulative distance of the trip's points.
    let last = points.last().unwrap();
    assert_eq!(trip.dist_total_km, last.dist_total_km);

    // mean speed = km / hours.
    let expected = trip.dist_total_km / (trip.duration_min / 60.0);
    assert!(approx_eq(trip.mean_speed_kmh, expected, 1e-9));
}

#[test]
fn test_slow_trip_dropped_entirely() {
    // Max speed 4 with a valid-speed floor of 5: the trip and all of its
    // points disappear from the output.
    let (trips, points) = aggregate(
        vec![trimmed_trip(0, T0, 60, &[3, 4, 3, 4])],
        &CleanConfig::default(),
    );
    assert!(trips.is_empty());
    assert!(points.is_empty());
}

#[test]
fn test_fast_trip_dropped_entirely() {
    let (trips, points) = aggregate(
        vec![trimmed_trip(0, T0, 60, &[30, 90, 30, 25])],
        &CleanConfig::default(),
    );
    assert!(trips.is_empty());
    assert!(points.is_empty());
}

#[test]
fn test_speed_bounds_are_inclusive() {
    let config = CleanConfig::default();
    let at_floor = aggregate(vec![trimmed_trip(0, T0, 60, &[5, 5, 5, 5])], &config);
    assert_eq!(at_floor.0.len(), 1);

    let at_ceiling = aggregate(vec![trimmed_trip(0, T0, 60, &[30, 55, 30, 20])], &config);
    assert_eq!(at_ceiling.0.len(), 1);
}

#[test]
fn test_short_trip_dropped() {
    // Two minutes total with min_duration = 3.
    let (trips, _) = aggregate(
        vec![trimmed_trip(0, T0, 60, &[10, 30, 20])],
        &CleanConfig::default(),
    );
    assert!(trips.is_empty());

    // Exactly three minutes passes.
    let (trips, _) = aggregate(
        vec![trimmed_trip(0, T0, 60, &[10, 30, 20, 12])],
        &CleanConfig::default(),
    );
    assert_eq!(trips.len(), 1);
}

#[test]
fn test_zero_duration_trip_never_passes() {
    // A single-point trip has zero duration and no defined mean speed; it
    // is dropped even when min_duration is zero, before any division.
    let config = CleanConfig {
        min_duration: 0.0,
        ..CleanConfig::default()
    };
    let (trips, points) = aggregate(vec![trimmed_trip(0, T0, 60, &[30])], &config);
    assert!(trips.is_empty());
    assert!(points.is_empty());
}

#[test]
fn test_surviving_trips_renumbered_densely() {
    // Provisional IDs 2, 5, 9; the middle one fails the speed filter.
    let trimmed = vec![
        trimmed_trip(2, T0, 60, &[10, 30, 20, 12]),
        trimmed_trip(5, T0 + 3600, 60, &[3, 4, 3, 4]),
        trimmed_trip(9, T0 + 7200, 60, &[10, 25, 20, 12]),
    ];
    let (trips, points) = aggregate(trimmed, &CleanConfig::default());

    let ids: Vec<u32> = trips.iter().map(|t| t.trip_id).collect();
    assert_eq!(ids, vec![0, 1]);

    // Order of survivors matches provisional order.
    assert!(trips[0].start_date < trips[1].start_date);

    // Points carry the final IDs only.
    assert!(points.iter().all(|p| p.trip_id == 0 || p.trip_id == 1));
    assert_eq!(points.iter().filter(|p| p.trip_id == 0).count(), 4);
    assert_eq!(points.iter().filter(|p| p.trip_id == 1).count(), 4);
}

#[test]
fn test_every_trip_has_points() {
    let trimmed = vec![
        trimmed_trip(0, T0, 60, &[10, 30, 20, 12]),
        trimmed_trip(1, T0 + 3600, 60, &[10, 25, 20, 12]),
    ];
    let (trips, points) = aggregate(trimmed, &CleanConfig::default());
    for trip in &trips {
        assert!(points.iter().any(|p| p.trip_id == trip.trip_id));
    }
}

#[test]
fn test_empty_input() {
    let (trips, points) = aggregate(Vec::new(), &CleanConfig::default());
    assert!(trips.is_empty());
    assert!(points.is_empty());
}
