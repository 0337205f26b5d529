//! Track segmentation.
//!
//! Splits the normalized ping stream into provisional trips wherever the
//! time gap to the immediately preceding ping exceeds the configured
//! threshold. Boundaries are purely temporal; distance and speed play no
//! part here.

use std::mem;

use crate::Ping;

/// A contiguous run of pings between two time-gap boundaries.
///
/// `track_id` is the running count of boundaries seen before this trip
/// started: 0-based, monotonically increasing, and gappy after filtering
/// (final IDs are assigned later by reconciliation).
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionalTrip {
    pub track_id: u32,
    pub points: Vec<Ping>,
}

/// Partition pings into provisional trips.
///
/// The first ping's delta is taken as zero, so it never opens with a
/// boundary. Every ping lands in exactly one trip, and trip order matches
/// first-occurrence order in the input.
pub fn segment(points: Vec<Ping>, tracks_delta: f64) -> Vec<ProvisionalTrip> {
    let mut trips = Vec::new();
    let mut current: Vec<Ping> = Vec::new();
    let mut track_id = 0u32;
    let mut last_time: Option<i64> = None;

    for point in points {
        if let Some(prev) = last_time {
            let delta_min = (point.time - prev) as f64 / 60.0;
            if delta_min > tracks_delta {
                trips.push(ProvisionalTrip {
                    track_id,
                    points: mem::take(&mut current),
                });
                track_id += 1;
            }
        }
        last_time = Some(point.time);
        current.push(point);
    }

    if !current.is_empty() {
        trips.push(ProvisionalTrip {
            track_id,
            points: current,
        });
    }

    trips
}
