//! Synthetic tracker-ping generator for tests and benchmarking.
//!
//! Produces vendor-shaped point batches with a known trip structure, giving
//! ground truth for validating the cleaning pipeline: a fixed number of
//! trips separated by silence gaps, each opening and closing with slow edge
//! points around a jittered cruise.
//!
//! # Example
//!
//! ```rust
//! use tripclean::synthetic::SyntheticScenario;
//! use tripclean::{clean, CleanConfig};
//!
//! let scenario = SyntheticScenario {
//!     trip_count: 3,
//!     points_per_trip: 10,
//!     ..SyntheticScenario::default()
//! };
//!
//! let batches = scenario.generate();
//! let result = clean(&batches, &CleanConfig::default(), None).unwrap();
//! assert_eq!(result.trips.len(), 3);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

use crate::PointBatch;

/// Vendor page size mirrored by the generator.
const BATCH_SIZE: usize = 200;

/// Degrees of latitude advanced per ping while cruising (~55 m at 60 s).
const LAT_STEP: f64 = 0.0005;

/// Scenario configuration for generating synthetic data.
#[derive(Debug, Clone)]
pub struct SyntheticScenario {
    /// Latitude of the first ping.
    pub origin_lat: f64,
    /// Longitude of the first ping.
    pub origin_lon: f64,
    /// Number of trips to generate.
    pub trip_count: usize,
    /// Pings per trip, including one slow edge point at each end.
    pub points_per_trip: usize,
    /// Seconds between consecutive pings within a trip.
    pub ping_interval_secs: i64,
    /// Minutes of silence between consecutive trips.
    pub gap_minutes: i64,
    /// Cruise speed in km/h for mid-trip points.
    pub cruise_speed: u32,
    /// Epoch seconds of the first ping (after the sentinel).
    pub start_time: i64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl Default for SyntheticScenario {
    fn default() -> Self {
        Self {
            origin_lat: 48.8566,
            origin_lon: 2.3522,
            trip_count: 5,
            points_per_trip: 12,
            ping_interval_secs: 60,
            gap_minutes: 30,
            cruise_speed: 30,
            start_time: 1_740_909_600, // 2025-03-02T10:00:00Z
            seed: 42,
        }
    }
}

impl SyntheticScenario {
    /// Generate vendor-shaped batches, sentinel record included.
    ///
    /// Cells are emitted as JSON strings, exactly as the vendor sends them,
    /// so normalization's coercion path is exercised end to end.
    pub fn generate(&self) -> Vec<PointBatch> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut records: Vec<Vec<Value>> = Vec::new();

        // The vendor's placeholder first record.
        records.push(record(0, 0.0, 0.0, 0));

        let mut time = self.start_time;
        let mut latitude = self.origin_lat;
        let longitude = self.origin_lon;

        for _ in 0..self.trip_count {
            for idx in 0..self.points_per_trip {
                let edge = idx == 0 || idx + 1 == self.points_per_trip;
                let speed = if edge {
                    2
                } else {
                    let jitter = rng.gen_range(0..=5);
                    self.cruise_speed + jitter
                };
                let lon_jitter = rng.gen_range(-0.0001..0.0001);
                records.push(record(time, latitude, longitude + lon_jitter, speed));
                if !edge {
                    latitude += LAT_STEP;
                }
                time += self.ping_interval_secs;
            }
            time += self.gap_minutes * 60;
        }

        records
            .chunks(BATCH_SIZE)
            .map(|chunk| PointBatch {
                fields: vec![
                    "nTime".to_string(),
                    "dbLat".to_string(),
                    "dbLon".to_string(),
                    "nSpeed".to_string(),
                ],
                records: chunk.to_vec(),
            })
            .collect()
    }

    /// Total records generated, sentinel included.
    pub fn total_records(&self) -> usize {
        1 + self.trip_count * self.points_per_trip
    }
}

fn record(time: i64, latitude: f64, longitude: f64, speed: u32) -> Vec<Value> {
    vec![
        Value::String(time.to_string()),
        Value::String(format!("{latitude:.6}")),
        Value::String(format!("{longitude:.6}")),
        Value::String(speed.to_string()),
    ]
}
