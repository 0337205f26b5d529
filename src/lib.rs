//! # tripclean
//!
//! Cleans raw GPS tracker pings into discrete, filtered trips suitable for
//! map visualization.
//!
//! This library provides:
//! - Vendor record normalization (type coercion, timezone localization)
//! - Time-gap track segmentation into provisional trips
//! - Edge trimming and per-point cumulative metrics (geodesic distance,
//!   elevation gain, duration)
//! - Trip aggregation and speed/duration filtering
//! - Dense trip-ID reconciliation across trips and points
//!
//! ## Features
//!
//! - **`parallel`** - Per-trip trimming fan-out with rayon
//! - **`http`** - Blocking vendor-API and elevation-grid collaborators
//! - **`cli`** - The `tripclean-cli` binary
//!
//! ## Quick Start
//!
//! ```rust
//! use tripclean::{clean, CleanConfig, PointBatch};
//! use serde_json::json;
//!
//! // One vendor page. The first record is the vendor's placeholder
//! // sentinel and is always discarded.
//! let batch: PointBatch = serde_json::from_value(json!({
//!     "m_arrField": ["nTime", "dbLat", "dbLon", "nSpeed"],
//!     "m_arrRecord": [
//!         ["0", "0.0", "0.0", "0"],
//!         ["1740909600", "48.8566", "2.3522", "12"],
//!         ["1740909660", "48.8601", "2.3522", "25"],
//!         ["1740909720", "48.8637", "2.3522", "30"],
//!         ["1740909780", "48.8673", "2.3522", "28"],
//!         ["1740909840", "48.8708", "2.3522", "14"],
//!     ],
//! }))
//! .unwrap();
//!
//! let result = clean(&[batch], &CleanConfig::default(), None).unwrap();
//! assert_eq!(result.trips.len(), 1);
//! assert_eq!(result.points.len(), 5);
//! ```

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{CleanError, Result};

// Point normalization (vendor record coercion, localization, date filtering)
pub mod normalize;
pub use normalize::normalize;

// Time-gap track segmentation
pub mod segment;
pub use segment::{segment, ProvisionalTrip};

// Trip trimming and per-point metrics
pub mod trim;
pub use trim::{trim_and_measure, TrimmedTrip, TripPoint};

// Trip aggregation, filtering, and ID reconciliation
pub mod aggregate;
pub use aggregate::aggregate;

// Elevation raster lookup
pub mod elevation;
pub use elevation::ElevationGrid;

// End-to-end pipeline
pub mod pipeline;
pub use pipeline::clean;

// Map front-end JSON export
pub mod export;
pub use export::{build_features, write_json, write_trips_json, TrackFeature};

// Vendor API and elevation collaborators
#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub use http::{fetch_elevation_grid, VendorClient};

// Synthetic ping generator for tests and benchmarks
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// One page of raw vendor records: a set of named columns plus one row per
/// tracker ping. Cells arrive as JSON strings or numbers; normalization
/// coerces them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointBatch {
    /// Column names, e.g. `["nTime", "dbLat", "dbLon", "nSpeed", ...]`.
    #[serde(rename = "m_arrField")]
    pub fields: Vec<String>,
    /// Rows, one per ping, in vendor arrival order.
    #[serde(rename = "m_arrRecord")]
    pub records: Vec<Vec<serde_json::Value>>,
}

/// A normalized tracker ping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ping {
    /// Epoch seconds as reported by the tracker.
    pub time: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Instantaneous speed in km/h.
    pub speed: u32,
    /// `time` localized in the target timezone.
    pub local_time: DateTime<Tz>,
    /// Stable insertion-order index, assigned after date filtering.
    pub seq: usize,
}

/// A cleaned, surviving trip.
///
/// Computed once from a provisional trip's trimmed points and immutable
/// thereafter. `trip_id` is dense and 0-based over surviving trips only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub trip_id: u32,
    pub start_date: DateTime<Tz>,
    pub end_date: DateTime<Tz>,
    /// `start_date` as `YYYY-MM-DD,HH:MM` in the target timezone.
    pub formatted_start_date: String,
    /// Maximum per-point speed in km/h.
    pub max_speed: u32,
    pub dist_total_km: f64,
    /// Cumulative elevation gain in meters, when elevations were enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_gain_m: Option<f64>,
    pub duration_min: f64,
    pub mean_speed_kmh: f64,
}

/// A point belonging to a final trip, enriched with cumulative metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackPoint {
    /// Final trip ID; references exactly one [`Trip`].
    pub trip_id: u32,
    pub time: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: u32,
    pub local_time: DateTime<Tz>,
    pub seq: usize,
    /// Geodesic distance to the previous point in the trip, km. Zero for the
    /// trip's first point.
    pub leg_km: f64,
    /// Cumulative distance from the trip start, km.
    pub dist_total_km: f64,
    /// Elapsed minutes since the previous point. Zero for the first point.
    pub leg_min: f64,
    /// Cumulative minutes from the trip start.
    pub duration_total_min: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_m: Option<f64>,
    /// Cumulative elevation gain from the trip start, meters. Descents never
    /// subtract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gain_total_m: Option<f64>,
}

/// The pipeline output: surviving trips and their points.
///
/// Every [`TrackPoint`] references exactly one [`Trip`] by `trip_id`, and
/// every trip owns at least one point.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanResult {
    pub trips: Vec<Trip>,
    pub points: Vec<TrackPoint>,
}

/// Geographic bounding box over a set of pings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    /// Compute bounds from normalized pings. Returns `None` for an empty set.
    pub fn from_pings(pings: &[Ping]) -> Option<Self> {
        if pings.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lon = f64::MAX;
        let mut max_lon = f64::MIN;

        for p in pings {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lon = min_lon.min(p.longitude);
            max_lon = max_lon.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })
    }
}

/// Configuration for the cleaning pipeline.
///
/// Defaults mirror the tracker deployment this crate was built for: a 10
/// minute gap splits trips, trips slower than 5 km/h or faster than 55 km/h
/// at peak are discarded, and leading/trailing points at or below 5 km/h are
/// trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanConfig {
    /// Minutes of silence that split two trips.
    pub tracks_delta: f64,
    /// Trips whose maximum speed is below this are removed (walking, noise).
    pub min_max_speed_for_valid_tracks: u32,
    /// Trips whose maximum speed is above this are removed (cars, glitches).
    pub max_max_speed_for_valid_tracks: u32,
    /// Leading/trailing points at or below this speed are trimmed.
    pub remove_start_end_points_speed: u32,
    /// Trips shorter than this many minutes are dropped.
    pub min_duration: f64,
    /// Keep only points on or after local midnight of this date.
    pub min_date: Option<NaiveDate>,
    /// Keep only points on or before local midnight of this date.
    pub max_date: Option<NaiveDate>,
    /// Compute per-point elevation metrics from a collaborator-supplied grid.
    pub get_elevations: bool,
    /// Target timezone for localization and date formatting.
    pub timezone: Tz,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            tracks_delta: 10.0,
            min_max_speed_for_valid_tracks: 5,
            max_max_speed_for_valid_tracks: 55,
            remove_start_end_points_speed: 5,
            min_duration: 3.0,
            min_date: None,
            max_date: None,
            get_elevations: false,
            timezone: chrono_tz::Europe::Paris,
        }
    }
}
