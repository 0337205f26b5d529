//! Blocking HTTP collaborators: the vendor telemetry API and the
//! elevation-grid lookup.
//!
//! Both are thin wrappers around the core pipeline's input contracts. A
//! failure here is fatal to the run and propagates unchanged; retry and
//! backoff policy belongs to the caller, not this layer.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::elevation::ElevationGrid;
use crate::error::{CleanError, Result};
use crate::{Bounds, PointBatch};

/// Default vendor endpoint.
pub const DEFAULT_SERVER_URL: &str = "https://246.sinotrack.com";

const TRACK_ENDPOINT: &str = "/APP/AppJson.asp";
const TRACK_COMMAND: &str = "Proc_GetTrack";
const PAGE_SIZE: u32 = 200;

// Wire separators used by the vendor's token format.
const SERVER_ROW: char = '\u{11}';
const SERVER_TABLE: char = '\u{1b}';

/// One page of the vendor's track response.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackPage {
    #[serde(rename = "m_isResultOk")]
    pub result_ok: i64,
    #[serde(rename = "m_nTotal")]
    pub total: u64,
    #[serde(rename = "m_nCount")]
    pub count: u64,
    #[serde(flatten)]
    pub batch: PointBatch,
}

/// The signed form body the vendor expects on every call.
#[derive(Debug, Serialize)]
struct SignedRequest {
    #[serde(rename = "strAppID")]
    app_id: String,
    #[serde(rename = "strUser")]
    user: String,
    #[serde(rename = "nTimeStamp")]
    timestamp: u64,
    #[serde(rename = "strRandom")]
    random: String,
    #[serde(rename = "strSign")]
    sign: String,
    #[serde(rename = "strToken")]
    token: String,
}

/// Client for the vendor's paginated track API.
pub struct VendorClient {
    server_url: String,
    user: String,
    http: reqwest::blocking::Client,
}

impl VendorClient {
    pub fn new(server_url: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            user: user.into(),
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Build a client from the `SINO_USER` environment variable.
    pub fn from_env() -> Result<Self> {
        let user = std::env::var("SINO_USER")
            .map_err(|_| CleanError::Config("SINO_USER is not set".to_string()))?;
        Ok(Self::new(DEFAULT_SERVER_URL, user))
    }

    /// Fetch every page of points between two epoch timestamps.
    ///
    /// Pagination runs until the accumulated record count reaches the
    /// total the vendor reports. The batches come back fully materialized,
    /// in page order — the shape [`crate::clean`] consumes.
    pub fn fetch_points(&self, start: i64, end: i64) -> Result<Vec<PointBatch>> {
        let mut batches = Vec::new();
        let mut fetched = 0u64;
        let mut page = 1u32;

        loop {
            let response = self.fetch_page(start, end, page)?;
            if response.result_ok != 1 {
                return Err(CleanError::Fetch(format!(
                    "vendor rejected page {page} (m_isResultOk = {})",
                    response.result_ok
                )));
            }

            fetched += response.count;
            info!("page {page}: {fetched} / {} points", response.total);
            let done = fetched >= response.total;
            if response.count == 0 && !done {
                return Err(CleanError::Fetch(format!(
                    "vendor returned an empty page {page} before completing"
                )));
            }
            batches.push(response.batch);
            if done {
                return Ok(batches);
            }
            page += 1;
        }
    }

    fn fetch_page(&self, start: i64, end: i64, page: u32) -> Result<TrackPage> {
        let data = format!("N'{}',N'{start}',N'{end}',N'100000'", self.user);
        let form = self.sign(TRACK_COMMAND, &data, "", page, PAGE_SIZE);
        let url = format!("{}{}", self.server_url, TRACK_ENDPOINT);

        self.http
            .post(&url)
            .form(&form)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json::<TrackPage>())
            .map_err(|e| CleanError::Fetch(e.to_string()))
    }

    /// Produce the vendor's signed form body.
    ///
    /// The scheme is the web client's, verbatim: a base64 app id from the
    /// `/`-padded host, a base64 token over the separator-joined command
    /// parts padded with `6`, and an md5 signature binding timestamp,
    /// nonce, user, app id, and token together.
    fn sign(&self, cmd: &str, data: &str, field: &str, page: u32, page_size: u32) -> SignedRequest {
        let host = self
            .server_url
            .replace("http://", "")
            .replace("https://", "")
            .to_lowercase();
        let app_id = BASE64.encode(pad_to_triple(host, '/'));

        let page_size = page_size.to_string();
        let page = page.to_string();
        let mut token_src = String::new();
        for part in [cmd, data, field, page_size.as_str(), page.as_str()] {
            token_src.push_str(part);
            token_src.push(SERVER_ROW);
        }
        token_src.push(SERVER_TABLE);
        let token = BASE64.encode(pad_to_triple(token_src, '6'));

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let random = rand::thread_rng()
            .gen_range(0u64..100_000_000_000_000)
            .to_string();
        let sign = format!(
            "{:x}",
            md5::compute(format!(
                "{timestamp}{random}{user}{app_id}{token}",
                user = self.user
            ))
        );

        SignedRequest {
            app_id,
            user: self.user.clone(),
            timestamp,
            random,
            sign,
            token,
        }
    }
}

/// Pad with `pad` until the length is a multiple of three. A length that is
/// already a multiple gains three more, matching the vendor's web client.
fn pad_to_triple(mut s: String, pad: char) -> String {
    let n = 3 - s.len() % 3;
    for _ in 0..n {
        s.push(pad);
    }
    s
}

// ============================================================================
// Elevation lookup
// ============================================================================

const ELEVATION_ENDPOINT: &str = "https://api.open-elevation.com/api/v1/lookup";

/// Locations per lookup request; the API rejects oversized payloads.
const LOOKUP_CHUNK: usize = 512;

#[derive(Serialize)]
struct LookupRequest {
    locations: Vec<LookupLocation>,
}

#[derive(Clone, Copy, Serialize)]
struct LookupLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct LookupResponse {
    results: Vec<LookupResult>,
}

#[derive(Deserialize)]
struct LookupResult {
    elevation: f64,
}

/// Fetch a `precision x precision` elevation raster over a bounding box.
///
/// Samples are taken at cell centers, row-major from `min_lat`/`min_lon`,
/// in chunked requests against an open-elevation style API.
pub fn fetch_elevation_grid(bounds: Bounds, precision: usize) -> Result<ElevationGrid> {
    if precision == 0 {
        return Err(CleanError::Elevation(
            "precision must be at least 1".to_string(),
        ));
    }

    let lat_step = (bounds.max_lat - bounds.min_lat) / precision as f64;
    let lon_step = (bounds.max_lon - bounds.min_lon) / precision as f64;

    let mut locations = Vec::with_capacity(precision * precision);
    for row in 0..precision {
        let latitude = bounds.min_lat + (row as f64 + 0.5) * lat_step;
        for col in 0..precision {
            let longitude = bounds.min_lon + (col as f64 + 0.5) * lon_step;
            locations.push(LookupLocation {
                latitude,
                longitude,
            });
        }
    }

    info!(
        "fetching {}x{precision} elevation grid in {} request(s)",
        precision,
        locations.len().div_ceil(LOOKUP_CHUNK)
    );

    let client = reqwest::blocking::Client::new();
    let mut samples = Vec::with_capacity(locations.len());
    for chunk in locations.chunks(LOOKUP_CHUNK) {
        let request = LookupRequest {
            locations: chunk.to_vec(),
        };
        let response = client
            .post(ELEVATION_ENDPOINT)
            .json(&request)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json::<LookupResponse>())
            .map_err(|e| CleanError::Elevation(e.to_string()))?;
        if response.results.len() != chunk.len() {
            return Err(CleanError::Elevation(format!(
                "expected {} results, got {}",
                chunk.len(),
                response.results.len()
            )));
        }
        samples.extend(response.results.into_iter().map(|r| r.elevation));
    }

    ElevationGrid::new(bounds, precision, precision, samples)
}
