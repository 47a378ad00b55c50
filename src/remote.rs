//! The engine for calling into osrm-backend through the HTTP web API.

use std::time::Duration;

use itertools::Itertools;

use crate::Point;
use crate::errors::OsrmBatchError;
use crate::osrm::{MatchResponse, OsrmService, RouteResponse};

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// An OSRM engine backed by `osrm-routed` (or any server speaking its HTTP
/// API), running locally or remotely.
///
/// Each call is a single GET with a per-request timeout (default 10 s); no
/// connection state is kept between calls and failed calls are not
/// retried — the operators treat a failed batch as a warning and move on.
pub struct OsrmEngine {
    endpoint: String,
    profile: String,
    agent: ureq::Agent,
}

impl OsrmEngine {
    /// Initialise the engine against an endpoint such as
    /// `http://127.0.0.1:5000`, with the default `driving` profile and
    /// timeout.
    ///
    /// The profile is required in the URL path but ignored by a manually
    /// run `osrm-routed`; the profile actually used is that of the map
    /// data the server was started with.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Initialise with an explicit per-request timeout.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            profile: "driving".to_string(),
            agent,
        }
    }

    /// Overwrite the profile segment of the request URLs.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    fn get(&self, url: &str) -> Result<String, OsrmBatchError> {
        self.agent
            .get(url)
            .call()
            .map_err(|e| OsrmBatchError::Endpoint(e.to_string()))?
            .into_body()
            .read_to_string()
            .map_err(|e| OsrmBatchError::Endpoint(e.to_string()))
    }
}

impl Default for OsrmEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl OsrmService for OsrmEngine {
    fn match_batch(&self, points: &[Point]) -> Result<Vec<Option<Point>>, OsrmBatchError> {
        let coordinates = points
            .iter()
            .map(|p| format!("{:.6},{:.6}", p.longitude(), p.latitude()))
            .join(";");
        let url = format!(
            "{}/match/v1/{}/{coordinates}?overview=false",
            self.endpoint, self.profile
        );

        let response = self.get(&url)?;
        let response = serde_json::from_str::<MatchResponse>(&response)?;
        if response.tracepoints.len() != points.len() {
            return Err(OsrmBatchError::TracepointMismatch {
                expected: points.len(),
                got: response.tracepoints.len(),
            });
        }

        Ok(response
            .tracepoints
            .into_iter()
            .map(|tracepoint| {
                tracepoint.map(|t| Point::new_unchecked(t.location[1], t.location[0]))
            })
            .collect())
    }

    fn route(&self, from: &Point, to: &Point) -> Result<Vec<Point>, OsrmBatchError> {
        let coordinates = [from, to]
            .iter()
            .map(|p| format!("{:.6},{:.6}", p.longitude(), p.latitude()))
            .join(";");
        let url = format!(
            "{}/route/v1/{}/{coordinates}?overview=full&geometries=geojson",
            self.endpoint, self.profile
        );

        let response = self.get(&url)?;
        let response = serde_json::from_str::<RouteResponse>(&response)?;
        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or(OsrmBatchError::EmptyRoute)?;

        Ok(route
            .geometry
            .coordinates
            .into_iter()
            .map(|[longitude, latitude]| Point::new_unchecked(latitude, longitude))
            .collect())
    }
}
