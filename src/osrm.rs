//! The OSRM service abstraction consumed by the map-matching and
//! interpolation operators, plus the wire response types.
//!
//! Engines are stateless beyond their configuration: every call is one
//! independent HTTP GET (or a fabrication, for the mock engine). Operators
//! apply the results; an engine never mutates pings. Implement
//! [`OsrmService`] to inject a fake engine in tests.

use serde::Deserialize;

use crate::Point;
use crate::errors::OsrmBatchError;

/// The two OSRM calls the cleaning operators make.
pub trait OsrmService {
    /// Map-match one batch of trace coordinates.
    ///
    /// Returns exactly one entry per input point, in input order:
    /// `Some(snapped)` for points the service could match, `None` for
    /// tracepoints the service discarded. A transport or parse failure
    /// fails the whole batch.
    fn match_batch(&self, points: &[Point]) -> Result<Vec<Option<Point>>, OsrmBatchError>;

    /// The driving-route geometry from `from` to `to`, both endpoints
    /// included, or an error when no route exists.
    fn route(&self, from: &Point, to: &Point) -> Result<Vec<Point>, OsrmBatchError>;
}

/// Wire shape of the match response. Only `tracepoints` is consumed; a
/// null entry means the service could not match that point.
#[derive(Debug, Deserialize)]
pub struct MatchResponse {
    pub tracepoints: Vec<Option<Tracepoint>>,
}

/// One matched tracepoint. OSRM carries more fields; only the snapped
/// location is needed here.
#[derive(Debug, Deserialize)]
pub struct Tracepoint {
    /// The `[longitude, latitude]` pair of the snapped coordinate.
    pub location: [f64; 2],
}

/// Wire shape of the route response; `routes[0].geometry.coordinates` is
/// the consumed path.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    pub routes: Vec<RouteEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RouteEntry {
    pub geometry: RouteGeometry,
}

/// GeoJSON LineString geometry as returned with `geometries=geojson`.
#[derive(Debug, Deserialize)]
pub struct RouteGeometry {
    /// List of `[longitude, latitude]` coordinates.
    pub coordinates: Vec<[f64; 2]>,
}
