//! The engine for calling into the mocked osrm-backend.
//!
//! The mock engine returns data of the appropriate shape, but all data is
//! fabricated: match snaps every point to itself and route draws a straight
//! line. For development convenience when the backend is otherwise
//! unavailable.

use crate::Point;
use crate::errors::OsrmBatchError;
use crate::osrm::OsrmService;

/// The engine for calling into the mocked osrm-backend.
///
/// Returns the correct response types, but with fabricated data.
pub struct OsrmEngine {}

impl OsrmEngine {
    /// Initialise the mock engine.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {}
    }
}

impl OsrmService for OsrmEngine {
    /// Snaps every point to itself, as if each already lay on the road
    /// network.
    fn match_batch(&self, points: &[Point]) -> Result<Vec<Option<Point>>, OsrmBatchError> {
        Ok(points.iter().copied().map(Some).collect())
    }

    /// A straight-line "route": the endpoints plus two evenly spaced
    /// intermediate points, linear in latitude and longitude.
    fn route(&self, from: &Point, to: &Point) -> Result<Vec<Point>, OsrmBatchError> {
        let lerp = |fraction: f64| {
            Point::new_unchecked(
                from.latitude() + (to.latitude() - from.latitude()) * fraction,
                from.longitude() + (to.longitude() - from.longitude()) * fraction,
            )
        };
        Ok(vec![*from, lerp(1.0 / 3.0), lerp(2.0 / 3.0), *to])
    }
}
