//! trace_cleaner cleans, enriches and summarises sequences of GPS pings (a
//! "trace") representing a single vehicle journey. Noisy location samples go
//! in; a cleaned trace, per-ping provenance and aggregate summaries come out.
//!
//! ## Pipeline
//!
//! A [`CleanTrace`] is built once from a validated [`TracePayload`]. Each raw
//! ping is projected into a mutable [`CleanedPing`](ping::CleanedPing) whose
//! cleaned coordinates start equal to the raw ones. The caller then applies
//! zero or more cleaning operators, in any order, each of which records
//! provenance on the pings it touches:
//!
//! - [`remove_nearby`](CleanTrace::remove_nearby): drop pings that crowd the
//!   previous retained ping.
//! - [`impute_by_distance`](CleanTrace::impute_by_distance): pull distance
//!   outliers back to the spherical midpoint of their neighbours.
//! - [`impute_by_angle`](CleanTrace::impute_by_angle): same, for implausibly
//!   sharp turns.
//! - [`map_match`](CleanTrace::map_match): snap pings to the road network
//!   through an OSRM match service, in batches.
//! - [`interpolate`](CleanTrace::interpolate): densify sparse segments with
//!   synthetic pings along the OSRM driving route.
//!
//! Stop detection ([`detect_stop_events`](CleanTrace::detect_stop_events)) and
//! output assembly ([`output`](CleanTrace::output)) run on demand; output
//! recomputes the per-ping enrichment (time/distance gaps and cumulatives)
//! and builds the cleaning, distance and stop summaries.
//!
//! ## Engines
//!
//! The operators that talk to OSRM take any [`OsrmService`](osrm::OsrmService)
//! implementation:
//!
//! - [`remote::OsrmEngine`]: calls `osrm-routed` over its HTTP API.
//! - [`mock::OsrmEngine`]: fabricated data for development and tests when the
//!   backend is unavailable.
//!
//! Match and route requests are independent GETs; a failed or malformed batch
//! never fails the operator, it leaves the affected pings unchanged and
//! surfaces a warning in the output document.
//!
//! ## Example usage
//!
//! ```
//! use trace_cleaner::{CleanTrace, TracePayload, mock};
//! use trace_cleaner::operators::{InterpolateParams, MapMatchParams, RemoveNearbyParams};
//!
//! let payload: TracePayload = serde_json::from_str(
//!     r#"{
//!         "trace": [
//!             {"latitude": 19.0760, "longitude": 72.8777, "timestamp": 0},
//!             {"latitude": 19.0761, "longitude": 72.8778, "timestamp": 30000},
//!             {"latitude": 19.0790, "longitude": 72.8800, "timestamp": 60000}
//!         ]
//!     }"#,
//! )
//! .expect("Invalid payload");
//!
//! let mut trace = CleanTrace::from_payload(payload).expect("Invalid trace");
//! trace
//!     .remove_nearby(&RemoveNearbyParams::default())
//!     .expect("Failed to remove nearby pings");
//!
//! let engine = mock::OsrmEngine::new();
//! trace
//!     .map_match(&engine, &MapMatchParams::default())
//!     .expect("Failed to map match");
//! trace
//!     .interpolate(&engine, &InterpolateParams::default())
//!     .expect("Failed to interpolate");
//!
//! let output = trace.output();
//! assert_eq!(output.cleaning_summary.dropped, 0);
//! ```
//!
//! ## Units and conventions
//!
//! Coordinates are WGS84 decimal degrees, timestamps are integer milliseconds
//! since the Unix epoch, distances are meters. OSRM URLs carry coordinates in
//! `lon,lat` order; everything else in this crate is `(lat, lon)`.

pub mod errors;
pub mod geo;
pub mod mock;
pub mod operators;
pub mod osrm;
pub mod payload;
pub mod ping;
pub mod remote;
pub mod stops;
pub mod summary;
pub mod trace;

pub use payload::{PingInput, TracePayload};
pub use ping::{CleanedPing, Operator, UpdateStatus};
pub use summary::OutputDocument;
pub use trace::CleanTrace;

/// A (latitude, longitude) pair. The basic coordinate type passed to the geo
/// kernels and the OSRM engines.
///
/// Constructing with `new` will check -90 <= latitude <= 90 and
/// -180 <= longitude <= 180, returning an Option<>.
///
/// [`new_unchecked`](Self::new_unchecked) is also provided.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    latitude: f64,
    longitude: f64,
}

impl Point {
    /// Checks -90 <= latitude <= 90 and -180 <= longitude <= 180.
    ///
    /// Returns `None` if that is not satisfied. Also see
    /// [`new_unchecked`](Self::new_unchecked).
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        // Range contains produces the same assembly as chained <= and >= with optimisation
        if !((-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)) {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }

    /// Init without checking latitude and longitude.
    ///
    /// The geo kernels produce well-defined output only for coordinates in
    /// the legal ranges.
    pub fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}
