//! The input payload document and its validator.
//!
//! A [`TracePayload`] is the in-process form of the input document: the
//! ping list plus the echoed vehicle attributes. Validation checks
//! types and ranges ping by ping and fails on the first violation; the
//! supplied order is preserved, never sorted.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::PayloadError;
use crate::ping::CleanedPing;

fn default_vehicle_type() -> String {
    "car".to_string()
}

fn default_vehicle_speed() -> f64 {
    25.0
}

/// One raw GPS sample as supplied by the caller.
///
/// `latitude`/`longitude` may be absent or null; such a ping is carried
/// through the pipeline but never contributes coordinates. `ping_id` must
/// be present on all pings or on none (ids are synthesized as `p{index}`
/// in the latter case).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PingInput {
    #[serde(default)]
    pub ping_id: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Milliseconds since the Unix epoch. Must be non-decreasing across
    /// the trace.
    pub timestamp: i64,
    /// Horizontal accuracy estimate in meters, if the device reported one.
    #[serde(default)]
    pub error_radius: Option<f64>,
    #[serde(default)]
    pub event_type: Option<String>,
    /// A force-retained ping is never dropped by `remove_nearby`; its
    /// coordinates may still be rewritten by imputation or map matching.
    #[serde(default)]
    pub force_retain: bool,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl PingInput {
    /// A located ping with all optional attributes unset.
    pub fn new(latitude: f64, longitude: f64, timestamp: i64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            timestamp,
            ..Self::default()
        }
    }
}

/// The input payload: one trace plus the vehicle attributes echoed into the
/// output document. Neither vehicle field affects computation.
#[derive(Clone, Debug, Deserialize)]
pub struct TracePayload {
    pub trace: Vec<PingInput>,
    #[serde(default = "default_vehicle_type")]
    pub vehicle_type: String,
    /// Nominal speed in km/h; must be positive.
    #[serde(default = "default_vehicle_speed")]
    pub vehicle_speed: f64,
}

impl TracePayload {
    /// A payload with the default vehicle attributes.
    pub fn new(trace: Vec<PingInput>) -> Self {
        Self {
            trace,
            vehicle_type: default_vehicle_type(),
            vehicle_speed: default_vehicle_speed(),
        }
    }
}

/// Validate the payload and project every raw ping into its cleaned
/// counterpart, synthesizing ping ids when the input provides none.
pub(crate) fn build_pings(payload: &TracePayload) -> Result<Vec<CleanedPing>, PayloadError> {
    if !payload.vehicle_speed.is_finite() || payload.vehicle_speed <= 0.0 {
        return Err(PayloadError::Validation {
            field: "vehicle_speed",
            index: 0,
            reason: format!("must be a positive number, got {}", payload.vehicle_speed),
        });
    }

    for (index, ping) in payload.trace.iter().enumerate() {
        if let Some(latitude) = ping.latitude {
            if !(-90.0..=90.0).contains(&latitude) {
                return Err(PayloadError::Validation {
                    field: "latitude",
                    index,
                    reason: format!("must lie in [-90, 90], got {latitude}"),
                });
            }
        }
        if let Some(longitude) = ping.longitude {
            if !(-180.0..=180.0).contains(&longitude) {
                return Err(PayloadError::Validation {
                    field: "longitude",
                    index,
                    reason: format!("must lie in [-180, 180], got {longitude}"),
                });
            }
        }
        if let Some(radius) = ping.error_radius {
            // NaN fails the comparison and is rejected with it
            if !(radius >= 0.0) || !radius.is_finite() {
                return Err(PayloadError::Validation {
                    field: "error_radius",
                    index,
                    reason: format!("must be a non-negative number, got {radius}"),
                });
            }
        }
    }

    for index in 1..payload.trace.len() {
        if payload.trace[index].timestamp < payload.trace[index - 1].timestamp {
            return Err(PayloadError::Order { index });
        }
    }

    let with_id = payload
        .trace
        .iter()
        .filter(|ping| ping.ping_id.is_some())
        .count();
    if with_id != 0 && with_id != payload.trace.len() {
        let index = payload
            .trace
            .iter()
            .position(|ping| ping.ping_id.is_none())
            .unwrap_or(0);
        return Err(PayloadError::Validation {
            field: "ping_id",
            index,
            reason: "ping_id must be present on all pings or on none".to_string(),
        });
    }

    let mut seen = HashSet::new();
    let mut pings = Vec::with_capacity(payload.trace.len());
    for (index, ping) in payload.trace.iter().enumerate() {
        let ping_id = match &ping.ping_id {
            Some(id) => id.clone(),
            None => format!("p{index}"),
        };
        if !seen.insert(ping_id.clone()) {
            return Err(PayloadError::Validation {
                field: "ping_id",
                index,
                reason: format!("duplicate ping_id {ping_id:?}"),
            });
        }
        pings.push(CleanedPing::from_input(ping_id, ping));
    }

    Ok(pings)
}
