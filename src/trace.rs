//! The trace container: the ordered cleaned-ping sequence, the id index and
//! the warning accumulator the operators write into.

use std::collections::HashMap;

use log::debug;

use crate::errors::PayloadError;
use crate::geo;
use crate::payload::{self, TracePayload};
use crate::ping::CleanedPing;

/// A single vehicle journey under cleaning.
///
/// Built once from a [`TracePayload`]; mutated only by the cleaning
/// operators, the stop detector and the enrichment pass. The ping sequence
/// preserves time order throughout (interpolation inserts in order), and
/// the id index always maps every `ping_id` to its current position.
#[derive(Debug)]
pub struct CleanTrace {
    pub(crate) pings: Vec<CleanedPing>,
    pub(crate) index: HashMap<String, usize>,
    pub(crate) vehicle_type: String,
    pub(crate) vehicle_speed: f64,
    pub(crate) warnings: Vec<String>,
    pub(crate) map_matched: bool,
}

impl CleanTrace {
    /// Validate the payload and build the engine. Fails without creating
    /// the trace when a ping field violates its contract or timestamps
    /// decrease.
    pub fn from_payload(payload: TracePayload) -> Result<Self, PayloadError> {
        let pings = payload::build_pings(&payload)?;
        let index = build_index(&pings);
        debug!(
            "built trace of {} pings (vehicle_type={})",
            pings.len(),
            payload.vehicle_type
        );
        Ok(Self {
            pings,
            index,
            vehicle_type: payload.vehicle_type,
            vehicle_speed: payload.vehicle_speed,
            warnings: Vec::new(),
            map_matched: false,
        })
    }

    pub fn pings(&self) -> &[CleanedPing] {
        &self.pings
    }

    pub fn ping_by_id(&self, ping_id: &str) -> Option<&CleanedPing> {
        self.index.get(ping_id).map(|&at| &self.pings[at])
    }

    /// Warnings accumulated by operators so far (failed OSRM batches,
    /// oversized batch sizes). Also listed in the output document.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn vehicle_type(&self) -> &str {
        &self.vehicle_type
    }

    pub fn vehicle_speed(&self) -> f64 {
        self.vehicle_speed
    }

    pub fn len(&self) -> usize {
        self.pings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pings.is_empty()
    }

    pub(crate) fn push_warning(&mut self, warning: String) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Positions of pings the OSRM-backed operators may touch: not
    /// dropped, not interpolated, coordinates present.
    pub(crate) fn eligible_positions(&self) -> Vec<usize> {
        self.pings
            .iter()
            .enumerate()
            .filter(|(_, ping)| {
                !ping.is_dropped() && !ping.is_interpolated && ping.cleaned_point().is_some()
            })
            .map(|(at, _)| at)
            .collect()
    }

    /// Re-sort by timestamp (stable, so equal timestamps keep their
    /// insertion order) and rebuild the id index.
    pub(crate) fn restore_time_order(&mut self) {
        self.pings.sort_by_key(|ping| ping.timestamp);
        self.index = build_index(&self.pings);
    }

    /// Recompute per-ping gaps and cumulatives over the cleaned sequence.
    ///
    /// Gaps are measured between consecutive located pings; a ping without
    /// cleaned coordinates carries null gaps and inherits the running
    /// cumulative at the moment it was skipped.
    pub(crate) fn recompute_enrichment(&mut self) {
        let mut prev: Option<(crate::Point, i64)> = None;
        let mut cumulative_distance_m = 0.0;
        let mut cumulative_time_ms: i64 = 0;

        for ping in &mut self.pings {
            match ping.cleaned_point() {
                Some(point) => {
                    let (distance_m, time_ms) = match prev {
                        Some((prev_point, prev_ts)) => (
                            geo::haversine_m(&prev_point, &point),
                            ping.timestamp - prev_ts,
                        ),
                        None => (0.0, 0),
                    };
                    cumulative_distance_m += distance_m;
                    cumulative_time_ms += time_ms;
                    ping.distance_from_prev_m = Some(distance_m);
                    ping.time_from_prev_ms = Some(time_ms);
                    ping.cumulative_distance_m = Some(cumulative_distance_m);
                    ping.cumulative_time_ms = Some(cumulative_time_ms);
                    prev = Some((point, ping.timestamp));
                }
                None => {
                    ping.distance_from_prev_m = None;
                    ping.time_from_prev_ms = None;
                    ping.cumulative_distance_m = Some(cumulative_distance_m);
                    ping.cumulative_time_ms = Some(cumulative_time_ms);
                }
            }
        }
    }
}

fn build_index(pings: &[CleanedPing]) -> HashMap<String, usize> {
    pings
        .iter()
        .enumerate()
        .map(|(at, ping)| (ping.ping_id.clone(), at))
        .collect()
}
