//! Aggregate summaries and the output document.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::geo;
use crate::ping::{CleanedPing, UpdateStatus};
use crate::trace::CleanTrace;

/// Counts of what the cleaning operators did, computed from per-ping
/// provenance.
#[derive(Clone, Debug, Serialize)]
pub struct CleaningSummary {
    /// Input pings that carried coordinates.
    pub input_non_null_pings: usize,
    /// Output pings with cleaned coordinates (includes interpolated).
    pub output_non_null_pings: usize,
    pub dropped: usize,
    pub updated: usize,
    pub interpolated: usize,
}

/// Raw versus cleaned cumulative path length.
#[derive(Clone, Debug, Serialize)]
pub struct DistanceSummary {
    pub raw_distance_m: f64,
    pub cleaned_distance_m: f64,
    pub reduction_m: f64,
    /// Percentage of the raw distance removed by cleaning; zero when the
    /// raw path has no length.
    pub reduction_pct: f64,
}

/// One detected stop event.
#[derive(Clone, Debug, Serialize)]
pub struct StopEventSummary {
    pub sequence_number: u32,
    pub representative_latitude: f64,
    pub representative_longitude: f64,
    pub first_timestamp: i64,
    pub last_timestamp: i64,
    pub duration_s: i64,
    pub ping_ids: Vec<String>,
}

/// The full result of a cleaning run: the per-ping list sorted by
/// timestamp, the aggregate summaries, the echoed vehicle attributes and
/// every warning accumulated by the operators.
#[derive(Debug, Serialize)]
pub struct OutputDocument {
    pub cleaned_trace: Vec<CleanedPing>,
    pub cleaning_summary: CleaningSummary,
    pub distance_summary: DistanceSummary,
    pub stop_summary: Vec<StopEventSummary>,
    pub vehicle_type: String,
    pub vehicle_speed: f64,
    pub warnings: Vec<String>,
}

impl CleanTrace {
    /// Assemble the output document. Recomputes the per-ping enrichment
    /// over the current cleaned sequence first; the trace remains usable
    /// (further operators may run and `output` may be called again).
    pub fn output(&mut self) -> OutputDocument {
        self.restore_time_order();
        self.recompute_enrichment();

        let mut dropped = 0;
        let mut updated = 0;
        let mut interpolated = 0;
        for ping in &self.pings {
            match ping.update_status {
                UpdateStatus::Dropped => dropped += 1,
                UpdateStatus::Updated => updated += 1,
                UpdateStatus::Interpolated => interpolated += 1,
                UpdateStatus::Unchanged => {}
            }
        }
        let cleaning_summary = CleaningSummary {
            input_non_null_pings: self
                .pings
                .iter()
                .filter(|ping| ping.input_point().is_some())
                .count(),
            output_non_null_pings: self
                .pings
                .iter()
                .filter(|ping| ping.cleaned_point().is_some())
                .count(),
            dropped,
            updated,
            interpolated,
        };

        let raw_distance_m =
            geo::path_length_m(self.pings.iter().filter_map(|ping| ping.input_point()));
        let cleaned_distance_m =
            geo::path_length_m(self.pings.iter().filter_map(|ping| ping.cleaned_point()));
        let reduction_m = raw_distance_m - cleaned_distance_m;
        let distance_summary = DistanceSummary {
            raw_distance_m,
            cleaned_distance_m,
            reduction_m,
            reduction_pct: if raw_distance_m > 0.0 {
                reduction_m / raw_distance_m * 100.0
            } else {
                0.0
            },
        };

        OutputDocument {
            cleaned_trace: self.pings.clone(),
            cleaning_summary,
            distance_summary,
            stop_summary: build_stop_summary(&self.pings),
            vehicle_type: self.vehicle_type.clone(),
            vehicle_speed: self.vehicle_speed,
            warnings: self.warnings.clone(),
        }
    }
}

/// Regroup the per-ping stop annotations into one entry per event, in
/// sequence-number order.
fn build_stop_summary(pings: &[CleanedPing]) -> Vec<StopEventSummary> {
    let mut events: BTreeMap<u32, Vec<&CleanedPing>> = BTreeMap::new();
    for ping in pings {
        if let Some(sequence) = ping.stop_event_sequence_number {
            events.entry(sequence).or_default().push(ping);
        }
    }

    events
        .into_iter()
        .map(|(sequence_number, members)| {
            let first_timestamp = members[0].timestamp;
            let last_timestamp = members[members.len() - 1].timestamp;
            StopEventSummary {
                sequence_number,
                representative_latitude: members[0]
                    .representative_stop_event_latitude
                    .unwrap_or_default(),
                representative_longitude: members[0]
                    .representative_stop_event_longitude
                    .unwrap_or_default(),
                first_timestamp,
                last_timestamp,
                duration_s: (last_timestamp - first_timestamp) / 1000,
                ping_ids: members.iter().map(|ping| ping.ping_id.clone()).collect(),
            }
        })
        .collect()
}
