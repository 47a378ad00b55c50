//! The per-ping state model: the immutable raw fields carried over from the
//! input and the mutable cleaned/enriched projection the operators work on.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::Point;
use crate::payload::PingInput;

/// How a ping's cleaned coordinates relate to its raw ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStatus {
    /// Cleaned coordinates still equal the raw input.
    Unchanged,
    /// Removed from the cleaned sequence; cleaned coordinates are null.
    Dropped,
    /// Coordinates rewritten by imputation or map matching.
    Updated,
    /// Synthesized by the interpolation operator.
    Interpolated,
}

/// The cleaning operators, as recorded in per-ping provenance.
///
/// The serialized form is the operator's provenance name, e.g.
/// `"impute_distorted_pings_with_distance"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Operator {
    #[serde(rename = "remove_nearby")]
    RemoveNearby,
    #[serde(rename = "impute_distorted_pings_with_distance")]
    ImputeDistance,
    #[serde(rename = "impute_distorted_pings_with_angle")]
    ImputeAngle,
    #[serde(rename = "map_match_trace")]
    MapMatch,
    #[serde(rename = "interpolate_trace")]
    Interpolate,
}

impl Operator {
    /// Returns the provenance name recorded in `last_updated_by`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::RemoveNearby => "remove_nearby",
            Operator::ImputeDistance => "impute_distorted_pings_with_distance",
            Operator::ImputeAngle => "impute_distorted_pings_with_angle",
            Operator::MapMatch => "map_match_trace",
            Operator::Interpolate => "interpolate_trace",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The mutable projection of a raw ping.
///
/// The `input_*` fields (and `timestamp`, `error_radius`, `event_type`,
/// `force_retain`, `metadata`) are raw input carried over verbatim and are
/// never overwritten after construction; for interpolated pings they are
/// null. Cleaned coordinates start equal to the raw ones and are mutated
/// only through [`mark_dropped`](Self::mark_dropped) and
/// [`mark_updated`](Self::mark_updated). Enrichment and stop fields are
/// owned by the enrichment pass and the stop detector respectively.
#[derive(Clone, Debug, Serialize)]
pub struct CleanedPing {
    pub ping_id: String,
    pub input_latitude: Option<f64>,
    pub input_longitude: Option<f64>,
    /// Milliseconds since the Unix epoch. Synthesized for interpolated
    /// pings, raw input otherwise.
    pub timestamp: i64,
    pub error_radius: Option<f64>,
    pub event_type: Option<String>,
    pub force_retain: bool,
    pub metadata: Map<String, Value>,

    pub cleaned_latitude: Option<f64>,
    pub cleaned_longitude: Option<f64>,
    pub update_status: UpdateStatus,
    /// The operator that most recently mutated this ping; null until the
    /// first mutation.
    pub last_updated_by: Option<Operator>,
    pub is_interpolated: bool,

    /// Time gap to the previous located ping; null while coordinates are
    /// null. Recomputed on output.
    pub time_from_prev_ms: Option<i64>,
    pub distance_from_prev_m: Option<f64>,
    pub cumulative_time_ms: Option<i64>,
    pub cumulative_distance_m: Option<f64>,

    pub stop_event_status: bool,
    pub representative_stop_event_latitude: Option<f64>,
    pub representative_stop_event_longitude: Option<f64>,
    pub stop_event_sequence_number: Option<u32>,
    /// Elapsed time from the stop's first ping, formatted as "Xm Ys".
    pub cumulative_stop_event_time: Option<String>,
}

impl CleanedPing {
    /// Project a validated raw input ping; cleaned coordinates start equal
    /// to the raw ones.
    pub(crate) fn from_input(ping_id: String, input: &PingInput) -> Self {
        Self {
            ping_id,
            input_latitude: input.latitude,
            input_longitude: input.longitude,
            timestamp: input.timestamp,
            error_radius: input.error_radius,
            event_type: input.event_type.clone(),
            force_retain: input.force_retain,
            metadata: input.metadata.clone(),
            cleaned_latitude: input.latitude,
            cleaned_longitude: input.longitude,
            update_status: UpdateStatus::Unchanged,
            last_updated_by: None,
            is_interpolated: false,
            time_from_prev_ms: None,
            distance_from_prev_m: None,
            cumulative_time_ms: None,
            cumulative_distance_m: None,
            stop_event_status: false,
            representative_stop_event_latitude: None,
            representative_stop_event_longitude: None,
            stop_event_sequence_number: None,
            cumulative_stop_event_time: None,
        }
    }

    /// Factory for a ping synthesized by the interpolation operator. The
    /// raw fields are null; only the interpolator may create these and no
    /// other operator ever mutates them.
    pub(crate) fn interpolated(ping_id: String, point: Point, timestamp: i64) -> Self {
        Self {
            ping_id,
            input_latitude: None,
            input_longitude: None,
            timestamp,
            error_radius: None,
            event_type: None,
            force_retain: false,
            metadata: Map::new(),
            cleaned_latitude: Some(point.latitude()),
            cleaned_longitude: Some(point.longitude()),
            update_status: UpdateStatus::Interpolated,
            last_updated_by: Some(Operator::Interpolate),
            is_interpolated: true,
            time_from_prev_ms: None,
            distance_from_prev_m: None,
            cumulative_time_ms: None,
            cumulative_distance_m: None,
            stop_event_status: false,
            representative_stop_event_latitude: None,
            representative_stop_event_longitude: None,
            stop_event_sequence_number: None,
            cumulative_stop_event_time: None,
        }
    }

    /// The cleaned coordinates as a [`Point`], if both are present.
    pub fn cleaned_point(&self) -> Option<Point> {
        match (self.cleaned_latitude, self.cleaned_longitude) {
            (Some(lat), Some(lon)) => Some(Point::new_unchecked(lat, lon)),
            _ => None,
        }
    }

    /// The raw input coordinates as a [`Point`], if both are present.
    pub fn input_point(&self) -> Option<Point> {
        match (self.input_latitude, self.input_longitude) {
            (Some(lat), Some(lon)) => Some(Point::new_unchecked(lat, lon)),
            _ => None,
        }
    }

    pub fn is_dropped(&self) -> bool {
        self.update_status == UpdateStatus::Dropped
    }

    pub(crate) fn mark_dropped(&mut self, operator: Operator) {
        self.cleaned_latitude = None;
        self.cleaned_longitude = None;
        self.update_status = UpdateStatus::Dropped;
        self.last_updated_by = Some(operator);
    }

    pub(crate) fn mark_updated(&mut self, operator: Operator, point: Point) {
        self.cleaned_latitude = Some(point.latitude());
        self.cleaned_longitude = Some(point.longitude());
        self.update_status = UpdateStatus::Updated;
        self.last_updated_by = Some(operator);
    }

    pub(crate) fn clear_stop_fields(&mut self) {
        self.stop_event_status = false;
        self.representative_stop_event_latitude = None;
        self.representative_stop_event_longitude = None;
        self.stop_event_sequence_number = None;
        self.cumulative_stop_event_time = None;
    }
}
