//! Enrichment, summaries and output assembly.

mod common;
use common::{ScriptedRouteEngine, point, trace_of};

use trace_cleaner::geo::haversine_m;
use trace_cleaner::operators::{
    ImputeDistanceParams, InterpolateParams, MapMatchParams, RemoveNearbyParams,
};
use trace_cleaner::{CleanTrace, PingInput, TracePayload, UpdateStatus};

#[test]
fn test_enrichment_gaps_and_cumulatives() {
    let mut trace = trace_of(vec![
        PingInput::new(19.000, 73.0, 0),
        PingInput::new(19.001, 73.0, 60_000),
        PingInput::new(19.00101, 73.0, 70_000),
        PingInput::new(19.003, 73.0, 180_000),
    ]);
    trace
        .remove_nearby(&RemoveNearbyParams::default())
        .expect("remove_nearby should not fail");
    assert!(trace.pings()[2].is_dropped(), "Fixture expects the third ping dropped");

    let output = trace.output();
    let pings = &output.cleaned_trace;

    assert_eq!(pings[0].time_from_prev_ms, Some(0));
    assert_eq!(pings[0].distance_from_prev_m, Some(0.0));
    assert_eq!(pings[0].cumulative_time_ms, Some(0));

    let d01 = haversine_m(&point(19.000, 73.0), &point(19.001, 73.0));
    assert_eq!(pings[1].time_from_prev_ms, Some(60_000));
    assert!((pings[1].distance_from_prev_m.unwrap() - d01).abs() < 1e-9);

    // The dropped ping carries null gaps and inherits the running cumulative
    assert_eq!(pings[2].time_from_prev_ms, None);
    assert_eq!(pings[2].distance_from_prev_m, None);
    assert_eq!(pings[2].cumulative_time_ms, pings[1].cumulative_time_ms);
    assert_eq!(pings[2].cumulative_distance_m, pings[1].cumulative_distance_m);

    // The next located ping bridges the gap back to ping 1
    let d13 = haversine_m(&point(19.001, 73.0), &point(19.003, 73.0));
    assert_eq!(pings[3].time_from_prev_ms, Some(120_000));
    assert!((pings[3].distance_from_prev_m.unwrap() - d13).abs() < 1e-9);
    assert!((pings[3].cumulative_distance_m.unwrap() - (d01 + d13)).abs() < 1e-9);
    assert_eq!(pings[3].cumulative_time_ms, Some(180_000));
}

#[test]
fn test_cumulative_distance_is_monotonic() {
    let mut trace = trace_of(vec![
        PingInput::new(19.000, 73.000, 0),
        PingInput::new(19.0000001, 73.0, 1_000),
        PingInput::new(19.002, 73.001, 120_000),
        PingInput::new(19.004, 73.001, 240_000),
    ]);
    trace
        .remove_nearby(&RemoveNearbyParams::default())
        .expect("remove_nearby should not fail");
    let output = trace.output();

    let cumulative: Vec<f64> = output
        .cleaned_trace
        .iter()
        .filter_map(|p| p.cumulative_distance_m)
        .collect();
    assert!(
        cumulative.windows(2).all(|w| w[0] <= w[1]),
        "Cumulative distance must never decrease: {cumulative:?}"
    );
}

#[test]
fn test_distance_summary_reduction() {
    let mut trace = trace_of(vec![
        PingInput::new(19.00, 73.0, 0),
        PingInput::new(19.50, 73.0, 60_000),
        PingInput::new(19.005, 73.0, 120_000),
    ]);
    trace
        .impute_by_distance(&ImputeDistanceParams::default())
        .expect("impute_by_distance should not fail");
    let output = trace.output();
    let summary = &output.distance_summary;

    let raw_expected = haversine_m(&point(19.00, 73.0), &point(19.50, 73.0))
        + haversine_m(&point(19.50, 73.0), &point(19.005, 73.0));
    assert!((summary.raw_distance_m - raw_expected).abs() < 1e-6);
    assert!(
        summary.cleaned_distance_m < summary.raw_distance_m,
        "Imputation should shorten the path"
    );
    assert!(
        (summary.reduction_m - (summary.raw_distance_m - summary.cleaned_distance_m)).abs()
            < 1e-9,
        "reduction_m must equal raw minus cleaned"
    );
    let pct_expected = summary.reduction_m / summary.raw_distance_m * 100.0;
    assert!((summary.reduction_pct - pct_expected).abs() < 1e-9);
}

#[test]
fn test_distance_summary_of_an_unlocated_trace_is_zero() {
    let mut trace = trace_of(vec![
        PingInput {
            timestamp: 0,
            ..PingInput::default()
        },
        PingInput {
            timestamp: 1000,
            ..PingInput::default()
        },
    ]);
    let output = trace.output();
    assert_eq!(output.distance_summary.raw_distance_m, 0.0);
    assert_eq!(output.distance_summary.reduction_pct, 0.0, "No division by zero");
}

#[test]
fn test_cleaning_summary_is_consistent_after_a_full_run() {
    let mut pings = vec![
        PingInput::new(19.0000, 73.0, 0),
        // Crowds the first ping: dropped
        PingInput::new(19.00001, 73.0, 30_000),
        // Distance outlier: imputed
        PingInput::new(19.4000, 73.0, 60_000),
        PingInput::new(19.0040, 73.0, 90_000),
    ];
    // An unlocated ping rides along untouched
    pings.push(PingInput {
        timestamp: 120_000,
        ..PingInput::default()
    });
    let mut trace = trace_of(pings);

    trace
        .remove_nearby(&RemoveNearbyParams::default())
        .expect("remove_nearby should not fail");
    trace
        .impute_by_distance(&ImputeDistanceParams::default())
        .expect("impute_by_distance should not fail");
    let engine = ScriptedRouteEngine::new(vec![Ok(vec![
        point(19.002, 73.0),
        point(19.003, 73.0),
        point(19.0040, 73.0),
    ])]);
    trace
        .map_match(&engine, &MapMatchParams::default())
        .expect("map_match should not fail");
    trace
        .interpolate(&engine, &InterpolateParams::default())
        .expect("interpolate should not fail");

    let output = trace.output();
    let summary = &output.cleaning_summary;

    let unchanged_non_null = output
        .cleaned_trace
        .iter()
        .filter(|p| p.update_status == UpdateStatus::Unchanged && p.cleaned_point().is_some())
        .count();
    assert_eq!(
        summary.dropped + summary.updated + summary.interpolated + unchanged_non_null,
        summary.output_non_null_pings + summary.dropped,
        "Cleaning summary must balance"
    );
    assert_eq!(
        summary.input_non_null_pings, 4,
        "Interpolated and unlocated pings carry no input coords"
    );
    assert_eq!(summary.dropped, 1);
    assert!(summary.updated >= 1, "The imputed outlier counts as updated");
    assert_eq!(summary.interpolated, 1);
}

#[test]
fn test_output_preserves_order_and_id_uniqueness() {
    let mut trace = trace_of(vec![
        PingInput::new(19.0000, 73.0, 0),
        PingInput::new(19.00001, 73.0, 10_000),
        PingInput::new(19.0040, 73.0, 40_000),
        PingInput::new(19.0080, 73.0, 80_000),
    ]);
    trace
        .remove_nearby(&RemoveNearbyParams::default())
        .expect("remove_nearby should not fail");
    let engine = ScriptedRouteEngine::new(vec![
        Ok(vec![
            point(19.0000, 73.0),
            point(19.0020, 73.0),
            point(19.0040, 73.0),
        ]),
        Ok(vec![
            point(19.0040, 73.0),
            point(19.0060, 73.0),
            point(19.0080, 73.0),
        ]),
    ]);
    trace
        .map_match(&engine, &MapMatchParams::default())
        .expect("map_match should not fail");
    trace
        .interpolate(&engine, &InterpolateParams::default())
        .expect("interpolate should not fail");

    let output = trace.output();
    let timestamps: Vec<i64> = output.cleaned_trace.iter().map(|p| p.timestamp).collect();
    assert!(
        timestamps.windows(2).all(|w| w[0] <= w[1]),
        "Output must be time-sorted: {timestamps:?}"
    );

    let mut ids: Vec<&str> = output
        .cleaned_trace
        .iter()
        .map(|p| p.ping_id.as_str())
        .collect();
    let before = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), before, "All ping ids must be distinct");
}

#[test]
fn test_output_echoes_vehicle_attributes_and_warnings() {
    let payload = TracePayload {
        trace: vec![
            PingInput::new(19.000, 73.0, 0),
            PingInput::new(19.009, 73.0, 10_000),
        ],
        vehicle_type: "truck".to_string(),
        vehicle_speed: 40.0,
    };
    let mut trace = CleanTrace::from_payload(payload).expect("Invalid payload");

    // Unscripted route: the pair fails and leaves a warning
    let engine = ScriptedRouteEngine::new(vec![]);
    trace
        .map_match(&engine, &MapMatchParams::default())
        .expect("map_match should not fail");
    trace
        .interpolate(&engine, &InterpolateParams::default())
        .expect("interpolate should not fail");

    let output = trace.output();
    assert_eq!(output.vehicle_type, "truck");
    assert_eq!(output.vehicle_speed, 40.0);
    assert_eq!(output.warnings.len(), 1, "The failed route surfaces in the output");
}

#[test]
fn test_output_serialization_uses_wire_names() {
    let mut trace = trace_of(vec![
        PingInput::new(19.0000, 73.0, 0),
        PingInput::new(19.00001, 73.0, 1000),
        PingInput::new(19.0010, 73.0, 2000),
    ]);
    trace
        .remove_nearby(&RemoveNearbyParams::default())
        .expect("remove_nearby should not fail");

    let output = trace.output();
    let document = serde_json::to_value(&output).expect("Output should serialize");

    let dropped = &document["cleaned_trace"][1];
    assert_eq!(dropped["update_status"], "dropped");
    assert_eq!(dropped["last_updated_by"], "remove_nearby");
    assert_eq!(dropped["cleaned_latitude"], serde_json::Value::Null);
    assert_eq!(document["cleaning_summary"]["dropped"], 1);
    assert_eq!(document["vehicle_type"], "car");
    assert!(
        document["distance_summary"]["raw_distance_m"].is_number(),
        "Summaries serialize numerically"
    );
}
