//! Densify sparse segments with synthetic pings along the OSRM driving
//! route.

use std::collections::HashSet;

use log::debug;

use crate::errors::OperatorError;
use crate::geo;
use crate::osrm::OsrmService;
use crate::ping::CleanedPing;
use crate::trace::CleanTrace;

/// Parameters for [`CleanTrace::interpolate`].
///
/// A consecutive eligible pair is routed only when its great-circle
/// separation falls inside `[min_insertion_dist_m, max_insertion_dist_m]`:
/// closer pairs are already dense, and a wider gap is more likely signal
/// loss than a drivable segment worth densifying.
#[derive(Clone, Copy, Debug)]
pub struct InterpolateParams {
    pub min_insertion_dist_m: f64,
    pub max_insertion_dist_m: f64,
}

impl Default for InterpolateParams {
    fn default() -> Self {
        Self {
            min_insertion_dist_m: 100.0,
            max_insertion_dist_m: 2000.0,
        }
    }
}

impl CleanTrace {
    /// Insert interpolated pings along the driving route between each
    /// consecutive pair of eligible pings whose separation lies in the
    /// insertion window.
    ///
    /// Requires [`map_match`](CleanTrace::map_match) to have run;
    /// otherwise returns [`OperatorError::Precondition`] without mutating
    /// state. The `K` intermediate route points between a pair `(A, B)`
    /// become pings `A_1 ... A_K` with timestamps linear in cumulative
    /// route distance, strictly inside `(A.timestamp, B.timestamp)`. Pairs
    /// whose route fails are skipped with a warning; pairs already
    /// separated by interpolated pings are skipped, so re-running is a
    /// no-op. Time order of the sequence is preserved.
    ///
    /// Returns the number of pings inserted.
    pub fn interpolate<S: OsrmService>(
        &mut self,
        engine: &S,
        params: &InterpolateParams,
    ) -> Result<usize, OperatorError> {
        if !self.map_matched {
            return Err(OperatorError::Precondition {
                operator: "interpolate",
                requirement: "map_match to have run first",
            });
        }

        let eligible = self.eligible_positions();
        let mut insertions: Vec<(usize, Vec<CleanedPing>)> = Vec::new();

        for pair in eligible.windows(2) {
            let (a_at, b_at) = (pair[0], pair[1]);
            if self.pings[a_at + 1..b_at]
                .iter()
                .any(|ping| ping.is_interpolated)
            {
                continue;
            }

            let a = &self.pings[a_at];
            let b = &self.pings[b_at];
            let (Some(a_point), Some(b_point)) = (a.cleaned_point(), b.cleaned_point()) else {
                continue;
            };

            let separation = geo::haversine_m(&a_point, &b_point);
            if separation < params.min_insertion_dist_m
                || separation > params.max_insertion_dist_m
            {
                continue;
            }

            let geometry = match engine.route(&a_point, &b_point) {
                Ok(geometry) => geometry,
                Err(e) => {
                    let warning = format!(
                        "interpolate route {} -> {} failed: {e}",
                        a.ping_id, b.ping_id
                    );
                    self.push_warning(warning);
                    continue;
                }
            };
            if geometry.len() < 3 {
                continue;
            }
            let intermediates = geometry.len() - 2;

            // The open interval (A.ts, B.ts) must hold K distinct ms
            // timestamps
            let span_ms = b.timestamp - a.timestamp;
            if span_ms <= intermediates as i64 {
                continue;
            }

            let mut cumulative = Vec::with_capacity(geometry.len());
            cumulative.push(0.0);
            let mut total = 0.0;
            for leg in geometry.windows(2) {
                total += geo::haversine_m(&leg[0], &leg[1]);
                cumulative.push(total);
            }
            if total <= 0.0 {
                continue;
            }

            let mut group = Vec::with_capacity(intermediates);
            let mut prev_ts = a.timestamp;
            for (n, point) in geometry[1..geometry.len() - 1].iter().enumerate() {
                let fraction = cumulative[n + 1] / total;
                let raw = a.timestamp + (fraction * span_ms as f64).round() as i64;
                let slots_after = (intermediates - n - 1) as i64;
                let ts = raw.max(prev_ts + 1).min(b.timestamp - 1 - slots_after);
                prev_ts = ts;
                group.push(CleanedPing::interpolated(
                    format!("{}_{}", a.ping_id, n + 1),
                    *point,
                    ts,
                ));
            }
            insertions.push((a_at, group));
        }

        // Verify id uniqueness before mutating anything: a collision (an
        // original ping literally named like an interpolated one) aborts
        // the operator with the trace untouched.
        let mut new_ids: HashSet<&str> = HashSet::new();
        for (_, group) in &insertions {
            for ping in group {
                if self.index.contains_key(&ping.ping_id) || !new_ids.insert(&ping.ping_id) {
                    return Err(OperatorError::Invariant(format!(
                        "interpolated ping id {:?} already exists in the trace",
                        ping.ping_id
                    )));
                }
            }
        }

        let inserted: usize = insertions.iter().map(|(_, group)| group.len()).sum();
        for (a_at, group) in insertions.into_iter().rev() {
            let at = a_at + 1;
            self.pings.splice(at..at, group);
        }
        if inserted > 0 {
            self.restore_time_order();
        }

        debug!("interpolate inserted {inserted} pings");
        Ok(inserted)
    }
}
