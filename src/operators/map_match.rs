//! Snap pings to the road network through the OSRM match service.

use log::debug;

use crate::Point;
use crate::errors::OperatorError;
use crate::osrm::OsrmService;
use crate::ping::Operator;
use crate::trace::CleanTrace;

/// Parameters for [`CleanTrace::map_match`].
#[derive(Clone, Copy, Debug)]
pub struct MapMatchParams {
    /// Number of pings sent per match request. Sizes above 100 are
    /// permitted but warned about: the server may reject the request.
    pub ping_batch_size: usize,
}

impl Default for MapMatchParams {
    fn default() -> Self {
        Self { ping_batch_size: 5 }
    }
}

impl CleanTrace {
    /// Partition the eligible pings (not dropped, not interpolated,
    /// located) into contiguous batches and match each batch against the
    /// road network. A snapped point that differs from the current cleaned
    /// coordinate updates the ping; null tracepoints leave their ping
    /// unchanged. A batch that fails wholly (transport, non-2xx or parse
    /// failure) leaves its pings unchanged and records a warning.
    ///
    /// Returns the number of pings updated.
    pub fn map_match<S: OsrmService>(
        &mut self,
        engine: &S,
        params: &MapMatchParams,
    ) -> Result<usize, OperatorError> {
        if params.ping_batch_size == 0 {
            return Err(OperatorError::Precondition {
                operator: "map_match",
                requirement: "a non-zero ping_batch_size",
            });
        }
        if params.ping_batch_size > 100 {
            self.push_warning(format!(
                "map_match batch size {} exceeds 100; the server may reject it",
                params.ping_batch_size
            ));
        }

        let eligible = self.eligible_positions();
        let mut updated = 0;

        for batch in eligible.chunks(params.ping_batch_size) {
            let points: Vec<Point> = batch
                .iter()
                .filter_map(|&at| self.pings[at].cleaned_point())
                .collect();

            let snapped = match engine.match_batch(&points) {
                Ok(snapped) if snapped.len() == points.len() => snapped,
                Ok(snapped) => {
                    self.push_warning(format!(
                        "map_match batch starting at ping {} returned {} tracepoints for {} points; batch skipped",
                        self.pings[batch[0]].ping_id,
                        snapped.len(),
                        points.len()
                    ));
                    continue;
                }
                Err(e) => {
                    self.push_warning(format!(
                        "map_match batch starting at ping {} failed: {e}",
                        self.pings[batch[0]].ping_id
                    ));
                    continue;
                }
            };

            for (&at, snap) in batch.iter().zip(&snapped) {
                if let Some(point) = snap {
                    if self.pings[at].cleaned_point() != Some(*point) {
                        self.pings[at].mark_updated(Operator::MapMatch, *point);
                        updated += 1;
                    }
                }
            }
        }

        self.map_matched = true;
        debug!(
            "map_match updated {updated} of {} eligible pings",
            eligible.len()
        );
        Ok(updated)
    }
}
