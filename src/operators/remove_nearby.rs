//! Drop pings that crowd the previous retained ping.

use log::debug;

use crate::Point;
use crate::errors::OperatorError;
use crate::geo;
use crate::ping::Operator;
use crate::trace::CleanTrace;

/// Parameters for [`CleanTrace::remove_nearby`].
#[derive(Clone, Copy, Debug)]
pub struct RemoveNearbyParams {
    /// Drop a ping closer than this to the last retained ping, in meters.
    pub min_dist_bw_consecutive_pings: f64,
}

impl Default for RemoveNearbyParams {
    fn default() -> Self {
        Self {
            min_dist_bw_consecutive_pings: 5.0,
        }
    }
}

impl CleanTrace {
    /// Walk the cleaned sequence in order keeping a "last retained ping"
    /// anchor; drop every candidate closer to the anchor than the
    /// threshold. The first located ping is the initial anchor and is
    /// always retained. Force-retained pings are never dropped and become
    /// the new anchor.
    ///
    /// Returns the number of pings dropped.
    pub fn remove_nearby(&mut self, params: &RemoveNearbyParams) -> Result<usize, OperatorError> {
        let threshold = params.min_dist_bw_consecutive_pings;
        let mut anchor: Option<Point> = None;
        let mut dropped = 0;

        for ping in &mut self.pings {
            if ping.is_interpolated || ping.is_dropped() {
                continue;
            }
            let Some(point) = ping.cleaned_point() else {
                continue;
            };
            match anchor {
                None => anchor = Some(point),
                Some(anchor_point) => {
                    if ping.force_retain {
                        anchor = Some(point);
                    } else if geo::haversine_m(&anchor_point, &point) < threshold {
                        ping.mark_dropped(Operator::RemoveNearby);
                        dropped += 1;
                    } else {
                        anchor = Some(point);
                    }
                }
            }
        }

        debug!("remove_nearby dropped {dropped} pings");
        Ok(dropped)
    }
}
