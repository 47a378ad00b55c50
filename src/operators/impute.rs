//! Pull distorted pings back to the spherical midpoint of their
//! neighbours, judged either by detour distance or by turn angle.

use log::debug;

use crate::Point;
use crate::errors::OperatorError;
use crate::geo;
use crate::ping::{CleanedPing, Operator};
use crate::trace::CleanTrace;

/// Parameters for [`CleanTrace::impute_by_distance`].
#[derive(Clone, Copy, Debug)]
pub struct ImputeDistanceParams {
    /// Impute when the detour through the ping exceeds this multiple of
    /// the direct distance between its neighbours.
    pub max_dist_ratio: f64,
}

impl Default for ImputeDistanceParams {
    fn default() -> Self {
        Self { max_dist_ratio: 3.0 }
    }
}

/// Parameters for [`CleanTrace::impute_by_angle`].
#[derive(Clone, Copy, Debug)]
pub struct ImputeAngleParams {
    /// Impute when the unsigned turn at the ping exceeds this many
    /// degrees.
    pub max_delta_angle: f64,
}

impl Default for ImputeAngleParams {
    fn default() -> Self {
        Self {
            max_delta_angle: 120.0,
        }
    }
}

/// The nearest located, non-dropped neighbours on either side of `at`.
fn located_neighbours(pings: &[CleanedPing], at: usize) -> Option<(Point, Point)> {
    let prev = pings[..at]
        .iter()
        .rev()
        .filter(|ping| !ping.is_dropped())
        .find_map(|ping| ping.cleaned_point())?;
    let next = pings[at + 1..]
        .iter()
        .filter(|ping| !ping.is_dropped())
        .find_map(|ping| ping.cleaned_point())?;
    Some((prev, next))
}

impl CleanTrace {
    /// Replace distance outliers with the midpoint of their neighbours.
    ///
    /// An interior ping whose path through it (`prev -> ping -> next`)
    /// exceeds `max_dist_ratio` times the direct `prev -> next` distance is
    /// moved to the spherical midpoint of those neighbours. End pings are
    /// left unchanged; `force_retain` does not exempt a ping from
    /// imputation. The scan is sequential, so an imputed ping serves as a
    /// neighbour for later candidates.
    ///
    /// Returns the number of pings updated.
    pub fn impute_by_distance(
        &mut self,
        params: &ImputeDistanceParams,
    ) -> Result<usize, OperatorError> {
        let mut updated = 0;
        if self.pings.len() < 3 {
            return Ok(updated);
        }

        for at in 1..self.pings.len() - 1 {
            let ping = &self.pings[at];
            if ping.is_interpolated || ping.is_dropped() {
                continue;
            }
            let Some(current) = ping.cleaned_point() else {
                continue;
            };
            let Some((prev, next)) = located_neighbours(&self.pings, at) else {
                continue;
            };

            let detour =
                geo::haversine_m(&prev, &current) + geo::haversine_m(&current, &next);
            let direct = geo::haversine_m(&prev, &next);
            if direct > 0.0 && detour / direct > params.max_dist_ratio {
                let midpoint = geo::spherical_midpoint(&prev, &next);
                self.pings[at].mark_updated(Operator::ImputeDistance, midpoint);
                updated += 1;
            }
        }

        debug!("impute_by_distance updated {updated} pings");
        Ok(updated)
    }

    /// Replace implausibly sharp turns with the midpoint of their
    /// neighbours.
    ///
    /// Neighbour selection matches
    /// [`impute_by_distance`](CleanTrace::impute_by_distance); the
    /// criterion is the unsigned turn between the `prev -> ping` and
    /// `ping -> next` bearings.
    ///
    /// Returns the number of pings updated.
    pub fn impute_by_angle(&mut self, params: &ImputeAngleParams) -> Result<usize, OperatorError> {
        let mut updated = 0;
        if self.pings.len() < 3 {
            return Ok(updated);
        }

        for at in 1..self.pings.len() - 1 {
            let ping = &self.pings[at];
            if ping.is_interpolated || ping.is_dropped() {
                continue;
            }
            let Some(current) = ping.cleaned_point() else {
                continue;
            };
            let Some((prev, next)) = located_neighbours(&self.pings, at) else {
                continue;
            };

            let inbound = geo::initial_bearing_deg(&prev, &current);
            let outbound = geo::initial_bearing_deg(&current, &next);
            if geo::angular_delta_deg(inbound, outbound) > params.max_delta_angle {
                let midpoint = geo::spherical_midpoint(&prev, &next);
                self.pings[at].mark_updated(Operator::ImputeAngle, midpoint);
                updated += 1;
            }
        }

        debug!("impute_by_angle updated {updated} pings");
        Ok(updated)
    }
}
