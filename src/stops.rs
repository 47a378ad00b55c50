//! Stop-event detection: a two-pass clustering over the cleaned sequence.
//!
//! Pass one groups consecutive located pings that linger near a common
//! origin for long enough. Pass two merges groups whose medoids sit close
//! together, so a vehicle that creeps a few meters during a stop still
//! produces one event. Dropped pings are invisible to both passes.

use log::debug;

use crate::Point;
use crate::geo;
use crate::trace::CleanTrace;

/// Parameters for [`CleanTrace::detect_stop_events`].
#[derive(Clone, Copy, Debug)]
pub struct StopDetectionParams {
    /// A candidate group extends while the next ping stays within this
    /// many meters of the group's first ping.
    pub max_dist_bw_consecutive_pings: f64,
    /// Merge radius between group medoids. Compared against the euclidean
    /// distance between medoids IN DECIMAL DEGREES of latitude/longitude,
    /// preserving the unit convention of the clustering library this
    /// detector descends from. Not meters.
    pub max_dist_for_merging_stop_points: f64,
    /// A candidate becomes a stop event only when it spans at least this
    /// many seconds.
    pub min_staying_time_s: i64,
    /// A candidate becomes a stop event only with at least this many
    /// pings.
    pub min_size: usize,
}

impl Default for StopDetectionParams {
    fn default() -> Self {
        Self {
            max_dist_bw_consecutive_pings: 10.0,
            max_dist_for_merging_stop_points: 0.001,
            min_staying_time_s: 120,
            min_size: 2,
        }
    }
}

impl CleanTrace {
    /// Detect stop events and annotate every member ping with its event's
    /// representative coordinates, sequence number and elapsed time.
    /// Previous stop annotations are cleared first, so re-running with
    /// different parameters replaces the old events.
    ///
    /// Returns the number of stop events found.
    pub fn detect_stop_events(&mut self, params: &StopDetectionParams) -> usize {
        for ping in &mut self.pings {
            ping.clear_stop_fields();
        }

        // Each member is carried as (position, point) so the passes never
        // have to re-derive coordinates
        let located: Vec<(usize, Point)> = self
            .pings
            .iter()
            .enumerate()
            .filter(|(_, ping)| !ping.is_dropped())
            .filter_map(|(at, ping)| ping.cleaned_point().map(|point| (at, point)))
            .collect();

        // Pass one: temporal grouping around each group's first ping.
        let mut candidates: Vec<Vec<(usize, Point)>> = Vec::new();
        let mut i = 0;
        while i < located.len() {
            let (_, first) = located[i];
            let mut j = i + 1;
            while j < located.len()
                && geo::haversine_m(&first, &located[j].1)
                    <= params.max_dist_bw_consecutive_pings
            {
                j += 1;
            }
            let span_s = (self.pings[located[j - 1].0].timestamp
                - self.pings[located[i].0].timestamp)
                / 1000;
            if j - i >= params.min_size && span_s >= params.min_staying_time_s {
                candidates.push(located[i..j].to_vec());
            }
            i = j;
        }
        if candidates.is_empty() {
            return 0;
        }

        // Pass two: merge candidates whose medoids sit within the degree-
        // space radius, via connected components.
        let medoids: Vec<Point> = candidates.iter().map(|members| medoid(members)).collect();
        let mut parent: Vec<usize> = (0..candidates.len()).collect();
        for a in 0..medoids.len() {
            for b in a + 1..medoids.len() {
                if degree_distance(&medoids[a], &medoids[b])
                    <= params.max_dist_for_merging_stop_points
                {
                    union(&mut parent, a, b);
                }
            }
        }

        let mut components: Vec<Vec<(usize, Point)>> = Vec::new();
        let mut component_of = vec![usize::MAX; candidates.len()];
        for candidate in 0..candidates.len() {
            let root = find(&mut parent, candidate);
            if component_of[root] == usize::MAX {
                component_of[root] = components.len();
                components.push(Vec::new());
            }
            components[component_of[root]].extend(&candidates[candidate]);
        }
        for members in &mut components {
            members.sort_unstable_by_key(|&(at, _)| at);
        }
        // Sequence numbers follow each component's earliest member ping
        components.sort_by_key(|members| self.pings[members[0].0].timestamp);

        for (sequence, members) in components.iter().enumerate() {
            let representative = medoid(members);
            let first_ts = self.pings[members[0].0].timestamp;
            for &(at, _) in members {
                let elapsed_ms = self.pings[at].timestamp - first_ts;
                let ping = &mut self.pings[at];
                ping.stop_event_status = true;
                ping.representative_stop_event_latitude = Some(representative.latitude());
                ping.representative_stop_event_longitude = Some(representative.longitude());
                ping.stop_event_sequence_number = Some(sequence as u32 + 1);
                ping.cumulative_stop_event_time = Some(format_elapsed(elapsed_ms));
            }
        }

        debug!(
            "detected {} stop events from {} candidate groups",
            components.len(),
            candidates.len()
        );
        components.len()
    }
}

/// The member minimizing the sum of great-circle distances to the others;
/// ties go to the earliest member.
fn medoid(members: &[(usize, Point)]) -> Point {
    let mut best = 0;
    let mut best_sum = f64::INFINITY;
    for (i, (_, candidate)) in members.iter().enumerate() {
        let sum: f64 = members
            .iter()
            .map(|(_, other)| geo::haversine_m(candidate, other))
            .sum();
        if sum < best_sum {
            best_sum = sum;
            best = i;
        }
    }
    members[best].1
}

fn degree_distance(a: &Point, b: &Point) -> f64 {
    let dlat = a.latitude() - b.latitude();
    let dlon = a.longitude() - b.longitude();
    (dlat * dlat + dlon * dlon).sqrt()
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[rb] = ra;
    }
}

/// Format elapsed milliseconds as "Xm Ys".
fn format_elapsed(elapsed_ms: i64) -> String {
    let seconds = elapsed_ms / 1000;
    format!("{}m {}s", seconds / 60, seconds % 60)
}
