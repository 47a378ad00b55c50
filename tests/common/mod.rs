//! Shared fixtures: payload constructors and scripted OSRM engines for
//! driving the operators without a running backend.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use trace_cleaner::errors::OsrmBatchError;
use trace_cleaner::osrm::OsrmService;
use trace_cleaner::{CleanTrace, PingInput, Point, TracePayload};

/// Build a trace straight from located pings.
pub fn trace_of(pings: Vec<PingInput>) -> CleanTrace {
    CleanTrace::from_payload(TracePayload::new(pings)).expect("Invalid fixture payload")
}

pub fn point(latitude: f64, longitude: f64) -> Point {
    Point::new(latitude, longitude).expect("Invalid fixture point")
}

/// An engine whose match responses are scripted per batch, in call order.
/// Batches beyond the script are snapped to themselves. Routing always
/// fails.
pub struct ScriptedMatchEngine {
    batches: RefCell<VecDeque<Result<Vec<Option<Point>>, OsrmBatchError>>>,
    batch_sizes: RefCell<Vec<usize>>,
}

impl ScriptedMatchEngine {
    pub fn new(batches: Vec<Result<Vec<Option<Point>>, OsrmBatchError>>) -> Self {
        Self {
            batches: RefCell::new(batches.into()),
            batch_sizes: RefCell::new(Vec::new()),
        }
    }

    /// Identity snapping for every batch.
    pub fn identity() -> Self {
        Self::new(Vec::new())
    }

    /// The batch sizes received so far, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.borrow().clone()
    }
}

impl OsrmService for ScriptedMatchEngine {
    fn match_batch(&self, points: &[Point]) -> Result<Vec<Option<Point>>, OsrmBatchError> {
        self.batch_sizes.borrow_mut().push(points.len());
        match self.batches.borrow_mut().pop_front() {
            Some(scripted) => scripted,
            None => Ok(points.iter().copied().map(Some).collect()),
        }
    }

    fn route(&self, _from: &Point, _to: &Point) -> Result<Vec<Point>, OsrmBatchError> {
        Err(OsrmBatchError::Endpoint(
            "route not scripted for this engine".to_string(),
        ))
    }
}

/// An engine whose route responses are scripted per pair, in call order;
/// match snaps every point to itself. Pairs beyond the script fail.
pub struct ScriptedRouteEngine {
    routes: RefCell<VecDeque<Result<Vec<Point>, OsrmBatchError>>>,
    route_calls: RefCell<usize>,
}

impl ScriptedRouteEngine {
    pub fn new(routes: Vec<Result<Vec<Point>, OsrmBatchError>>) -> Self {
        Self {
            routes: RefCell::new(routes.into()),
            route_calls: RefCell::new(0),
        }
    }

    pub fn route_calls(&self) -> usize {
        *self.route_calls.borrow()
    }
}

impl OsrmService for ScriptedRouteEngine {
    fn match_batch(&self, points: &[Point]) -> Result<Vec<Option<Point>>, OsrmBatchError> {
        Ok(points.iter().copied().map(Some).collect())
    }

    fn route(&self, _from: &Point, _to: &Point) -> Result<Vec<Point>, OsrmBatchError> {
        *self.route_calls.borrow_mut() += 1;
        match self.routes.borrow_mut().pop_front() {
            Some(scripted) => scripted,
            None => Err(OsrmBatchError::Endpoint(
                "no scripted route left".to_string(),
            )),
        }
    }
}
