//! The cleaning operators.
//!
//! Each operator is a method on [`CleanTrace`](crate::CleanTrace) that
//! reads the current cleaned sequence and writes provenance back onto the
//! pings it mutates. Operators are order-dependent and invoked serially in
//! whatever order the caller chooses; each skips pings that are already
//! dropped and pings inserted by the interpolator, and re-running an
//! operator with equal parameters is a no-op.

mod impute;
mod interpolate;
mod map_match;
mod remove_nearby;

pub use impute::{ImputeAngleParams, ImputeDistanceParams};
pub use interpolate::InterpolateParams;
pub use map_match::MapMatchParams;
pub use remove_nearby::RemoveNearbyParams;
