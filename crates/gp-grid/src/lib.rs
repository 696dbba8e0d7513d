//! # gp-grid
//!
//! Parameter axes and grid planning for GridPilot.
//!
//! Provides exponent axis definitions with range enumeration, the
//! midpoint-first visiting order used to spread early trials across the
//! whole search space, and cartesian grid expansion into concrete jobs.

mod axis;
mod error;
mod grid;
mod job;

pub use axis::{AxisRange, AxisSpec};
pub use error::GridError;
pub use grid::{interleave, GridAxes};
pub use job::{Job, JobKey};
