//! Exponent axis definitions and range enumeration.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::GridError;

/// A sweepable exponent range: `begin, begin + step, …` up to and including
/// `end` when a step lands on it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub begin: f64,
    pub end: f64,
    pub step: f64,
}

impl AxisRange {
    pub fn new(begin: f64, end: f64, step: f64) -> Self {
        Self { begin, end, step }
    }

    /// Enumerate the raw axis values by repeated addition from `begin`,
    /// stopping once the next value would cross `end` in the direction of
    /// `step`. `begin` itself is always included.
    pub fn enumerate(&self) -> Result<Vec<f64>, GridError> {
        if self.step == 0.0 {
            return Err(GridError::ZeroStep);
        }
        if self.begin != self.end && (self.end - self.begin).signum() != self.step.signum() {
            return Err(GridError::StepDirection {
                begin: self.begin,
                end: self.end,
                step: self.step,
            });
        }

        let mut values = Vec::new();
        let mut current = self.begin;
        loop {
            if self.step > 0.0 && current > self.end {
                break;
            }
            if self.step < 0.0 && current < self.end {
                break;
            }
            values.push(current);
            current += self.step;
        }
        Ok(values)
    }
}

/// One parameter dimension of the sweep: either a swept range or disabled
/// entirely, in which case the trainer runs with its built-in default and
/// the grid loses that dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AxisSpec {
    Sweep(AxisRange),
    Disabled,
}

impl AxisSpec {
    pub fn is_disabled(&self) -> bool {
        matches!(self, AxisSpec::Disabled)
    }
}

impl FromStr for AxisSpec {
    type Err = GridError;

    /// Parse the command-line axis shape: `"begin,end,step"` or `"null"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "null" {
            return Ok(AxisSpec::Disabled);
        }
        let invalid = || GridError::InvalidRange {
            input: s.to_string(),
        };
        let mut parts = s.split(',');
        let mut next = || -> Result<f64, GridError> {
            parts
                .next()
                .ok_or_else(invalid)?
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid())
        };
        let range = AxisRange::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(AxisSpec::Sweep(range))
    }
}
