//! Concrete parameter combinations awaiting evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One point of the sweep: the `(c, g, p)` exponent triple handed to a
/// worker. A `None` component means that axis is disabled for this sweep and
/// the trainer's built-in default applies. Immutable once planned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub c: Option<f64>,
    pub g: Option<f64>,
    pub p: Option<f64>,
}

impl Job {
    pub fn new(c: Option<f64>, g: Option<f64>, p: Option<f64>) -> Self {
        Self { c, g, p }
    }

    /// Hashable identity for completed-job maps and resume matching.
    ///
    /// Exponents are produced deterministically by the same enumeration on
    /// every run and round-trip exactly through the progress file, so
    /// bit-pattern equality is the right notion of "same combination".
    pub fn key(&self) -> JobKey {
        JobKey([
            self.c.map(canonical_bits),
            self.g.map(canonical_bits),
            self.p.map(canonical_bits),
        ])
    }
}

impl fmt::Display for Job {
    /// Prints only the exponents of enabled axes, space separated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for value in [self.c, self.g, self.p].into_iter().flatten() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{value}")?;
            first = false;
        }
        Ok(())
    }
}

/// Map key derived from a [`Job`]'s exponent bit patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobKey([Option<u64>; 3]);

// Collapse -0.0 onto 0.0 so the two compare equal as keys.
fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_skips_disabled_axes() {
        let job = Job::new(Some(-1.0), None, Some(2.5));
        assert_eq!(job.to_string(), "-1 2.5");

        let job = Job::new(None, None, Some(3.0));
        assert_eq!(job.to_string(), "3");
    }

    #[test]
    fn keys_distinguish_disabled_from_zero() {
        let zero = Job::new(Some(0.0), None, None);
        let disabled = Job::new(None, None, None);
        assert_ne!(zero.key(), disabled.key());
    }

    #[test]
    fn negative_zero_matches_zero() {
        let a = Job::new(Some(0.0), None, None);
        let b = Job::new(Some(-0.0), None, None);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn keys_round_trip_through_text() {
        let job = Job::new(Some(-1.0), Some(0.30000000000000004), None);
        let reparsed = Job::new(
            job.c.map(|v| v.to_string().parse().unwrap()),
            job.g.map(|v| v.to_string().parse().unwrap()),
            None,
        );
        assert_eq!(job.key(), reparsed.key());
    }
}
