//! Grid expansion and the visiting order of the sweep.

use serde::{Deserialize, Serialize};

use crate::axis::{AxisRange, AxisSpec};
use crate::error::GridError;
use crate::job::Job;

/// Reorder a sweep so early trials already sample the whole range: emit the
/// midpoint first, then alternate between the recursively reordered left and
/// right halves. Partial runs therefore cover the space coarsely before
/// refining, which keeps incremental best-tracking meaningful.
///
/// The result is a permutation of the input for every length.
pub fn interleave(seq: &[f64]) -> Vec<f64> {
    if seq.len() <= 1 {
        return seq.to_vec();
    }
    let mid = seq.len() / 2;
    let left = interleave(&seq[..mid]);
    let right = interleave(&seq[mid + 1..]);

    let mut out = Vec::with_capacity(seq.len());
    out.push(seq[mid]);
    let mut left = left.into_iter();
    let mut right = right.into_iter();
    loop {
        match (left.next(), right.next()) {
            (None, None) => break,
            (l, r) => {
                out.extend(l);
                out.extend(r);
            }
        }
    }
    out
}

/// The three exponent axes of a sweep. Defaults match the classic
/// epsilon-SVR search: `c` swept upward, `g` and `p` over negative
/// exponents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridAxes {
    pub c: AxisSpec,
    pub g: AxisSpec,
    pub p: AxisSpec,
}

impl Default for GridAxes {
    fn default() -> Self {
        Self {
            c: AxisSpec::Sweep(AxisRange::new(-1.0, 6.0, 1.0)),
            g: AxisSpec::Sweep(AxisRange::new(0.0, -8.0, -1.0)),
            p: AxisSpec::Sweep(AxisRange::new(-8.0, -1.0, 1.0)),
        }
    }
}

impl GridAxes {
    pub fn new(c: AxisSpec, g: AxisSpec, p: AxisSpec) -> Self {
        Self { c, g, p }
    }

    /// Expand the axes into the full job list in dispatch order: each axis
    /// enumerated and interleaved independently, disabled axes collapsed to
    /// a single absent placeholder, then the cartesian product taken
    /// axis-major (`c` varies slowest, `p` fastest).
    pub fn plan(&self) -> Result<Vec<Job>, GridError> {
        if self.c.is_disabled() && self.g.is_disabled() && self.p.is_disabled() {
            return Err(GridError::AllAxesDisabled);
        }

        let c_seq = axis_values(&self.c)?;
        let g_seq = axis_values(&self.g)?;
        let p_seq = axis_values(&self.p)?;

        let mut jobs = Vec::with_capacity(c_seq.len() * g_seq.len() * p_seq.len());
        for &c in &c_seq {
            for &g in &g_seq {
                for &p in &p_seq {
                    jobs.push(Job::new(c, g, p));
                }
            }
        }
        Ok(jobs)
    }
}

fn axis_values(spec: &AxisSpec) -> Result<Vec<Option<f64>>, GridError> {
    match spec {
        AxisSpec::Sweep(range) => {
            let values = interleave(&range.enumerate()?);
            Ok(values.into_iter().map(Some).collect())
        }
        AxisSpec::Disabled => Ok(vec![None]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut values: Vec<f64>) -> Vec<f64> {
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        values
    }

    #[test]
    fn interleave_is_a_permutation_for_every_small_length() {
        for n in 0..=9 {
            let seq: Vec<f64> = (0..n).map(f64::from).collect();
            let out = interleave(&seq);
            assert_eq!(out.len(), seq.len());
            assert_eq!(sorted(out), seq, "length {n}");
        }
    }

    #[test]
    fn interleave_handles_trivial_inputs() {
        assert!(interleave(&[]).is_empty());
        assert_eq!(interleave(&[7.0]), vec![7.0]);
    }

    #[test]
    fn interleave_emits_midpoint_first_then_alternates() {
        let seq: Vec<f64> = (0..7).map(f64::from).collect();
        assert_eq!(interleave(&seq), vec![3.0, 1.0, 5.0, 0.0, 4.0, 2.0, 6.0]);
    }

    #[test]
    fn plan_produces_full_cartesian_product() {
        let axes = GridAxes::new(
            AxisSpec::Sweep(AxisRange::new(-1.0, 1.0, 1.0)),
            AxisSpec::Sweep(AxisRange::new(0.0, -1.0, -1.0)),
            AxisSpec::Disabled,
        );
        let jobs = axes.plan().unwrap();
        assert_eq!(jobs.len(), 6);
        assert!(jobs.iter().all(|j| j.p.is_none()));
    }

    #[test]
    fn plan_is_axis_major() {
        let axes = GridAxes::new(
            AxisSpec::Sweep(AxisRange::new(0.0, 1.0, 1.0)),
            AxisSpec::Sweep(AxisRange::new(0.0, 1.0, 1.0)),
            AxisSpec::Disabled,
        );
        let jobs = axes.plan().unwrap();
        // Outermost axis varies slowest: both g values appear before c moves on.
        assert_eq!(jobs[0].c, jobs[1].c);
        assert_ne!(jobs[1].c, jobs[2].c);
        assert_eq!(jobs[2].c, jobs[3].c);
    }

    #[test]
    fn single_enabled_axis_degenerates_to_one_dimension() {
        let axes = GridAxes::new(
            AxisSpec::Sweep(AxisRange::new(-1.0, 1.0, 1.0)),
            AxisSpec::Disabled,
            AxisSpec::Disabled,
        );
        let jobs = axes.plan().unwrap();
        assert_eq!(jobs.len(), 3);
        // Midpoint of [-1, 0, 1] is visited first.
        assert_eq!(jobs[0].c, Some(0.0));
        assert!(jobs.iter().all(|j| j.g.is_none() && j.p.is_none()));
    }

    #[test]
    fn all_axes_disabled_is_rejected() {
        let axes = GridAxes::new(AxisSpec::Disabled, AxisSpec::Disabled, AxisSpec::Disabled);
        assert!(matches!(axes.plan(), Err(GridError::AllAxesDisabled)));
    }

    #[test]
    fn default_axes_match_the_classic_search() {
        let jobs = GridAxes::default().plan().unwrap();
        // 8 c-values x 9 g-values x 8 p-values
        assert_eq!(jobs.len(), 8 * 9 * 8);
    }
}
