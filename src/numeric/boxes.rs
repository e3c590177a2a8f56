//! Axis-aligned boxes: Cartesian products of closed intervals.

use std::fmt;

use crate::logic::Tribool;
use crate::numeric::Interval;

/// The Cartesian product of one closed interval per coordinate axis.
///
/// Boxes are the common currency between the paving engine and its set
/// oracles: cells map to boxes, and every oracle query takes one.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalBox {
    intervals: Vec<Interval>,
}

impl IntervalBox {
    /// A box from one interval per dimension.
    pub fn new(intervals: Vec<Interval>) -> Self {
        Self { intervals }
    }

    /// The box `[lower[i], upper[i]]` per dimension.
    ///
    /// # Panics
    ///
    /// Panics if the two slices differ in length or any pair is not an
    /// interval.
    pub fn from_bounds(lower: &[f64], upper: &[f64]) -> Self {
        assert_eq!(lower.len(), upper.len(), "bound slices differ in length");
        Self {
            intervals: lower
                .iter()
                .zip(upper)
                .map(|(&lo, &hi)| Interval::new(lo, hi))
                .collect(),
        }
    }

    /// The unit box `[0,1]^dimension`.
    pub fn unit(dimension: usize) -> Self {
        Self {
            intervals: vec![Interval::new(0.0, 1.0); dimension],
        }
    }

    /// The number of coordinate axes.
    pub fn dimension(&self) -> usize {
        self.intervals.len()
    }

    /// The interval on axis `i`.
    pub fn axis(&self, i: usize) -> &Interval {
        &self.intervals[i]
    }

    /// Mutable access to the interval on axis `i`.
    pub fn axis_mut(&mut self, i: usize) -> &mut Interval {
        &mut self.intervals[i]
    }

    /// The intervals of all axes in order.
    pub fn axes(&self) -> &[Interval] {
        &self.intervals
    }

    /// Per-axis widths, rounded upward.
    pub fn widths(&self) -> Vec<f64> {
        self.intervals.iter().map(Interval::width).collect()
    }

    /// The Lebesgue measure (product of widths), round-to-nearest.
    /// Exact for dyadic boxes.
    pub fn measure(&self) -> f64 {
        self.intervals.iter().map(|iv| iv.upper() - iv.lower()).product()
    }

    /// The componentwise hull of two boxes of equal dimension.
    pub fn hull(&self, other: &IntervalBox) -> IntervalBox {
        debug_assert_eq!(self.dimension(), other.dimension());
        IntervalBox {
            intervals: self
                .intervals
                .iter()
                .zip(&other.intervals)
                .map(|(a, b)| a.hull(b))
                .collect(),
        }
    }

    /// Whether the closed boxes share a point. Decided exactly.
    pub fn intersects(&self, other: &IntervalBox) -> bool {
        debug_assert_eq!(self.dimension(), other.dimension());
        self.intervals
            .iter()
            .zip(&other.intervals)
            .all(|(a, b)| a.intersects(b))
    }

    /// Whether the closed boxes are disjoint. The complement of
    /// [`overlaps`](Self::overlaps): definitely disjoint when strictly
    /// separated on some axis, definitely not when interiors meet,
    /// indeterminate on boundary contact.
    pub fn disjoint(&self, other: &IntervalBox) -> Tribool {
        !self.overlaps(other)
    }

    /// Whether the interiors of the two boxes intersect: the
    /// conjunction of per-axis interior intersection.
    pub fn overlaps(&self, other: &IntervalBox) -> Tribool {
        debug_assert_eq!(self.dimension(), other.dimension());
        self.intervals
            .iter()
            .zip(&other.intervals)
            .fold(Tribool::True, |acc, (a, b)| acc & a.interiors_intersect(b))
    }

    /// Whether `other` lies in the interior of `self`.
    pub fn covers(&self, other: &IntervalBox) -> Tribool {
        debug_assert_eq!(self.dimension(), other.dimension());
        self.intervals
            .iter()
            .zip(&other.intervals)
            .fold(Tribool::True, |acc, (a, b)| acc & a.interior_contains(b))
    }

    /// Whether `self` is a subset of the closed box `other`. Decided
    /// exactly since both boxes are exact floating-point sets.
    pub fn subset_of(&self, other: &IntervalBox) -> Tribool {
        debug_assert_eq!(self.dimension(), other.dimension());
        Tribool::from(
            self.intervals
                .iter()
                .zip(&other.intervals)
                .all(|(a, b)| a.subset_of(b)),
        )
    }
}

impl fmt::Display for IntervalBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, iv) in self.intervals.iter().enumerate() {
            if i > 0 {
                write!(f, "x")?;
            }
            write!(f, "{iv}")?;
        }
        Ok(())
    }
}
