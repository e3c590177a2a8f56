//! Rigorous scalar and box arithmetic.
//!
//! Everything upstream of the paving engine works on closed `f64`
//! intervals with outward rounding: results of inexact operations are
//! widened by one ulp in the unsafe direction, while exactly
//! representable results are left untouched. The latter matters: cell
//! corners on a unit grid are dyadic rationals, and widening them would
//! destroy exact measures and exact lattice comparisons.

mod boxes;
mod interval;

pub use boxes::IntervalBox;
pub use interval::Interval;
