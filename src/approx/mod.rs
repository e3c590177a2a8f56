//! Set oracles: the interfaces the approximation drivers consume.
//!
//! An abstract set is described to the engine only through three-valued
//! geometric queries against boxes. The trait hierarchy mirrors the
//! topological character of a set: overt sets can confirm overlap, open
//! sets can confirm coverage, closed sets can confirm disjointness,
//! compact sets are bounded and closed. The drivers branch on definite
//! answers only and split cells further on `Indeterminate`, so an
//! oracle that always answers `Indeterminate` is useless but never
//! wrong.

mod driver;

pub use driver::{
    inner_difference, inner_intersection, outer_approximation, outer_difference,
    outer_intersection, over_approximation,
};

use std::any::Any;

use crate::logic::Tribool;
use crate::numeric::IntervalBox;
use crate::paving::GridTreeSet;

/// A subset of n-dimensional Euclidean space with a known dimension.
///
/// Every oracle query pairs the set with a box; the dimension lets the
/// engine reject mismatched pairings at the operation entry instead of
/// deep inside a recursion.
pub trait EuclideanSet {
    /// The number of coordinate axes of the ambient space.
    fn dimension(&self) -> usize;
}

/// A set with a known bounding box.
pub trait BoundedSet: EuclideanSet {
    /// A box containing the set.
    fn bounding_box(&self) -> IntervalBox;
}

/// A set that can confirm it reaches into a box.
pub trait OvertSet: EuclideanSet {
    /// Whether the set intersects the interior of `bounds`.
    fn overlaps(&self, bounds: &IntervalBox) -> Tribool;
}

/// A set with verified interior: it can confirm that it contains a box
/// outright.
pub trait OpenSet: OvertSet {
    /// Whether `bounds` lies inside the set.
    fn covers(&self, bounds: &IntervalBox) -> Tribool;
}

/// A set that can confirm it stays away from a box.
pub trait ClosedSet: EuclideanSet {
    /// Whether the set and `bounds` are disjoint.
    fn disjoint(&self, bounds: &IntervalBox) -> Tribool;
}

/// A bounded closed set: the oracle the outer-approximation driver
/// requires.
///
/// The two provided methods are capability hooks. A compact set that
/// also has verified interior (a regular set) overrides
/// [`covers_hint`](Self::covers_hint) so the driver can enable whole
/// subtrees without descending to the finest cells. An oracle whose
/// `disjoint` test is expensive enough to be worth memoizing across the
/// driver's recursive bisection overrides the cache pair: the driver
/// obtains one cache per run from [`make_cache`](Self::make_cache) and
/// threads it through every query.
pub trait CompactSet: BoundedSet + ClosedSet {
    /// A definite answer when the set is known to contain `bounds`,
    /// `None` when no such information is available.
    fn covers_hint(&self, _bounds: &IntervalBox) -> Option<Tribool> {
        None
    }

    /// A fresh cache for one driver run.
    fn make_cache(&self) -> Box<dyn Any> {
        Box::new(())
    }

    /// `disjoint`, with access to the run's cache.
    fn disjoint_with_cache(&self, bounds: &IntervalBox, _cache: &mut dyn Any) -> Tribool {
        self.disjoint(bounds)
    }
}

/// A compact overt set: bounded, closed, and able to confirm overlap.
pub trait LocatedSet: CompactSet + OvertSet {}

/// A set that is both open and closed in the verified sense: it can
/// confirm coverage and disjointness.
pub trait RegularSet: OpenSet + ClosedSet {}

/// An arbitrary membership predicate over boxes, used by the
/// checker-driven restrict and remove operations.
pub trait SetChecker {
    /// Whether the property holds on `bounds`.
    fn check(&self, bounds: &IntervalBox) -> Tribool;
}

impl<F> SetChecker for F
where
    F: Fn(&IntervalBox) -> Tribool,
{
    fn check(&self, bounds: &IntervalBox) -> Tribool {
        self(bounds)
    }
}

// A box is itself a set with every verified property: bounded, with
// interior, overt and closed. This replaces wrapping boxes into a
// dedicated image-set type.

impl EuclideanSet for IntervalBox {
    fn dimension(&self) -> usize {
        IntervalBox::dimension(self)
    }
}

impl BoundedSet for IntervalBox {
    fn bounding_box(&self) -> IntervalBox {
        self.clone()
    }
}

impl OvertSet for IntervalBox {
    fn overlaps(&self, bounds: &IntervalBox) -> Tribool {
        IntervalBox::overlaps(self, bounds)
    }
}

impl OpenSet for IntervalBox {
    fn covers(&self, bounds: &IntervalBox) -> Tribool {
        IntervalBox::covers(self, bounds)
    }
}

impl ClosedSet for IntervalBox {
    fn disjoint(&self, bounds: &IntervalBox) -> Tribool {
        IntervalBox::disjoint(self, bounds)
    }
}

impl CompactSet for IntervalBox {
    fn covers_hint(&self, bounds: &IntervalBox) -> Option<Tribool> {
        Some(IntervalBox::covers(self, bounds))
    }
}

impl LocatedSet for IntervalBox {}
impl RegularSet for IntervalBox {}

// A paving is a located set: it can be fed back into the drivers, for
// example to re-approximate it on a different grid.

impl EuclideanSet for GridTreeSet {
    fn dimension(&self) -> usize {
        self.grid().dimension()
    }
}

impl BoundedSet for GridTreeSet {
    fn bounding_box(&self) -> IntervalBox {
        self.view()
            .bounding_box()
            .unwrap_or_else(|| self.root_cell().bounds())
    }
}

impl OvertSet for GridTreeSet {
    fn overlaps(&self, bounds: &IntervalBox) -> Tribool {
        self.view().overlaps(bounds)
    }
}

impl ClosedSet for GridTreeSet {
    fn disjoint(&self, bounds: &IntervalBox) -> Tribool {
        self.view().disjoint(bounds)
    }
}

impl CompactSet for GridTreeSet {
    fn covers_hint(&self, bounds: &IntervalBox) -> Option<Tribool> {
        Some(self.view().covers(bounds))
    }
}

impl LocatedSet for GridTreeSet {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxes_answer_all_oracle_queries() {
        let set = IntervalBox::from_bounds(&[0.0, 0.0], &[1.0, 1.0]);
        let inner = IntervalBox::from_bounds(&[0.25, 0.25], &[0.75, 0.75]);
        let outside = IntervalBox::from_bounds(&[2.0, 2.0], &[3.0, 3.0]);

        assert!(OpenSet::covers(&set, &inner).definitely());
        assert!(OvertSet::overlaps(&set, &inner).definitely());
        assert!(ClosedSet::disjoint(&set, &outside).definitely());
        assert_eq!(set.covers_hint(&inner), Some(Tribool::True));
    }

    #[test]
    fn closures_are_checkers() {
        let checker = |bounds: &IntervalBox| {
            Tribool::from(bounds.axis(0).upper() <= 0.5)
        };
        let small = IntervalBox::from_bounds(&[0.0], &[0.25]);
        let large = IntervalBox::from_bounds(&[0.0], &[1.0]);
        assert!(checker.check(&small).definitely());
        assert!(!checker.check(&large).possibly());
    }

    #[test]
    fn default_cache_is_inert() {
        let set = IntervalBox::from_bounds(&[0.0], &[1.0]);
        let mut cache = set.make_cache();
        let outside = IntervalBox::from_bounds(&[2.0], &[3.0]);
        assert!(set.disjoint_with_cache(&outside, cache.as_mut()).definitely());
    }
}
