//! Coordinate projection of pavings.
//!
//! Projecting a cell keeps exactly the word bits whose bisection axis
//! survives the projection, in order; the cell's height is unchanged
//! (primary cells project onto primary cells). Projecting a paving
//! projects every enabled cell and adjoins the results onto the
//! projected grid, where overlapping images merge.

use crate::cell::GridCell;
use crate::grid;
use crate::paving::GridTreeSet;
use crate::word::BinaryWord;
use crate::PavingError;

/// The image of `cell` on `projected_grid` under the axis selection
/// `indices`.
fn project_down_cell(cell: &GridCell, projected_grid: &grid::Grid, indices: &[usize]) -> GridCell {
    let dimension = cell.dimension();
    let word = cell.word();
    let mut projected_word = BinaryWord::new();
    for position in 0..word.len() {
        let axis = position % dimension;
        if indices.contains(&axis) {
            projected_word.push(word.bit(position));
        }
    }
    GridCell::new(projected_grid.clone(), cell.height(), projected_word)
}

/// The projection of a paving onto the coordinate axes selected by
/// `indices`.
///
/// # Errors
///
/// Returns [`PavingError::DimensionMismatch`] when an index is out of
/// range for the paving's grid.
pub fn project_down(set: &GridTreeSet, indices: &[usize]) -> Result<GridTreeSet, PavingError> {
    let dimension = set.dimension();
    if let Some(&bad) = indices.iter().find(|&&i| i >= dimension) {
        return Err(PavingError::DimensionMismatch {
            expected: dimension,
            actual: bad,
        });
    }

    let projected_grid = grid::project_down(set.grid(), indices);
    let mut result = GridTreeSet::new(projected_grid.clone());
    for cell in set.iter() {
        let projected = project_down_cell(&cell, &projected_grid, indices);
        result
            .adjoin(&projected)
            .expect("projected cells live on the projected grid");
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::numeric::IntervalBox;

    #[test]
    fn projecting_a_cell_keeps_the_selected_axis_bits() {
        let grid = Grid::unit(2);
        // word 0 1 1 0: axis-0 bits are 0,1; axis-1 bits are 1,0
        let cell = GridCell::new(grid, 0, [false, true, true, false].into());
        let projected_grid = Grid::unit(1);
        let image = project_down_cell(&cell, &projected_grid, &[1]);
        assert_eq!(image.word().to_string(), "10");
        assert_eq!(image.height(), 0);
    }

    #[test]
    fn projection_of_a_paving_merges_overlapping_images() {
        let grid = Grid::unit(2);
        let mut set = GridTreeSet::new(grid.clone());
        // two cells stacked along axis 1: same shadow on axis 0
        set.adjoin(&GridCell::new(grid.clone(), 0, [false, false].into()))
            .unwrap();
        set.adjoin(&GridCell::new(grid, 0, [false, true].into()))
            .unwrap();

        let shadow = project_down(&set, &[0]).unwrap();
        assert_eq!(shadow.len(), 1);
        let bounds = shadow.bounding_box().unwrap();
        assert_eq!(bounds.axis(0).lower(), 0.0);
        assert_eq!(bounds.axis(0).upper(), 0.5);
    }

    #[test]
    fn projection_covers_the_shadow_of_the_original() {
        let grid = Grid::unit(2);
        let bounds = IntervalBox::from_bounds(&[0.3, 0.1], &[0.6, 0.4]);
        let set = crate::approx::outer_approximation(&bounds, &grid, 2).unwrap();
        let shadow = project_down(&set, &[0]).unwrap();
        let shadow_bounds = IntervalBox::from_bounds(&[0.3], &[0.6]);
        assert!(shadow.view().covers(&shadow_bounds).definitely());
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let set = GridTreeSet::new(Grid::unit(2));
        assert!(matches!(
            project_down(&set, &[0, 2]),
            Err(PavingError::DimensionMismatch { .. })
        ));
    }
}
