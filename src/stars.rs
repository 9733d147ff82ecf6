use crate::{Cell, CellSet, Color, Solver};
use bevy_math::IVec2;
use fxhash::FxHashMap;
use std::collections::BTreeSet;

#[inline]
fn count_of(map: &FxHashMap<Color, u32>, color: Color) -> u32 {
    map.get(&color).copied().unwrap_or(0)
}

impl Solver<'_> {
    /// Choose stars and squares to eliminate so that the region's colour
    /// rules hold with *exactly* `remaining_errors` eliminations spent.
    ///
    /// `fixed` counts the items already committed to the region: satisfied
    /// triangles (orange) and the kept tetris pieces (yellow and blue).
    /// These participate in star pairing but can never be eliminated here.
    ///
    /// Every colour present among the region's squares, surviving stars and
    /// the fixed map is tried as the dominant square colour, in [Color]
    /// order; which satisfying assignment is found first is
    /// implementation-defined. Returns the eliminated cells, or `None` when
    /// no candidate colour lands exactly on the budget.
    pub(crate) fn solve_squares_and_stars(
        &self,
        area: &CellSet,
        fixed: &FxHashMap<Color, u32>,
        remaining_errors: u32,
    ) -> Option<CellSet> {
        let puzzle = self.puzzle;

        let mut area_cells: Vec<IVec2> = area.iter().copied().collect();
        area_cells.sort_unstable_by_key(|c| (c.x, c.y));

        let mut stars: FxHashMap<Color, u32> = FxHashMap::default();
        let mut squares: FxHashMap<Color, u32> = FxHashMap::default();
        let mut colors: BTreeSet<Color> = BTreeSet::new();

        for &cell in &area_cells {
            match puzzle.cell(cell) {
                Cell::Square { color } => {
                    *squares.entry(*color).or_insert(0) += 1;
                    colors.insert(*color);
                }
                // Stars eliminated upstream (colour overflow) are spent.
                Cell::Star { color } if !self.removed_pieces.contains(&cell) => {
                    *stars.entry(*color).or_insert(0) += 1;
                    colors.insert(*color);
                }
                _ => {}
            }
        }

        if stars.is_empty() && squares.is_empty() {
            return Some(CellSet::default());
        }

        for &color in fixed.keys() {
            colors.insert(color);
        }

        let mut removed_squares: FxHashMap<Color, u32> = FxHashMap::default();
        let mut removed_stars: FxHashMap<Color, u32> = FxHashMap::default();
        let mut valid = false;

        for &dominant in &colors {
            let mut errors = 0u32;
            removed_squares.clear();
            removed_stars.clear();

            // All squares not of the dominant colour must be eliminated.
            for &color in &colors {
                let n = count_of(&squares, color);
                if color != dominant && n > 0 {
                    removed_squares.insert(color, n);
                    errors += n;
                }
            }

            // More squares need removing than there are marks for.
            if errors > remaining_errors {
                continue;
            }

            for &star_color in &colors {
                // Companions of this colour: fixed items plus surviving
                // squares. A single star demands exactly one companion; a
                // pair of stars demands none.
                let alive = count_of(fixed, star_color)
                    + count_of(&squares, star_color)
                    - count_of(&removed_squares, star_color);

                match count_of(&stars, star_color) {
                    1 if alive != 1 => {
                        removed_stars.insert(star_color, 1);
                        errors += 1;
                    }
                    2 if alive != 0 => {
                        removed_stars.insert(star_color, 2);
                        errors += 2;
                    }
                    _ => {}
                }
            }

            if errors == remaining_errors {
                valid = true;
                break;
            }
        }

        if !valid {
            return None;
        }

        // Draw the eliminated items from the region's cells.
        let mut removed = CellSet::default();
        for &cell in &area_cells {
            match puzzle.cell(cell) {
                Cell::Square { color } => {
                    if let Some(n) = removed_squares.get_mut(color) {
                        if *n > 0 {
                            removed.insert(cell);
                            *n -= 1;
                        }
                    }
                }
                Cell::Star { color } if !self.removed_pieces.contains(&cell) => {
                    if let Some(n) = removed_stars.get_mut(color) {
                        if *n > 0 {
                            removed.insert(cell);
                            *n -= 1;
                        }
                    }
                }
                _ => {}
            }
        }

        Some(removed)
    }
}
