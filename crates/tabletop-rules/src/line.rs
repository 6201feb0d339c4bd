//! Line detection over a set of occupied cells.
//!
//! A line is a run of cells along one of four orientations: horizontal,
//! vertical, diagonal, anti-diagonal. Orientations are direction-agnostic,
//! so each one is walked in a single fixed direction, starting only from
//! the first cell of a run. That visits every maximal run exactly once,
//! which makes the verdict independent of the order the cells arrive in.

use std::collections::HashSet;

use tabletop_protocol::Coord;

/// Forward direction of each orientation.
const ORIENTATIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Returns `true` if `points` contains at least `min_length` contiguous,
/// collinear cells.
///
/// A `min_length` of 0 is always satisfied; 1 is satisfied by any cell.
///
/// ```rust
/// use tabletop_protocol::Coord;
/// use tabletop_rules::has_line;
///
/// let diagonal = [Coord::new(0, 2), Coord::new(1, 1), Coord::new(2, 0)];
/// assert!(has_line(diagonal, 3));
/// assert!(!has_line([Coord::new(0, 0), Coord::new(2, 2)], 2));
/// ```
pub fn has_line<I>(points: I, min_length: usize) -> bool
where
    I: IntoIterator<Item = Coord>,
{
    min_length == 0 || find_line(points, min_length).is_some()
}

/// Finds a run of at least `min_length` cells and returns its first
/// `min_length` cells in walking order.
///
/// When several runs qualify, which one is returned is unspecified.
pub fn find_line<I>(points: I, min_length: usize) -> Option<Vec<Coord>>
where
    I: IntoIterator<Item = Coord>,
{
    let cells: HashSet<Coord> = points.into_iter().collect();
    if min_length == 0 {
        return Some(Vec::new());
    }

    for &seed in &cells {
        for dir in ORIENTATIONS {
            // Not a run start: the walk from the real start covers it.
            if cells.contains(&seed.step(dir, -1)) {
                continue;
            }
            let run = walk(&cells, seed, dir, min_length);
            if run.len() >= min_length {
                return Some(run);
            }
        }
    }
    None
}

/// Extends from `seed` along `dir` while cells are occupied, stopping once
/// `limit` cells are collected.
fn walk(cells: &HashSet<Coord>, seed: Coord, dir: (i32, i32), limit: usize) -> Vec<Coord> {
    let mut run = vec![seed];
    let mut last = seed;
    while run.len() < limit {
        let next = last.step(dir, 1);
        if !cells.contains(&next) {
            break;
        }
        run.push(next);
        last = next;
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(i32, i32)]) -> Vec<Coord> {
        raw.iter().map(|&(x, y)| Coord::new(x, y)).collect()
    }

    #[test]
    fn test_empty_set_has_no_line() {
        assert!(!has_line(Vec::new(), 1));
        assert!(!has_line(Vec::new(), 3));
    }

    #[test]
    fn test_zero_length_is_always_satisfied() {
        assert!(has_line(Vec::new(), 0));
    }

    #[test]
    fn test_single_point_has_no_line_of_two() {
        assert!(!has_line(pts(&[(1, 1)]), 2));
        assert!(has_line(pts(&[(1, 1)]), 1));
    }

    #[test]
    fn test_finds_all_four_orientations() {
        assert!(has_line(pts(&[(0, 0), (1, 0), (2, 0)]), 3), "vertical");
        assert!(has_line(pts(&[(1, 0), (1, 1), (1, 2)]), 3), "horizontal");
        assert!(has_line(pts(&[(0, 0), (1, 1), (2, 2)]), 3), "diagonal");
        assert!(has_line(pts(&[(0, 2), (1, 1), (2, 0)]), 3), "anti-diagonal");
    }

    #[test]
    fn test_gap_breaks_the_line() {
        assert!(!has_line(pts(&[(0, 0), (0, 1), (0, 3), (0, 4)]), 3));
        assert!(has_line(pts(&[(0, 0), (0, 1), (0, 3), (0, 4)]), 2));
    }

    #[test]
    fn test_neighbour_in_other_direction_does_not_hide_line() {
        // (0,0) touches (1,1) diagonally but the winning run is vertical.
        let points = pts(&[(0, 0), (1, 1), (1, 0), (2, 0)]);
        assert!(has_line(points, 3));
    }

    #[test]
    fn test_bent_shape_is_not_a_line() {
        assert!(!has_line(pts(&[(0, 0), (0, 1), (1, 1)]), 3));
        assert!(!has_line(pts(&[(0, 0), (1, 1), (2, 1)]), 3));
    }

    #[test]
    fn test_negative_coordinates_are_plain_cells() {
        assert!(has_line(pts(&[(-1, -1), (0, 0), (1, 1)]), 3));
    }

    #[test]
    fn test_longer_runs_for_larger_boards() {
        let five = pts(&[(3, 0), (3, 1), (3, 2), (3, 3), (3, 4)]);
        assert!(has_line(five.clone(), 5));
        assert!(!has_line(five, 6));
    }

    #[test]
    fn test_find_line_returns_contiguous_cells() {
        let line = find_line(pts(&[(2, 0), (0, 2), (1, 1), (2, 2)]), 3).expect("line");
        assert_eq!(line.len(), 3);
        let mut sorted = line.clone();
        sorted.sort();
        assert_eq!(sorted, pts(&[(0, 2), (1, 1), (2, 0)]));
    }

    #[test]
    fn test_insertion_order_does_not_change_verdict() {
        let mut points = pts(&[(0, 0), (2, 1), (1, 1), (0, 1), (1, 2), (0, 2)]);
        let forward = has_line(points.clone(), 3);
        points.reverse();
        assert_eq!(forward, has_line(points, 3));
        assert!(forward);
    }
}
