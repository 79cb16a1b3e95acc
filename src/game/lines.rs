//! Line detection and clearing.

use super::{Board, CellState, Color, Direction, Position, Rules};

/// A run of same-colored pieces found on the board.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Line {
    pub cells: Vec<Position>,
    pub color: Color,
}

impl Line {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Returns the first run of at least `rules.line_length` pieces.
///
/// Directions are tried in `rules.directions` order. Within a direction, start
/// cells are scanned row by row, skipping starts from which a full-length run
/// would leave the board. Each run is extended forward from its start only,
/// so the reported line is the first one this scan reaches, not necessarily
/// the longest.
pub fn find_line(board: &Board, rules: &Rules) -> Option<Line> {
    let size = board.size();
    let min = rules.line_length;
    if min == 0 || min > size {
        return None;
    }

    for &direction in &rules.directions {
        let (dx, dy) = direction.delta();

        let x_end = if dx != 0 { size - min + 1 } else { size };
        let (y_start, y_end) = match dy {
            d if d > 0 => (0, size - min + 1),
            d if d < 0 => (min - 1, size),
            _ => (0, size),
        };

        for y in y_start..y_end {
            for x in 0..x_end {
                let start = Position::new(x, y);
                let CellState::Filled(color) = board.get(start) else {
                    continue;
                };
                let cells = walk(board, start, color, direction);
                if cells.len() >= min {
                    return Some(Line { cells, color });
                }
            }
        }
    }

    None
}

/// Collects `start` and every following cell of `color` along `direction`.
fn walk(board: &Board, start: Position, color: Color, direction: Direction) -> Vec<Position> {
    let (dx, dy) = direction.delta();
    let mut cells = vec![start];
    let mut x = start.x as isize;
    let mut y = start.y as isize;

    loop {
        x += dx;
        y += dy;
        if !board.contains(x, y) {
            break;
        }
        let next = Position::new(x as usize, y as usize);
        if board.get(next) != CellState::Filled(color) {
            break;
        }
        cells.push(next);
    }

    cells
}

pub fn clear_line(board: &mut Board, line: &Line) {
    for &pos in &line.cells {
        board.set(pos, CellState::Empty);
    }
}
