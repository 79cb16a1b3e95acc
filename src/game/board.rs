use super::{CellState, Position};

/// Square grid of cells, stored row-major as `cells[y][x]`.
///
/// Coordinates are engine-internal and always in `0..size`; indexing outside
/// the board panics.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    size: usize,
    cells: Vec<Vec<CellState>>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![vec![CellState::Empty; size]; size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn reset(&mut self) {
        for row in &mut self.cells {
            row.fill(CellState::Empty);
        }
    }

    pub fn get(&self, pos: Position) -> CellState {
        self.cells[pos.y][pos.x]
    }

    pub fn set(&mut self, pos: Position, cell: CellState) {
        self.cells[pos.y][pos.x] = cell;
    }

    /// Empties a cell and returns what was there.
    pub fn take(&mut self, pos: Position) -> CellState {
        std::mem::replace(&mut self.cells[pos.y][pos.x], CellState::Empty)
    }

    pub fn is_free(&self, pos: Position) -> bool {
        self.get(pos) == CellState::Empty
    }

    pub fn contains(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }

    /// All empty cells, row by row from the top.
    pub fn free_cells(&self) -> Vec<Position> {
        let mut free = Vec::new();
        for (y, row) in self.cells.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if *cell == CellState::Empty {
                    free.push(Position::new(x, y));
                }
            }
        }
        free
    }

    pub fn filled_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| **cell != CellState::Empty)
            .count()
    }

    /// Orthogonal neighbours of `pos` that lie on the board.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        const STEPS: [(isize, isize); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];
        STEPS.into_iter().filter_map(move |(dx, dy)| {
            let x = pos.x as isize + dx;
            let y = pos.y as isize + dy;
            self.contains(x, y)
                .then(|| Position::new(x as usize, y as usize))
        })
    }

    pub fn rows(&self) -> &[Vec<CellState>] {
        &self.cells
    }
}
