//! Move legality: shortest walk between two cells over empty cells.

use std::collections::VecDeque;

use super::{Board, Position};

/// Finds one shortest orthogonal route from `from` to `to` through empty cells.
///
/// `from` is the moving piece's own cell and is always the search origin,
/// whatever it holds. The returned route excludes `from` and ends at `to`.
/// An empty route means the move is impossible: `to` is occupied, equals
/// `from`, or is walled off.
pub fn find_path(board: &Board, from: Position, to: Position) -> Vec<Position> {
    if from == to || !board.is_free(to) {
        return Vec::new();
    }

    let size = board.size();
    let index = |p: Position| p.y * size + p.x;

    let mut came_from: Vec<Option<Position>> = vec![None; size * size];
    let mut visited = vec![false; size * size];
    let mut queue = VecDeque::new();

    visited[index(from)] = true;
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        if current == to {
            let mut path = vec![to];
            let mut step = to;
            while let Some(prev) = came_from[index(step)] {
                if prev == from {
                    break;
                }
                path.push(prev);
                step = prev;
            }
            path.reverse();
            return path;
        }

        for next in board.neighbors(current) {
            if !visited[index(next)] && board.is_free(next) {
                visited[index(next)] = true;
                came_from[index(next)] = Some(current);
                queue.push_back(next);
            }
        }
    }

    Vec::new()
}
