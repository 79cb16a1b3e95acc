use derive_more::{Display, Error};
use tracing::{debug, info, instrument};

mod board;
mod lines;
mod path;
mod spawn;

pub use board::Board;
pub use lines::{clear_line, find_line, Line};
pub use path::find_path;
pub use spawn::{spawn_batch, RandomSource, SequenceSource, SpawnSource};

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_BOARD_SIZE: usize = 9;
pub const DEFAULT_LINE_LENGTH: usize = 5;
pub const DEFAULT_SPAWN_COUNT: usize = 3;

/// Largest board the rules accept.
pub const MAX_BOARD_SIZE: usize = 64;

/// Shortest line the detector accepts.
pub const MIN_LINE_LENGTH: usize = 2;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display)]
pub enum Color {
    #[display("purple")]
    Purple,
    #[display("red")]
    Red,
    #[display("blue")]
    Blue,
    #[display("navy")]
    Navy,
    #[display("yellow")]
    Yellow,
    #[display("green")]
    Green,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::Purple,
        Color::Red,
        Color::Blue,
        Color::Navy,
        Color::Yellow,
        Color::Green,
    ];
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellState {
    Empty,
    Filled(Color),
}

/// Axis along which a line is scanned, always stepping rightwards or straight down.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Horizontal,
    Vertical,
    DiagonalDown,
    DiagonalUp,
}

impl Direction {
    /// Canonical scan order.
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::DiagonalDown,
        Direction::DiagonalUp,
    ];

    pub const ORTHOGONAL: [Direction; 2] = [Direction::Horizontal, Direction::Vertical];

    /// Step as `(dx, dy)`, with `y` growing downwards.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Horizontal => (1, 0),
            Direction::Vertical => (0, 1),
            Direction::DiagonalDown => (1, 1),
            Direction::DiagonalUp => (1, -1),
        }
    }
}

/// Tunable game parameters.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Rules {
    pub board_size: usize,
    pub line_length: usize,
    pub spawn_count: usize,
    pub palette: Vec<Color>,
    /// Directions a line may run in, tried in this order.
    pub directions: Vec<Direction>,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            line_length: DEFAULT_LINE_LENGTH,
            spawn_count: DEFAULT_SPAWN_COUNT,
            palette: Color::ALL.to_vec(),
            directions: Direction::ALL.to_vec(),
        }
    }
}

impl Rules {
    /// Default rules with diagonal lines switched off.
    pub fn orthogonal() -> Self {
        Self {
            directions: Direction::ORTHOGONAL.to_vec(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if self.board_size == 0 {
            return Err(RulesError::EmptyBoard);
        }
        if self.board_size > MAX_BOARD_SIZE {
            return Err(RulesError::BoardTooLarge {
                size: self.board_size,
            });
        }
        if self.line_length < MIN_LINE_LENGTH {
            return Err(RulesError::LineTooShort {
                length: self.line_length,
            });
        }
        if self.line_length > self.board_size {
            return Err(RulesError::LineTooLong {
                length: self.line_length,
                board_size: self.board_size,
            });
        }
        if self.palette.is_empty() {
            return Err(RulesError::EmptyPalette);
        }
        if self.directions.is_empty() {
            return Err(RulesError::NoDirections);
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
pub enum RulesError {
    #[display("board size must be at least 1")]
    EmptyBoard,
    #[display("board size {size} is too large")]
    BoardTooLarge { size: usize },
    #[display("line length {length} is too short")]
    LineTooShort { length: usize },
    #[display("line length {length} does not fit on a {board_size}x{board_size} board")]
    LineTooLong { length: usize, board_size: usize },
    #[display("palette has no colors")]
    EmptyPalette,
    #[display("no line directions enabled")]
    NoDirections,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    GameStarted,
    GameReset,
    PieceSelected(Position),
    PieceMoved { from: Position, to: Position },
    LineCleared { color: Color, length: usize },
    PiecesSpawned(usize),
    GameOver,
}

// ============================================================================
// Game
// ============================================================================

/// Turn controller and owner of all game state.
///
/// The board, the selection and the game-over flag live here and nowhere
/// else; callers read them back after each request.
pub struct Game {
    board: Board,
    selected: Option<Position>,
    over: bool,
    rules: Rules,
    source: Box<dyn SpawnSource>,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new() -> Self {
        Self::with_source(Box::new(RandomSource::from_entropy()))
    }

    pub fn with_source(source: Box<dyn SpawnSource>) -> Self {
        Self::build(Board::new(DEFAULT_BOARD_SIZE), Rules::default(), source, true)
    }

    pub fn with_rules(rules: Rules, source: Box<dyn SpawnSource>) -> Result<Self, RulesError> {
        rules.validate()?;
        Ok(Self::build(Board::new(rules.board_size), rules, source, true))
    }

    /// A game already in progress on a prepared board.
    ///
    /// Panics if the rules are invalid or the board size disagrees with them.
    pub fn with_board(board: Board, rules: Rules, source: Box<dyn SpawnSource>) -> Self {
        if let Err(err) = rules.validate() {
            panic!("invalid rules: {err}");
        }
        assert_eq!(board.size(), rules.board_size, "board size mismatch");
        Self::build(board, rules, source, false)
    }

    fn build(board: Board, rules: Rules, source: Box<dyn SpawnSource>, over: bool) -> Self {
        Self {
            board,
            selected: None,
            over,
            rules,
            source,
            events: Vec::new(),
        }
    }

    /// Starts a fresh game. Only possible while no game is running.
    #[instrument(skip(self))]
    pub fn start_game(&mut self) -> bool {
        if !self.over {
            return false;
        }

        self.board.reset();
        self.selected = None;
        self.over = false;
        self.events.push(GameEvent::GameStarted);
        info!(size = self.rules.board_size, "game started");

        self.spawn();
        true
    }

    /// Abandons the running game and clears the board.
    #[instrument(skip(self))]
    pub fn reset_game(&mut self) -> bool {
        if self.over {
            return false;
        }

        self.board.reset();
        self.selected = None;
        self.over = true;
        self.events.push(GameEvent::GameReset);
        info!("game reset");
        true
    }

    /// Remembers `pos` as the piece to move. Occupancy is checked on move.
    ///
    /// Logs a `PieceSelected` event; see [`Game::take_events`].
    pub fn select_piece(&mut self, pos: Position) {
        self.selected = Some(pos);
        self.events.push(GameEvent::PieceSelected(pos));
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Moves the selected piece to `to` and resolves the turn.
    ///
    /// Returns `false` without touching any state when the game is over, the
    /// selection is missing or empty, or `to` is occupied or unreachable.
    #[instrument(skip(self), fields(from = ?self.selected))]
    pub fn attempt_move(&mut self, to: Position) -> bool {
        if self.over {
            debug!("move rejected: game over");
            return false;
        }
        let Some(from) = self.selected else {
            debug!("move rejected: nothing selected");
            return false;
        };
        if self.board.is_free(from) {
            debug!("move rejected: nothing to move");
            return false;
        }
        if !self.board.is_free(to) {
            debug!("move rejected: target occupied");
            return false;
        }
        if find_path(&self.board, from, to).is_empty() {
            debug!("move rejected: no path");
            return false;
        }

        let piece = self.board.take(from);
        self.board.set(to, piece);
        self.selected = None;
        self.events.push(GameEvent::PieceMoved { from, to });

        if self.clear_next_line() {
            return true;
        }
        self.spawn();
        self.clear_next_line();
        true
    }

    /// Route the selected piece would take to `to`; empty when unreachable.
    pub fn preview_path(&self, to: Position) -> Vec<Position> {
        match self.selected {
            Some(from) => find_path(&self.board, from, to),
            None => Vec::new(),
        }
    }

    fn clear_next_line(&mut self) -> bool {
        let Some(line) = find_line(&self.board, &self.rules) else {
            return false;
        };
        clear_line(&mut self.board, &line);
        info!(color = %line.color, length = line.len(), "line cleared");
        self.events.push(GameEvent::LineCleared {
            color: line.color,
            length: line.len(),
        });
        true
    }

    fn spawn(&mut self) {
        let before = self.board.filled_count();
        let placed = spawn_batch(
            &mut self.board,
            &self.rules.palette,
            self.source.as_mut(),
            self.rules.spawn_count,
        );
        let spawned = self.board.filled_count() - before;
        debug!(spawned, "pieces spawned");
        self.events.push(GameEvent::PiecesSpawned(spawned));

        if !placed {
            self.over = true;
            info!("board full, game over");
            self.events.push(GameEvent::GameOver);
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_snapshot(&self) -> Board {
        self.board.clone()
    }

    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Takes and clears all pending events.
    ///
    /// Every request appends to the log, so long-lived callers should drain
    /// it after each one.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;

    pub fn empty_board() -> Board {
        Board::new(DEFAULT_BOARD_SIZE)
    }

    pub fn place(board: &mut Board, color: Color, cells: &[(usize, usize)]) {
        for &(x, y) in cells {
            board.set(Position::new(x, y), CellState::Filled(color));
        }
    }

    /// Fills every cell except `gaps`, cycling colors so no line forms.
    pub fn fill_except(board: &mut Board, gaps: &[(usize, usize)]) {
        let size = board.size();
        for y in 0..size {
            for x in 0..size {
                if gaps.contains(&(x, y)) {
                    continue;
                }
                let color = Color::ALL[(x + 2 * y) % Color::ALL.len()];
                board.set(Position::new(x, y), CellState::Filled(color));
            }
        }
    }

    pub fn scripted(picks: Vec<usize>) -> Box<dyn SpawnSource> {
        Box::new(SequenceSource::new(picks))
    }
}
