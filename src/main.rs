use std::{
    fs::File,
    io::{self, stdout},
    path::PathBuf,
    sync::Mutex,
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color as TermColor, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tracing_subscriber::EnvFilter;

use lines::game::{
    CellState, Color, Direction, Game, GameEvent, Position, RandomSource, Rules,
    DEFAULT_BOARD_SIZE, DEFAULT_LINE_LENGTH, DEFAULT_SPAWN_COUNT,
};

// ============================================================================
// Command Line
// ============================================================================

/// Move balls into lines of one color before the board fills up.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Board width and height
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,

    /// Pieces needed in a row to clear a line
    #[arg(long, default_value_t = DEFAULT_LINE_LENGTH)]
    line_length: usize,

    /// Pieces added after a turn without a line
    #[arg(long, default_value_t = DEFAULT_SPAWN_COUNT)]
    spawn: usize,

    /// Seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Only count horizontal and vertical lines
    #[arg(long)]
    orthogonal_only: bool,

    /// Write logs to this file (filtered by RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn rules(&self) -> Rules {
        Rules {
            board_size: self.size,
            line_length: self.line_length,
            spawn_count: self.spawn,
            palette: Color::ALL.to_vec(),
            directions: if self.orthogonal_only {
                Direction::ORTHOGONAL.to_vec()
            } else {
                Direction::ALL.to_vec()
            },
        }
    }
}

fn init_logging(path: Option<&PathBuf>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 3;
const BALL_CHAR: &str = " ● ";
const EMPTY_CHAR: &str = " · ";
const PANEL_WIDTH: u16 = 22;

fn ball_color(color: Color) -> TermColor {
    match color {
        Color::Purple => TermColor::Magenta,
        Color::Red => TermColor::Red,
        Color::Blue => TermColor::LightBlue,
        Color::Navy => TermColor::Blue,
        Color::Yellow => TermColor::Yellow,
        Color::Green => TermColor::Green,
    }
}

// ============================================================================
// App State
// ============================================================================

struct App {
    game: Game,
    cursor: Position,
    status: String,
}

impl App {
    fn new(game: Game) -> Self {
        Self {
            game,
            cursor: Position::new(0, 0),
            status: String::from("Press N to start"),
        }
    }

    fn move_cursor(&mut self, dx: isize, dy: isize) {
        let size = self.game.board().size() as isize;
        let x = (self.cursor.x as isize + dx).clamp(0, size - 1);
        let y = (self.cursor.y as isize + dy).clamp(0, size - 1);
        self.cursor = Position::new(x as usize, y as usize);
    }

    /// Select the ball under the cursor, or send the selection there.
    fn act(&mut self) {
        if self.game.is_over() {
            return;
        }
        if self.game.board().is_free(self.cursor) {
            if self.game.selected().is_some() && !self.game.attempt_move(self.cursor) {
                self.status = String::from("No way through");
            }
        } else {
            self.game.select_piece(self.cursor);
        }
    }

    /// Turn the events of the last request into a status line.
    fn absorb_events(&mut self) {
        for event in self.game.take_events() {
            self.status = match event {
                GameEvent::GameStarted => String::from("New game"),
                GameEvent::GameReset => String::from("Game reset"),
                GameEvent::PieceSelected(_) => String::from("Ball selected"),
                GameEvent::PieceMoved { .. } => String::from("Moved"),
                GameEvent::LineCleared { color, length } => {
                    format!("Cleared {length} {color}")
                }
                GameEvent::PiecesSpawned(n) => format!("{n} new balls"),
                GameEvent::GameOver => String::from("Board full"),
            };
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, app: &App) {
    let area = frame.size();
    render_game(frame, app, area);

    if app.game.is_over() && app.game.board().filled_count() > 0 {
        render_game_over(frame, area);
    }
}

fn render_game(frame: &mut Frame, app: &App, area: Rect) {
    let size = app.game.board().size() as u16;
    let board_width = size * CELL_WIDTH + 2;
    let board_height = size + 2;
    let main_area = centered_rect(board_width + PANEL_WIDTH, board_height + 2, area);

    let vertical = Layout::vertical([
        Constraint::Length(board_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let horizontal = Layout::horizontal([
        Constraint::Length(board_width),
        Constraint::Length(PANEL_WIDTH),
    ])
    .split(vertical[0]);

    render_board(frame, app, horizontal[0]);
    render_info(frame, app, horizontal[1]);

    let controls_area = Rect {
        x: area.x,
        y: vertical[0].y + vertical[0].height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "Arrows/HJKL: Cursor | Space: Select/Move | Esc: Deselect | N: New | R: Reset | Q: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(TermColor::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_board(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Lines ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let board = app.game.board();
    let selected = app.game.selected();
    let preview = app.game.preview_path(app.cursor);

    let mut lines: Vec<Line> = Vec::new();

    for (y, row) in board.rows().iter().enumerate() {
        let mut spans: Vec<Span> = Vec::new();

        for (x, cell) in row.iter().enumerate() {
            let pos = Position::new(x, y);
            let (symbol, mut style) = match cell {
                CellState::Empty => (EMPTY_CHAR, Style::default().fg(TermColor::DarkGray)),
                CellState::Filled(color) => (BALL_CHAR, Style::default().fg(ball_color(*color))),
            };

            if selected == Some(pos) {
                style = style.add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK);
            }
            if preview.contains(&pos) || (selected == Some(pos) && !preview.is_empty()) {
                style = style.bg(TermColor::Rgb(40, 60, 40));
            }
            if app.cursor == pos {
                style = style.add_modifier(Modifier::REVERSED);
            }

            spans.push(Span::styled(symbol, style));
        }

        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rules = app.game.rules();
    let state = if app.game.is_over() { "Stopped" } else { "Playing" };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("State", Style::default().fg(TermColor::Yellow))),
        Line::from(state),
        Line::from(""),
        Line::from(Span::styled("Balls", Style::default().fg(TermColor::Cyan))),
        Line::from(format!(
            "{} / {}",
            app.game.board().filled_count(),
            rules.board_size * rules.board_size
        )),
        Line::from(""),
        Line::from(Span::styled("Line", Style::default().fg(TermColor::Green))),
        Line::from(format!("{} in a row", rules.line_length)),
        Line::from(""),
        Line::from(app.status.as_str()),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(TermColor::Red))),
        Line::from(""),
        Line::from("The board is full"),
        Line::from(""),
        Line::from(Span::styled(
            "N: new game | Q: quit",
            Style::default().fg(TermColor::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(TermColor::Black)),
    );

    let popup_area = centered_rect(26, 8, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => break,
            KeyCode::Char('n') | KeyCode::Char('N') => {
                app.game.start_game();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                app.game.reset_game();
            }
            KeyCode::Left | KeyCode::Char('h') => app.move_cursor(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => app.move_cursor(1, 0),
            KeyCode::Up | KeyCode::Char('k') => app.move_cursor(0, -1),
            KeyCode::Down | KeyCode::Char('j') => app.move_cursor(0, 1),
            KeyCode::Char(' ') | KeyCode::Enter => app.act(),
            KeyCode::Esc => app.game.clear_selection(),
            _ => {}
        }

        app.absorb_events();
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let source = match cli.seed {
        Some(seed) => RandomSource::seeded(seed),
        None => RandomSource::from_entropy(),
    };
    let game = Game::with_rules(cli.rules(), Box::new(source)).context("invalid game rules")?;
    let mut app = App::new(game);

    enable_raw_mode().context("cannot enable raw mode")?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}
