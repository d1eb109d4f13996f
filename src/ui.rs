//! Terminal UI rendering with ratatui

use crate::board::Grid;
use crate::game::{GameState, Phase};
use crate::position::Position;
use crate::tetromino::TetrominoType;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const EMPTY: &str = "  ";
const BLOCK: &str = "██";

/// Board(22) + next/stats(16)
const GAME_WIDTH: u16 = 38;
/// Board(20) + 2 for borders
const GAME_HEIGHT: u16 = 22;

/// Render-only extras that are not part of the engine state
#[derive(Debug, Clone, Default)]
pub struct View {
    /// Difficulty label shown in the stats box
    pub difficulty: &'static str,
    /// Latest notice from the runtime, cleared by the caller
    pub notice: Option<String>,
}

fn piece_color(kind: TetrominoType) -> Color {
    match kind {
        TetrominoType::I => Color::Cyan,
        TetrominoType::O => Color::Yellow,
        TetrominoType::T => Color::Magenta,
        TetrominoType::S => Color::Green,
        TetrominoType::Z => Color::Red,
        TetrominoType::J => Color::Blue,
        TetrominoType::L => Color::LightRed,
    }
}

/// Render a full game frame from a snapshot
pub fn render_game(frame: &mut Frame, state: &GameState, view: &View) {
    let area = frame.area();
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(state.grid.width() as u16 * 2 + 2),
            Constraint::Length(16),
        ])
        .split(game_area);

    render_board(frame, main_layout[0], state);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(6)])
        .split(main_layout[1]);

    render_next(frame, right_layout[0], state.next.kind);
    render_stats(frame, right_layout[1], state, view);

    match state.phase() {
        Phase::Paused => render_overlay(frame, area, "PAUSED", "Press P to resume"),
        Phase::GameOver => render_overlay(frame, area, "GAME OVER", "R to retry, Q to quit"),
        Phase::Active => {}
    }
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the next piece box
fn render_next(frame: &mut Frame, area: Rect, kind: TetrominoType) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 1 || inner.width < 4 {
        return;
    }

    let shape = kind.shape(0);
    let min_y = shape.iter().map(|p| p.y).min().unwrap_or(0);
    let min_x = shape.iter().map(|p| p.x).min().unwrap_or(0);

    let lines: Vec<Line> = (0..2)
        .map(|row| {
            let spans: Vec<Span> = (0..4)
                .map(|col| {
                    if shape.contains(&Position::new(min_x + col, min_y + row)) {
                        Span::styled(BLOCK, Style::default().fg(piece_color(kind)))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

/// Render the game board
fn render_board(frame: &mut Frame, area: Rect, state: &GameState) {
    let block = Block::default()
        .title(" TETRS ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let falling = state.current.map(|piece| (piece.kind, piece.cells_at(state.position)));
    let lines = board_lines(&state.grid, falling);
    frame.render_widget(Paragraph::new(lines), inner);
}

fn board_lines(grid: &Grid, falling: Option<(TetrominoType, [Position; 4])>) -> Vec<Line<'static>> {
    let mut rows = grid.rows();
    if let Some((kind, cells)) = falling {
        for cell in cells.iter().filter(|c| grid.is_position_valid(**c)) {
            rows[cell.y as usize][cell.x as usize] = Some(kind);
        }
    }

    rows.into_iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .into_iter()
                .map(|cell| match cell {
                    Some(kind) => Span::styled(BLOCK, Style::default().fg(piece_color(kind))),
                    None => Span::raw(EMPTY),
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, state: &GameState, view: &View) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label =
        |text: &'static str| Line::from(Span::styled(text, Style::default().fg(Color::Gray)));
    let mut lines = vec![
        label("SCORE"),
        Line::from(Span::styled(
            format!("{}", state.score.points),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::raw(""),
        label("LEVEL"),
        Line::from(Span::styled(
            format!("{}", state.level()),
            Style::default().fg(Color::Cyan),
        )),
        Line::raw(""),
        label("LINES"),
        Line::from(Span::styled(
            format!("{}", state.score.lines),
            Style::default().fg(Color::Green),
        )),
        Line::raw(""),
        Line::from(Span::styled(view.difficulty, Style::default().fg(Color::Gray))),
    ];

    if let Some(notice) = &view.notice {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            notice.clone(),
            Style::default().fg(Color::Magenta).bold(),
        ));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_area = center_rect(area, 26, 5);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title.to_string(), Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle.to_string(), Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
