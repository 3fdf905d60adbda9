use super::AppCommand;
use crate::launcher::RemoteKey;
use crate::probe::StatusTone;
use crate::theme::ThemePalette;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders};
use std::sync::OnceLock;

static THEME: OnceLock<ThemePalette> = OnceLock::new();

pub(crate) fn install_theme(palette: ThemePalette) {
    let _ = THEME.set(palette);
}

fn active_theme() -> &'static ThemePalette {
    THEME.get_or_init(ThemePalette::default)
}

/// Maps keyboard input onto the remote-control buttons.
pub(crate) fn remote_key_for(key: KeyEvent) -> Option<RemoteKey> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }

    match key.code {
        KeyCode::Up => Some(RemoteKey::Up),
        KeyCode::Down => Some(RemoteKey::Down),
        KeyCode::Left => Some(RemoteKey::Left),
        KeyCode::Right => Some(RemoteKey::Right),
        KeyCode::Enter => Some(RemoteKey::Enter),
        KeyCode::Char(' ') => Some(RemoteKey::DpadCenter),
        KeyCode::Esc | KeyCode::Backspace => Some(RemoteKey::Back),
        KeyCode::Char('m' | 'M') | KeyCode::F(2) | KeyCode::Menu => Some(RemoteKey::Menu),
        _ => None,
    }
}

pub(crate) fn edit_text_field(
    target: &mut String,
    key: KeyEvent,
    accept: impl Fn(char) -> bool,
) -> Result<AppCommand> {
    match key.code {
        KeyCode::Backspace => {
            let _ = target.pop();
        }
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL)
                || key.modifiers.contains(KeyModifiers::ALT)
            {
                return Ok(AppCommand::None);
            }
            if !accept(c) {
                return Ok(AppCommand::None);
            }
            target.push(c);
        }
        _ => {}
    }

    Ok(AppCommand::None)
}

/// Splits `area` into a rows x cols grid of equal cells, row by row.
pub(crate) fn grid_cells(area: Rect, rows: usize, cols: usize) -> Vec<Rect> {
    let rows = rows.max(1);
    let cols = cols.max(1);
    let row_constraints = vec![Constraint::Ratio(1, rows as u32); rows];
    let col_constraints = vec![Constraint::Ratio(1, cols as u32); cols];

    let row_rects = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(area);

    let mut cells = Vec::with_capacity(rows * cols);
    for row in row_rects.iter() {
        let col_rects = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(col_constraints.clone())
            .split(*row);
        cells.extend(col_rects.iter().copied());
    }
    cells
}

pub(crate) fn color_text() -> Color {
    active_theme().text
}

pub(crate) fn color_muted() -> Color {
    active_theme().muted
}

pub(crate) fn color_border() -> Color {
    active_theme().border
}

pub(crate) fn color_border_active() -> Color {
    active_theme().border_active
}

pub(crate) fn color_accent() -> Color {
    active_theme().accent
}

pub(crate) fn color_button() -> Color {
    active_theme().button
}

pub(crate) fn color_button_focused() -> Color {
    active_theme().button_focused
}

pub(crate) fn color_success() -> Color {
    active_theme().success
}

pub(crate) fn color_warning() -> Color {
    active_theme().warning
}

pub(crate) fn color_error() -> Color {
    active_theme().error
}

pub(crate) fn tone_color(tone: StatusTone) -> Color {
    match tone {
        StatusTone::Pending => color_muted(),
        StatusTone::Success => color_success(),
        StatusTone::Warning => color_warning(),
    }
}

pub(crate) fn panel_block<'a>(glyph: &'a str, title: &'a str, focused: bool) -> Block<'a> {
    let border_color = if focused {
        color_border_active()
    } else {
        color_border()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Line::from(vec![
            Span::styled(
                format!(" {glyph} "),
                Style::default()
                    .fg(color_accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                title,
                Style::default()
                    .fg(color_text())
                    .add_modifier(Modifier::BOLD),
            ),
        ]))
}

pub(crate) fn button_block(focused: bool) -> Block<'static> {
    if focused {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .border_style(
                Style::default()
                    .fg(color_border_active())
                    .add_modifier(Modifier::BOLD),
            )
            .style(Style::default().bg(color_button_focused()))
    } else {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color_border()))
            .style(Style::default().bg(color_button()))
    }
}

pub(crate) fn action_hint_spans(hints: &[(&'static str, &'static str)]) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (idx, (key, label)) in hints.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  |  ", Style::default().fg(color_border())));
        }
        spans.push(Span::styled(
            format!("[{key}]"),
            Style::default()
                .fg(color_accent())
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {label}"),
            Style::default().fg(color_muted()),
        ));
    }
    spans
}

pub(crate) fn notice_style(notice: &str) -> Style {
    let lower = notice.to_ascii_lowercase();
    if lower.contains("fail") || lower.contains("error") || lower.contains("invalid") {
        Style::default().fg(color_error())
    } else if lower.contains("saved") || lower.contains("opened") {
        Style::default().fg(color_success())
    } else if lower.contains("press back") {
        Style::default().fg(color_warning())
    } else {
        Style::default().fg(color_muted())
    }
}
