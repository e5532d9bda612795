//! The navigation shell: a fixed header with the three route links and a
//! footer for notices and key hints. Every view renders between the two.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::helpers::truncate;
use super::router::Route;

pub(crate) const HEADER_HEIGHT: u16 = 3;
pub(crate) const FOOTER_HEIGHT: u16 = 4;

/// Links shown in the header, with the digit that follows each.
const LINKS: [(char, &str, Route); 3] = [
    ('1', "Song List", Route::SongList),
    ('2', "Add Song", Route::CreateSong),
    ('3', "Song Dashboard/Stats", Route::Statistics),
];

/// Route a header shortcut digit points at.
pub(crate) fn link_target(key: char) -> Option<Route> {
    LINKS
        .iter()
        .find(|(digit, _, _)| *digit == key)
        .map(|(_, _, route)| route.clone())
}

/// Split the frame into header, content and footer areas.
pub(crate) fn split(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

pub(crate) fn draw_header(frame: &mut Frame, area: Rect, path: &str, active: Option<&Route>) {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::styled(
            "Song Manager",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
    ];
    for (digit, label, route) in LINKS.iter() {
        let is_active = match (active, route) {
            (Some(Route::EditSong(_)), Route::CreateSong) => true,
            (Some(current), route) => current == route,
            (None, _) => false,
        };
        let label_style = if is_active {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!("[{digit}]"), key_style));
        spans.push(Span::styled(format!(" {label}   "), label_style));
    }

    let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let room = (area.width as usize).saturating_sub(used + 2);
    spans.push(Span::styled(
        truncate(path, room),
        Style::default().fg(Color::DarkGray),
    ));

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

pub(crate) fn draw_footer(
    frame: &mut Frame,
    area: Rect,
    notice: Line<'static>,
    instructions: Line<'static>,
    api_label: &str,
) {
    let block = Block::default().borders(Borders::TOP);
    frame.render_widget(block.clone(), area);
    let inner = block.inner(area);

    let origin = Line::from(Span::styled(
        format!("API: {api_label}"),
        Style::default().fg(Color::DarkGray),
    ));

    let paragraph = Paragraph::new(vec![notice, instructions, origin]).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}
