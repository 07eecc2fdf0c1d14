use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph},
};

use crate::view::{TrackListView, TrackRow};

const HELP: &str = " ↑/↓ select · Enter play/pause · Esc quit ";

/// Everything the terminal front-end draws in one frame.
pub struct Screen<'a> {
    pub query: &'a str,
    pub list: &'a TrackListView,
    pub cursor: usize,
    pub status: &'a str,
}

pub fn render(frame: &mut Frame, screen: &Screen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search input
            Constraint::Min(0),    // Results
            Constraint::Length(3), // Now playing
        ])
        .split(frame.area());

    render_search_bar(frame, chunks[0], screen.query);
    render_results(frame, chunks[1], screen.list, screen.cursor);
    render_status(frame, chunks[2], screen.status);
}

fn render_search_bar(frame: &mut Frame, area: Rect, query: &str) {
    let (text, style) = if query.is_empty() {
        ("Search for songs or artists", Style::default().fg(Color::DarkGray))
    } else {
        (query, Style::default().fg(Color::Green))
    };

    let search = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search ")
            .padding(Padding::horizontal(1))
            .border_style(Style::default().fg(Color::Green)),
    );
    frame.render_widget(search, area);
}

fn render_results(frame: &mut Frame, area: Rect, list: &TrackListView, cursor: usize) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Music App ")
        .title_bottom(HELP);

    match list {
        TrackListView::Loading => {
            let loading = Paragraph::new("Loading...")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(loading, area);
        }
        TrackListView::Error(message) | TrackListView::Empty(message) => {
            let color = if matches!(list, TrackListView::Error(_)) {
                Color::Red
            } else {
                Color::Gray
            };
            let notice = Paragraph::new(message.as_str())
                .style(Style::default().fg(color))
                .block(block);
            frame.render_widget(notice, area);
        }
        TrackListView::Rows(rows) => {
            let items: Vec<ListItem> = rows.iter().map(row_item).collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

            let mut state = ListState::default();
            state.select(Some(cursor.min(rows.len().saturating_sub(1))));

            frame.render_stateful_widget(list, area, &mut state);
        }
    }
}

fn row_item(row: &TrackRow) -> ListItem<'static> {
    let title_style = if row.playing {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    ListItem::new(Line::from(vec![
        Span::raw(format!("{} ", row.control())),
        Span::styled(row.title.clone(), title_style),
        Span::styled(format!(" — {}", row.artist), Style::default().fg(Color::Cyan)),
    ]))
}

fn render_status(frame: &mut Frame, area: Rect, status: &str) {
    let status = Paragraph::new(status)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Now Playing "));
    frame.render_widget(status, area);
}
