use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::catalog::{Category, RequestStatus, SearchController};
use crate::jikan::Anime;

use super::widgets::{airing_color, cursor_column, titled_block, truncate};

const SEARCH_PLACEHOLDER: &str = "Search for anime (e.g., Naruto, One Piece, Bleach...)";

pub fn render_browse_view(
    frame: &mut Frame,
    area: Rect,
    search: &SearchController,
    list_state: &mut ListState,
    editing: bool,
    accent: Color,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_heading(frame, chunks[0], accent);
    render_search_input(frame, chunks[1], &search.filters().query, editing, accent);
    render_category_bar(frame, chunks[2], search.filters().category, accent);

    match search.status() {
        RequestStatus::Loading => render_message(frame, chunks[3], "Loading...", Color::DarkGray, accent),
        RequestStatus::Error(message) => render_message(frame, chunks[3], message, Color::Red, accent),
        _ => render_results(frame, chunks[3], search.results(), list_state, accent),
    }

    if !search.status().is_loading() && !search.results().is_empty() {
        render_pager(frame, chunks[4], search);
    }
}

fn render_heading(frame: &mut Frame, area: Rect, accent: Color) {
    let lines = vec![
        Line::styled(
            " Discover Anime",
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            " Browse through the collection of anime series and movies",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_search_input(frame: &mut Frame, area: Rect, query: &str, editing: bool, accent: Color) {
    let title = if editing { " Search (typing) " } else { " Search " };

    let text = if query.is_empty() && !editing {
        Span::styled(SEARCH_PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(query, Style::default().fg(Color::White))
    };

    let border = if editing { accent } else { Color::DarkGray };
    let input = Paragraph::new(Line::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title)
            .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD)),
    );

    frame.render_widget(input, area);

    if editing {
        let cursor_x = cursor_column(area.x.saturating_add(1), query, area.right().saturating_sub(2));
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

fn render_category_bar(frame: &mut Frame, area: Rect, selected: Category, accent: Color) {
    let mut spans = vec![
        Span::raw(" "),
        Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(":Category "),
    ];

    for category in Category::ALL {
        let style = if category == selected {
            Style::default()
                .bg(accent)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", category.as_label()), style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, color: Color, accent: Color) {
    let para = Paragraph::new(message)
        .alignment(Alignment::Center)
        .block(titled_block("Results", accent))
        .style(Style::default().fg(color));
    frame.render_widget(para, area);
}

fn render_results(
    frame: &mut Frame,
    area: Rect,
    results: &[Anime],
    list_state: &mut ListState,
    accent: Color,
) {
    if results.is_empty() {
        let empty = Paragraph::new(vec![
            Line::styled("No anime found", Style::default().add_modifier(Modifier::BOLD)),
            Line::raw("Try adjusting your search or filters"),
        ])
        .alignment(Alignment::Center)
        .block(titled_block("Results", accent))
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let title_width = area.width.saturating_sub(60).max(12) as usize;

    let items: Vec<ListItem> = results
        .iter()
        .map(|anime| {
            let state = anime.airing_state();
            let genres = anime.genre_names().take(3).collect::<Vec<_>>().join(", ");

            let line = Line::from(vec![
                Span::styled(
                    format!("{:<width$}", truncate(&anime.title, title_width), width = title_width),
                    Style::default().fg(Color::White),
                ),
                Span::raw(" │ "),
                Span::styled(
                    format!("{:<8}", state.as_display()),
                    Style::default().fg(airing_color(state)),
                ),
                Span::raw(" │ "),
                Span::styled(
                    format!("★ {}", anime.short_score_label()),
                    Style::default().fg(Color::LightYellow),
                ),
                Span::raw(" │ "),
                Span::styled(format!("{:>4}", anime.year_label()), Style::default().fg(Color::Cyan)),
                Span::raw(" │ "),
                Span::styled(
                    format!("{:<12}", anime.episode_count_label()),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw(" │ "),
                Span::styled(genres, Style::default().fg(Color::DarkGray)),
            ]);

            ListItem::new(line)
        })
        .collect();

    let title = format!("Found {} results", results.len());
    let list = List::new(items)
        .block(titled_block(&title, accent))
        .highlight_style(
            Style::default()
                .bg(accent)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, list_state);
}

fn render_pager(frame: &mut Frame, area: Rect, search: &SearchController) {
    let page = search.page();
    let total = search.total_pages();

    let arrow = |enabled: bool, text: &'static str| {
        let style = if enabled {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(text, style)
    };

    let line = Line::from(vec![
        arrow(page > 1, "« ‹ "),
        Span::raw(format!("Page {} of {}", page, total)),
        arrow(page < total, " › »"),
    ]);

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
