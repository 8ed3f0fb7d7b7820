use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Padding, Paragraph, Wrap},
};

use crate::catalog::{DetailController, RequestStatus};
use crate::jikan::Anime;
use crate::jikan::models::NamedResource;

use super::widgets::{airing_color, titled_block};

pub fn render_details_view(
    frame: &mut Frame,
    area: Rect,
    detail: &DetailController,
    scroll: u16,
    accent: Color,
) {
    let title = match detail.id() {
        Some(id) => format!("Details #{}", id),
        None => "Details".to_string(),
    };

    match (detail.status(), detail.anime()) {
        (RequestStatus::Loading, _) => {
            render_centered(frame, area, "Loading...", &title, Color::DarkGray, accent)
        }
        (_, Some(anime)) => render_anime(frame, area, anime, &title, scroll, accent),
        (status, None) => {
            let message = not_found_message(status);
            render_centered(frame, area, message, &title, Color::Red, accent);
        }
    }
}

/// The error when there is one, otherwise a generic not-found line
fn not_found_message(status: &RequestStatus) -> &str {
    status.error().unwrap_or("Anime not found")
}

fn render_centered(
    frame: &mut Frame,
    area: Rect,
    message: &str,
    title: &str,
    color: Color,
    accent: Color,
) {
    let para = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(color))
        .block(titled_block(title, accent));
    frame.render_widget(para, area);
}

fn render_anime(
    frame: &mut Frame,
    area: Rect,
    anime: &Anime,
    title: &str,
    scroll: u16,
    accent: Color,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let state = anime.airing_state();
    let heading = Paragraph::new(vec![
        Line::styled(
            anime.title.as_str(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ),
        Line::from(vec![
            Span::styled(
                format!(" {} ", anime.status_label()),
                Style::default().bg(airing_color(state)).fg(Color::Black),
            ),
            Span::raw("   "),
            Span::styled(
                format!("★ {} / 10", anime.score_label()),
                Style::default().fg(Color::LightYellow),
            ),
        ]),
    ])
    .block(Block::default().padding(Padding::horizontal(1)));
    frame.render_widget(heading, chunks[0]);

    let body = Paragraph::new(body_lines(anime, accent))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(titled_block(title, accent));
    frame.render_widget(body, chunks[1]);
}

fn body_lines(anime: &Anime, accent: Color) -> Vec<Line<'_>> {
    let label = Style::default().add_modifier(Modifier::BOLD);
    let value = Style::default().fg(Color::Gray);

    let mut lines = vec![Line::raw(anime.synopsis_text()), Line::raw("")];

    let facts = [
        ("Aired", anime.aired_label()),
        ("Episodes", anime.episodes_label()),
        ("Duration", anime.duration_label().to_string()),
        ("Rank", anime.rank_label()),
        ("Members", anime.members_label()),
        ("Favorites", anime.favorites_label()),
    ];
    for (name, fact) in facts {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<10}", name), label),
            Span::styled(fact, value),
        ]));
    }

    for (heading, entries) in [
        ("Studios", &anime.studios),
        ("Producers", &anime.producers),
        ("Genres", &anime.genres),
        ("Themes", &anime.themes),
    ] {
        if let Some(line) = chip_line(heading, entries, accent) {
            lines.push(Line::raw(""));
            lines.push(line);
        }
    }

    if let Some(url) = anime.image_url() {
        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled("Poster    ", label),
            Span::styled(url, Style::default().fg(Color::Cyan)),
        ]));
    }

    if let Some(url) = anime.trailer_url() {
        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled("Trailer   ", label),
            Span::styled(url, Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED)),
        ]));
    }

    lines
}

/// A heading followed by bracketed names; `None` when there is nothing to list
fn chip_line<'a>(heading: &'a str, entries: &'a [NamedResource], accent: Color) -> Option<Line<'a>> {
    if entries.is_empty() {
        return None;
    }

    let mut spans = vec![Span::styled(
        format!("{:<10}", heading),
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    )];
    for entry in entries {
        spans.push(Span::styled(format!("[{}]", entry.name), Style::default().fg(Color::White)));
        spans.push(Span::raw(" "));
    }
    Some(Line::from(spans))
}
