use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, ListState, Paragraph},
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::catalog::query::QuerySettings;
use crate::catalog::{
    CatalogMessage, DetailController, Effect, History, Location, Route, SearchController,
};
use crate::config::Config;
use crate::error::Result;
use crate::jikan::CatalogApi;
use crate::ui::{render_browse_view, render_details_view, widgets};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Keystrokes edit the search query
    Search,
    /// Keystrokes edit a location to navigate to
    Location,
}

pub struct App {
    pub running: bool,
    pub accent: Color,

    pub history: History,
    pub route: Route,
    pub search: SearchController,
    pub detail: DetailController,

    pub mode: InputMode,
    pub results_state: ListState,
    pub detail_scroll: u16,
    pub location_input: String,
    pub show_help: bool,
    /// One-line message shown in place of the help bar until the next key
    pub notice: Option<String>,

    pub msg_rx: mpsc::UnboundedReceiver<CatalogMessage>,
}

impl App {
    pub fn new(config: Config, api: Arc<dyn CatalogApi>, start: Location) -> Self {
        let accent = widgets::parse_accent_color(&config.ui.accent_color);
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();

        let settings = QuerySettings {
            limit: config.api.page_limit,
            sfw: config.api.sfw,
        };
        let search = SearchController::new(
            Arc::clone(&api),
            msg_tx.clone(),
            settings,
            config.api.debounce(),
        );
        let detail = DetailController::new(api, msg_tx, config.api.debounce());

        let route = start.route();
        let mut app = Self {
            running: true,
            accent,
            history: History::new(start),
            route,
            search,
            detail,
            mode: InputMode::Normal,
            results_state: ListState::default(),
            detail_scroll: 0,
            location_input: String::new(),
            show_help: false,
            notice: None,
            msg_rx,
        };
        app.enter_current_location(None);
        app
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
            self.process_messages();
        }

        self.search.teardown();
        self.detail.teardown();
        Ok(())
    }

    pub fn process_messages(&mut self) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                CatalogMessage::SearchFinished {
                    generation,
                    outcome,
                } => {
                    let effects = self.search.apply(generation, outcome);
                    self.apply_effects(effects);
                    self.clamp_selection();
                }
                CatalogMessage::DetailFinished {
                    generation,
                    outcome,
                } => {
                    self.detail.apply(generation, outcome);
                }
            }
        }
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ReplaceLocation(location) => {
                    debug!(location = %location, "Replacing location");
                    self.history.replace(location);
                }
                Effect::ScrollToTop => {
                    *self.results_state.offset_mut() = 0;
                    self.results_state.select(Some(0));
                }
            }
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.search.results().len();
        match self.results_state.selected() {
            _ if len == 0 => self.results_state.select(None),
            Some(i) if i >= len => self.results_state.select(Some(len - 1)),
            None => self.results_state.select(Some(0)),
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    fn push_location(&mut self, location: Location) {
        let previous = self.route.clone();
        self.history.push(location);
        self.enter_current_location(Some(previous));
    }

    fn go_back(&mut self) {
        let previous = self.route.clone();
        if self.history.back() {
            self.enter_current_location(Some(previous));
        }
    }

    fn go_forward(&mut self) {
        let previous = self.route.clone();
        if self.history.forward() {
            self.enter_current_location(Some(previous));
        }
    }

    /// Mount whatever the current history entry points at. Staying on the
    /// browse page hands the new query to the search controller; arriving
    /// there from elsewhere mounts it fresh.
    fn enter_current_location(&mut self, previous: Option<Route>) {
        let location = self.history.current();
        let route = location.route();
        info!(path = %location.path(), query = %location.query(), "Navigated");

        match &route {
            Route::Browse { query } => {
                self.detail.teardown();
                if matches!(previous, Some(Route::Browse { .. })) {
                    self.search.on_url_changed(query);
                } else {
                    self.search.initialize(query);
                    self.results_state = ListState::default();
                }
            }
            Route::Details { id } => {
                self.search.teardown();
                self.mode = InputMode::Normal;
                self.detail_scroll = 0;
                self.detail.load(id);
            }
            Route::NotFound { path } => {
                warn!(path = %path, "No page at this location");
                self.search.teardown();
                self.detail.teardown();
            }
        }

        self.route = route;
    }

    fn open_selected(&mut self) {
        let Some(anime) = self
            .results_state
            .selected()
            .and_then(|i| self.search.results().get(i))
        else {
            return;
        };

        let location = Location::details(anime.mal_id);
        self.push_location(location);
    }

    fn reload(&mut self) {
        match self.route.clone() {
            Route::Browse { .. } => {
                let query = self.history.current().query().to_string();
                self.search.initialize(&query);
            }
            Route::Details { id } => self.detail.load(&id),
            Route::NotFound { .. } => {}
        }
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return;
        }

        self.notice = None;

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }

        match self.mode {
            InputMode::Search => self.handle_search_input(key),
            InputMode::Location => self.handle_location_input(key),
            InputMode::Normal => match self.route {
                Route::Browse { .. } => self.handle_browse_input(key),
                Route::Details { .. } => self.handle_details_input(key.code),
                Route::NotFound { .. } => self.handle_global_input(key.code),
            },
        }
    }

    /// Keys that work on every page
    fn handle_global_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('o') | KeyCode::Char(':') => {
                self.location_input = self.history.current().to_string();
                self.mode = InputMode::Location;
            }
            KeyCode::Char('b') | KeyCode::Backspace | KeyCode::Esc => self.go_back(),
            KeyCode::Char('f') => self.go_forward(),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
    }

    fn handle_browse_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('/') | KeyCode::Char('i') => {
                self.mode = InputMode::Search;
            }
            KeyCode::Tab => self.cycle_category(true),
            KeyCode::BackTab => self.cycle_category(false),
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Enter | KeyCode::Char('l') => self.open_selected(),
            KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
                let effects = self.search.next_page();
                self.apply_effects(effects);
            }
            KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
                let effects = self.search.previous_page();
                self.apply_effects(effects);
            }
            KeyCode::Char('g') | KeyCode::Home => {
                let effects = self.search.first_page();
                self.apply_effects(effects);
            }
            KeyCode::Char('G') | KeyCode::End => {
                let effects = self.search.last_page();
                self.apply_effects(effects);
            }
            // nothing to go back to from the catalog root but the root itself
            KeyCode::Esc => {}
            other => self.handle_global_input(other),
        }
    }

    fn handle_search_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.mode = InputMode::Normal,
            KeyCode::Down => {
                self.mode = InputMode::Normal;
                self.move_selection(1);
            }
            KeyCode::Tab => self.cycle_category(true),
            KeyCode::BackTab => self.cycle_category(false),
            KeyCode::Backspace => {
                let mut query = self.search.filters().query.clone();
                if query.pop().is_some() {
                    self.change_query(query);
                }
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let mut query = self.search.filters().query.clone();
                query.push(c);
                self.change_query(query);
            }
            _ => {}
        }
    }

    fn handle_details_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('j') | KeyCode::Down => {
                self.detail_scroll = self.detail_scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.detail_scroll = self.detail_scroll.saturating_sub(1);
            }
            KeyCode::Char('h') | KeyCode::Left => self.go_back(),
            other => self.handle_global_input(other),
        }
    }

    fn handle_location_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.location_input.clear();
            }
            KeyCode::Enter => {
                self.mode = InputMode::Normal;
                let raw = std::mem::take(&mut self.location_input);
                match Location::parse(&raw) {
                    Ok(location) if &location == self.history.current() => {}
                    Ok(location) => self.push_location(location),
                    Err(e) => {
                        warn!(input = %raw, "Rejected location");
                        self.notice = Some(e.to_string());
                    }
                }
            }
            KeyCode::Backspace => {
                self.location_input.pop();
            }
            KeyCode::Char(c) => self.location_input.push(c),
            _ => {}
        }
    }

    fn change_query(&mut self, query: String) {
        let filters = self.search.filters().with_query(query);
        let effects = self.search.on_filters_changed(filters);
        self.apply_effects(effects);
    }

    fn cycle_category(&mut self, forward: bool) {
        let current = self.search.filters().category;
        let category = if forward {
            current.next()
        } else {
            current.previous()
        };
        let filters = self.search.filters().with_category(category);
        let effects = self.search.on_filters_changed(filters);
        self.apply_effects(effects);
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.search.results().len();
        if len == 0 {
            return;
        }
        let current = self.results_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len as isize) as usize;
        self.results_state.select(Some(next));
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0]);

        match &self.route {
            Route::Browse { .. } => render_browse_view(
                frame,
                chunks[1],
                &self.search,
                &mut self.results_state,
                self.mode == InputMode::Search,
                self.accent,
            ),
            Route::Details { .. } => render_details_view(
                frame,
                chunks[1],
                &self.detail,
                self.detail_scroll,
                self.accent,
            ),
            Route::NotFound { path } => {
                let para = Paragraph::new(format!("Nothing here: {}", path))
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::DarkGray))
                    .block(widgets::titled_block("Not Found", self.accent));
                frame.render_widget(para, chunks[1]);
            }
        }

        self.render_footer(frame, chunks[2]);

        if self.show_help {
            self.render_help(frame);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let location = self.history.current().to_string();
        let line = Line::from(vec![
            Span::styled(
                " anidex ",
                Style::default()
                    .fg(self.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "Your personal anime catalog",
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  │  "),
            Span::styled(location, Style::default().fg(Color::Cyan)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        if self.mode == InputMode::Location {
            let line = Line::from(vec![
                Span::styled("Go to: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(self.location_input.as_str()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            let cursor_x = widgets::cursor_column(
                area.x.saturating_add(7),
                &self.location_input,
                area.right().saturating_sub(1),
            );
            frame.set_cursor_position((cursor_x, area.y));
            return;
        }

        if let Some(notice) = &self.notice {
            let para = Paragraph::new(notice.as_str()).style(Style::default().fg(Color::Red));
            frame.render_widget(para, area);
            return;
        }

        let hints: &[(&str, &str)] = match (&self.route, self.mode) {
            (Route::Browse { .. }, InputMode::Search) => {
                &[("type", "search"), ("Tab", "category"), ("Esc", "done")]
            }
            (Route::Browse { .. }, _) => &[
                ("/", "search"),
                ("Enter", "open"),
                ("n/p", "page"),
                ("?", "help"),
                ("q", "quit"),
            ],
            (Route::Details { .. }, _) => &[("j/k", "scroll"), ("Esc", "back"), ("?", "help")],
            (Route::NotFound { .. }, _) => &[("Esc", "back"), ("o", "go to"), ("q", "quit")],
        };
        frame.render_widget(widgets::help_bar(hints), area);
    }

    fn render_help(&self, frame: &mut Frame) {
        let area = centered_rect(60, 70, frame.area());
        let key_style = Style::default().add_modifier(Modifier::BOLD);

        let rows = [
            ("/ or i", "Edit search query"),
            ("Tab / S-Tab", "Next / previous category"),
            ("j / k", "Move selection or scroll"),
            ("Enter", "Open selected title"),
            ("n / p", "Next / previous page"),
            ("g / G", "First / last page"),
            ("b / Esc", "Back"),
            ("f", "Forward"),
            ("o or :", "Go to a location"),
            ("r", "Reload"),
            ("q", "Quit"),
        ];
        let lines: Vec<Line> = rows
            .iter()
            .map(|(key, action)| {
                Line::from(vec![
                    Span::styled(format!("{:<14}", key), key_style),
                    Span::raw(*action),
                ])
            })
            .collect();

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(lines).block(widgets::titled_block("Help", self.accent)),
            area,
        );
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

pub fn init_terminal() -> io::Result<DefaultTerminal> {
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    Ok(ratatui::init())
}

pub fn restore_terminal() -> io::Result<()> {
    ratatui::restore();
    Ok(())
}
