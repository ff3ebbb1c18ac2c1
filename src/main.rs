use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph};

use nrl25_terminal::config::AppConfig;
use nrl25_terminal::feed::{self, FixtureSource};
use nrl25_terminal::insight::provider_from_endpoint;
use nrl25_terminal::state::{self, AppState, ProviderCommand, apply_delta, round_label};
use nrl25_terminal::status::MatchState;
use nrl25_terminal::tick::{RefreshTicker, wall_clock};
use nrl25_terminal::timing::{DISPLAY_ZONE_LABEL, fmt_time};
use nrl25_terminal::view::{FixtureRow, build_rows};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    ticker: RefreshTicker,
    now: DateTime<FixedOffset>,
}

impl App {
    fn new(cfg: &AppConfig, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(cfg.policy, cfg.insight_limit),
            should_quit: false,
            cmd_tx,
            ticker: RefreshTicker::new(cfg.refresh),
            now: wall_clock(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search_active {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.state.search_active = false,
                KeyCode::Backspace => self.state.pop_query_char(),
                KeyCode::Char(c) => self.state.push_query_char(c),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') => self.state.search_active = true,
            KeyCode::Char('r') => self.state.cycle_round_next(),
            KeyCode::Char('R') => self.state.cycle_round_prev(),
            KeyCode::Char('c') => self.state.clear_filters(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('n') => self.ticker.force(),
            KeyCode::Char('f') => {
                // Reload waits behind the worker, so free it from the current batch first.
                self.state.cancel_insights();
                self.send(ProviderCommand::ReloadFixtures, "Fixture reload");
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn send(&mut self, cmd: ProviderCommand, what: &str) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log(format!("[INFO] {what} unavailable"));
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log(format!("[WARN] {what} request failed"));
        }
    }

    fn dispatch_insights(&mut self) {
        if let Some(batch) = self.state.take_insight_batch() {
            self.send(ProviderCommand::FetchInsights(batch), "Insight fetch");
        }
    }

    fn maybe_tick(&mut self) {
        if self.ticker.due(Instant::now()) {
            self.now = wall_clock();
        }
    }
}

fn main() -> Result<()> {
    let cfg = AppConfig::load().context("configuration")?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let mut app = App::new(&cfg, Some(cmd_tx));
    feed::spawn_provider(
        tx,
        cmd_rx,
        FixtureSource::from_path(cfg.fixtures_path.clone()),
        provider_from_endpoint(cfg.insight_endpoint.as_deref()),
        app.state.insight_cancel.clone(),
    );

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        app.dispatch_insights();
        app.maybe_tick();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    frame.render_widget(Paragraph::new(legend_line()), chunks[1]);

    let rows = build_rows(&app.state, app.now);
    render_fixture_list(frame, chunks[2], &app.state, &rows);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[3]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[4]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let search = if app.state.search_active {
        format!("Search: {}_", app.state.query)
    } else if app.state.query.is_empty() {
        "Search: -".to_string()
    } else {
        format!("Search: {}", app.state.query)
    };
    let line1 = format!(
        "2025 NRL FIXTURES | {} | {} | Window {}m",
        round_label(app.state.round),
        search,
        app.state.policy.total_minutes()
    );
    let line2 = format!(
        "{DISPLAY_ZONE_LABEL} | now {} | refresh {}s",
        fmt_time(&app.now),
        app.ticker.interval().as_secs()
    );
    format!("{line1}\n{line2}")
}

fn legend_line() -> Line<'static> {
    let mut spans = Vec::new();
    for state in [
        MatchState::Upcoming,
        MatchState::Live,
        MatchState::AwaitingFinal,
        MatchState::Final,
    ] {
        spans.push(Span::styled("● ", Style::default().fg(state_color(Some(state)))));
        spans.push(Span::raw(format!(
            "{}   ",
            nrl25_terminal::status::status_label(state)
        )));
    }
    Line::from(spans)
}

fn state_color(state: Option<MatchState>) -> Color {
    match state {
        Some(MatchState::Upcoming) => Color::Blue,
        Some(MatchState::Live) => Color::Green,
        Some(MatchState::AwaitingFinal) => Color::Yellow,
        Some(MatchState::Final) => Color::Gray,
        None => Color::Red,
    }
}

fn render_fixture_list(frame: &mut Frame, area: Rect, state: &AppState, rows: &[FixtureRow]) {
    if rows.is_empty() {
        let msg = if state.fixtures_loaded {
            "No fixtures match this filter"
        } else {
            "Loading fixtures…"
        };
        let empty = Paragraph::new(msg).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    const ROW_HEIGHT: u16 = 5;
    if area.height < ROW_HEIGHT {
        let empty = Paragraph::new("Fixture list needs more height")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let visible = (area.height / ROW_HEIGHT) as usize;
    let (start, end) = visible_range(state.selected, rows.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: area.x,
            y: area.y + (i as u16) * ROW_HEIGHT,
            width: area.width,
            height: ROW_HEIGHT,
        };
        render_fixture_row(frame, row_area, &rows[idx], idx == state.selected);
    }
}

fn render_fixture_row(frame: &mut Frame, area: Rect, row: &FixtureRow, selected: bool) {
    let base = if selected {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    } else {
        Style::default()
    };
    if selected {
        frame.render_widget(Block::default().style(base), area);
    }

    let lines = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(24)])
        .split(lines[0]);
    let title = Line::from(vec![
        Span::styled("● ", base.fg(state_color(row.state))),
        Span::styled(
            format!("{:<15}", row.label.to_uppercase()),
            base.add_modifier(Modifier::BOLD),
        ),
        Span::styled(row.title.clone(), base.add_modifier(Modifier::BOLD)),
    ]);
    frame.render_widget(Paragraph::new(title).style(base), top[0]);
    frame.render_widget(
        Paragraph::new(row.right.clone())
            .style(base)
            .alignment(Alignment::Right),
        top[1],
    );

    frame.render_widget(
        Paragraph::new(row.meta.clone()).style(base.fg(Color::DarkGray)),
        lines[1],
    );

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(state_color(row.state)).bg(Color::Black))
        .percent(u16::from(row.progress))
        .label(format!("{}%", row.progress));
    frame.render_widget(gauge, lines[2]);

    frame.render_widget(
        Paragraph::new(format!("» {}", row.insight)).style(base.fg(Color::Gray)),
        lines[3],
    );
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn footer_text(state: &AppState) -> String {
    if state.search_active {
        "Type to filter team/venue | Backspace delete | Enter/Esc done".to_string()
    } else {
        "/ Search | r/R Round | c Clear | j/k/↑/↓ Move | n Refresh | f Reload | ? Help | q Quit"
            .to_string()
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "NRL25 Terminal - Help",
        "",
        "  /            Search team or venue",
        "  r / R        Next / previous round",
        "  c            Clear filters",
        "  j/k or ↑/↓   Move",
        "  n            Refresh statuses now",
        "  f            Reload fixtures",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Estimated finish = kickoff + match window.",
        "Awaiting final: window elapsed, no official result yet.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
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

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
