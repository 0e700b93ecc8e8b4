//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for choosing a station and a window
//! length, then renders the daily rainfall with the selected periods
//! highlighted, plus a small table of the period details.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::{self, AnalysisOutput, LoadedData};
use crate::domain::{RunConfig, Station};
use crate::error::AppError;

mod chart;

use chart::RainfallChart;

/// Start the TUI.
///
/// Input files are read before the terminal enters raw mode so that load
/// errors print like any other CLI error.
pub fn run(config: RunConfig) -> Result<(), AppError> {
    let loaded = pipeline::load_inputs(&config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::internal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, loaded)?;
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::internal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::internal(format!(
                "Failed to enter alternate screen: {e}"
            )));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: RunConfig,
    loaded: LoadedData,
    stations: Vec<Station>,
    selected_station: usize,
    window_length: usize,
    window_input: String,
    editing_window: bool,
    selected_field: usize,
    status: String,
    run: Option<AnalysisOutput>,
}

impl App {
    fn new(config: RunConfig, loaded: LoadedData) -> Result<Self, AppError> {
        let stations = loaded.observed_stations().stations().to_vec();
        if stations.is_empty() {
            return Err(AppError::no_data("No stations available in the dataset."));
        }

        let selected_station = config
            .station_id
            .as_ref()
            .and_then(|id| stations.iter().position(|s| &s.id == id))
            .unwrap_or(0);
        let window_length = config.window_length.unwrap_or(5);

        let mut app = Self {
            config,
            loaded,
            stations,
            selected_station,
            window_length,
            window_input: String::new(),
            editing_window: false,
            selected_field: 0,
            status: String::new(),
            run: None,
        };
        app.refresh()?;
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::internal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::internal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::internal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        if self.editing_window {
            return self.handle_window_edit(code);
        }

        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < 1 {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1)?,
            KeyCode::Right => self.adjust_field(1)?,
            KeyCode::Enter => {
                if self.selected_field == 1 {
                    self.editing_window = true;
                    self.window_input = self.window_length.to_string();
                    self.status =
                        "Editing window (days). Enter to apply, Esc to cancel.".to_string();
                }
            }
            KeyCode::Char('r') => {
                self.refresh()?;
                self.status = "Recomputed.".to_string();
            }
            KeyCode::Char('d') => {
                if let Some(run) = &self.run {
                    match crate::debug::write_debug_bundle(run) {
                        Ok(path) => {
                            self.status = format!("Wrote debug bundle: {}", path.display());
                        }
                        Err(err) => {
                            self.status = format!("Debug write failed: {err}");
                        }
                    }
                } else {
                    self.status = "No analysis available.".to_string();
                }
            }
            _ => {}
        }

        Ok(false)
    }

    fn handle_window_edit(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Esc => {
                self.editing_window = false;
                self.status = "Window edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_window = false;
                self.apply_window_input()?;
            }
            KeyCode::Backspace => {
                self.window_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() {
                    self.window_input.push(c);
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn adjust_field(&mut self, delta: i32) -> Result<(), AppError> {
        match self.selected_field {
            0 => {
                let n = self.stations.len();
                self.selected_station = if delta >= 0 {
                    (self.selected_station + 1) % n
                } else {
                    (self.selected_station + n - 1) % n
                };
                self.refresh()?;
                self.status = format!("station: {}", self.current_station().display_label());
            }
            1 => {
                let next = if delta >= 0 {
                    self.window_length.saturating_add(1)
                } else {
                    self.window_length.saturating_sub(1)
                };
                self.window_length = next.max(1);
                self.refresh()?;
                self.status = format!("window: {} day(s)", self.window_length);
            }
            _ => {}
        }
        Ok(())
    }

    fn apply_window_input(&mut self) -> Result<(), AppError> {
        let trimmed = self.window_input.trim();
        match trimmed.parse::<usize>() {
            Ok(days) if days > 0 => {
                self.window_length = days;
                self.refresh()?;
                self.status = format!("window: {days} day(s)");
            }
            _ => {
                self.status = format!("Invalid window '{trimmed}': need a positive day count.");
            }
        }
        Ok(())
    }

    fn current_station(&self) -> &Station {
        &self.stations[self.selected_station]
    }

    fn refresh(&mut self) -> Result<(), AppError> {
        let station_id = self.current_station().id.clone();
        let run = pipeline::run_analysis(
            &self.loaded,
            &station_id,
            self.window_length,
            self.config.max_periods,
        )?;
        self.run = Some(run);
        Ok(())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("pluvio", Style::default().fg(Color::Cyan)),
            Span::raw(" — rainiest periods per station"),
        ]));

        let (n_obs, n_periods, top) = match &self.run {
            Some(run) => (
                run.series.len(),
                run.periods.len(),
                run.periods
                    .periods
                    .first()
                    .map(|p| format!("{:.1} mm", p.cumulative_mm))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            None => (0, 0, "-".to_string()),
        };

        lines.push(Line::from(Span::styled(
            format!(
                "station: {} | window: {}d | n={n_obs} | periods: {n_periods} | top: {top}",
                self.current_station().display_label(),
                self.window_length,
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(10)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings_and_periods(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Daily rainfall").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let Some(series) = chart_series(run) else {
            let msg = Paragraph::new("No observations for this station.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let widget = RainfallChart {
            rainfall: &series.rainfall,
            periods: &series.periods,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_origin: series.x_origin,
            y_label: "mm",
        };
        frame.render_widget(widget, inner);
    }

    fn draw_settings_and_periods(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(44), Constraint::Min(0)])
            .split(area);

        self.draw_settings(frame, chunks[0]);
        self.draw_periods(frame, chunks[1]);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let window_label = if self.editing_window {
            format!("{}_", self.window_input)
        } else {
            format!("{} day(s)", self.window_length)
        };

        let items = vec![
            ListItem::new(format!("Station: {}", self.current_station().display_label())),
            ListItem::new(format!("Window: {window_label}")),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_periods(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();

        match &self.run {
            Some(run) if !run.periods.is_empty() => {
                for (idx, period) in run.periods.periods.iter().enumerate() {
                    lines.push(Line::from(format!(
                        "{}. {} → {}  {:>8.1} mm  ({:.1} mm/day)",
                        idx + 1,
                        period.start_date.format("%d/%m/%Y"),
                        period.end_date.format("%d/%m/%Y"),
                        period.cumulative_mm,
                        run.periods.daily_mean_mm(period),
                    )));
                }
            }
            Some(_) => lines.push(Line::from(Span::styled(
                "No rainy period found for this station.",
                Style::default().fg(Color::Yellow),
            ))),
            None => lines.push(Line::from("...")),
        }

        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().title("Periods").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit window  r recompute  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(
                &self.status,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart-ready series for Plotters.
struct ChartSeries {
    rainfall: Vec<(f64, f64)>,
    periods: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    x_origin: chrono::NaiveDate,
}

/// Build chart series from an analysis (day offsets on x, mm on y).
fn chart_series(run: &AnalysisOutput) -> Option<ChartSeries> {
    let first = run.series.first_date()?;
    let last = run.series.last_date()?;

    let span = ((last - first).num_days() as f64).max(1.0);
    let x_bounds = [0.0, span];

    let rainfall: Vec<(f64, f64)> = run
        .series
        .observations()
        .iter()
        .filter_map(|o| {
            let value = o.rainfall_mm?;
            Some(((o.date - first).num_days() as f64, value))
        })
        .collect();

    let periods: Vec<(f64, f64)> = run
        .periods
        .periods
        .iter()
        .map(|p| {
            (
                ((p.start_date - first).num_days() as f64).clamp(0.0, span),
                ((p.end_date - first).num_days() as f64).clamp(0.0, span),
            )
        })
        .collect();

    let y_max = run.series.max_daily_mm().unwrap_or(0.0);
    let y_bounds = if y_max > 0.0 {
        [0.0, y_max * 1.05]
    } else {
        [0.0, 1.0]
    };

    Some(ChartSeries {
        rainfall,
        periods,
        x_bounds,
        y_bounds,
        x_origin: first,
    })
}
