use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use log::{info, warn};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, List, ListItem, Paragraph, Row, Table},
    Frame, Terminal,
};

use crate::aggregate::{aggregate_local, FORECAST_DAYS};
use crate::error::ForecastError;
use crate::feed;
use crate::units::temperature;
use crate::weather::{CurrentSnapshot, DailySummary, Forecast, Units};

const MISSING: &str = "--";

/// Poll interval for key presses between refreshes.
const INPUT_POLL: Duration = Duration::from_millis(250);

/// Holds the published forecast. Each refresh runs one full pass and either
/// replaces the forecast wholesale or leaves it untouched.
pub struct App {
    feed: PathBuf,
    units: Units,
    forecast: Option<Forecast>,
    status: String,
    updated_at: Option<DateTime<Local>>,
}

impl App {
    pub fn new(feed: PathBuf, units: Units) -> Self {
        Self {
            feed,
            units,
            forecast: None,
            status: "waiting for first refresh".to_string(),
            updated_at: None,
        }
    }

    pub fn forecast(&self) -> Option<&Forecast> {
        self.forecast.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Re-read the feed and run a pass against the local clock.
    pub fn refresh(&mut self) -> bool {
        match feed::load(&self.feed) {
            Ok(observations) => self.publish(aggregate_local(&observations)),
            Err(e) => {
                warn!("{e}");
                self.status = format!("feed unavailable: {e}");
                false
            }
        }
    }

    /// Apply the outcome of a pass. Returns true when the forecast changed
    /// hands; an empty feed keeps whatever was shown before.
    pub fn publish(&mut self, outcome: Result<Forecast, ForecastError>) -> bool {
        match outcome {
            Ok(forecast) => {
                info!(
                    "forecast updated: {} day(s), now {}",
                    forecast.days.len(),
                    forecast.current.condition
                );
                self.forecast = Some(forecast);
                let now = Local::now();
                self.status = format!("updated {}", now.format("%H:%M"));
                self.updated_at = Some(now);
                true
            }
            Err(e) => {
                warn!("keeping previous forecast: {e}");
                self.status = match self.updated_at {
                    Some(at) => format!("no update ({e}), showing {}", at.format("%H:%M")),
                    None => format!("no data ({e})"),
                };
                false
            }
        }
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    refresh_every: Duration,
) -> io::Result<()> {
    app.refresh();
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(INPUT_POLL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('r') => {
                            app.refresh();
                            last_tick = Instant::now();
                        }
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= refresh_every {
            last_tick = Instant::now();
            app.refresh();
        }
    }
}

/// Today first, padded with `None` up to four slots.
pub fn day_slots(forecast: Option<&Forecast>) -> Vec<Option<&DailySummary>> {
    let days = forecast.map(|f| f.days.as_slice()).unwrap_or_default();
    (0..FORECAST_DAYS).map(|i| days.get(i)).collect()
}

fn format_day(day: Option<&DailySummary>, units: Units) -> String {
    match day {
        Some(day) => format!(
            "{:3} {:6}  {:>8} / {:>8}  {}",
            day.day_label,
            day.date_label,
            temperature::format(day.high_temp, units),
            temperature::format(day.low_temp, units),
            day.condition
        ),
        None => MISSING.to_string(),
    }
}

fn format_sky(current: &CurrentSnapshot) -> String {
    match current.sky_code.as_deref() {
        Some(code) if !code.is_empty() => format!("{} ({code})", current.condition),
        _ => current.condition.to_string(),
    }
}

/// Plain text rendering used by `--once`.
pub fn report(forecast: Option<&Forecast>, units: Units) -> String {
    let mut lines = vec!["Current Conditions".to_string()];
    match forecast {
        Some(fc) => {
            lines.push(format!(
                "  {:13}{}",
                "Temperature",
                temperature::format(fc.current.temperature, units)
            ));
            lines.push(format!("  {:13}{}", "Conditions", format_sky(&fc.current)));
        }
        None => lines.push(format!("  {MISSING}")),
    }

    lines.push(String::new());
    lines.push("Forecast".to_string());
    lines.extend(
        day_slots(forecast)
            .into_iter()
            .map(|day| format!("  {}", format_day(day, units))),
    );

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Yellow),
        ))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

fn display_current_conditions(forecast: Option<&Forecast>, units: Units) -> Table<'static> {
    let (temp, text) = match forecast {
        Some(fc) => (
            temperature::format(fc.current.temperature, units),
            format_sky(&fc.current),
        ),
        None => (MISSING.to_string(), MISSING.to_string()),
    };

    let rows = vec![
        Row::new(vec![Cell::from("")]),
        Row::new(vec![
            Cell::from(" Temperature"),
            Cell::from(temp).style(Style::default().fg(Color::Green)),
        ]),
        Row::new(vec![
            Cell::from(" Conditions"),
            Cell::from(text).style(Style::default().fg(Color::Green)),
        ]),
    ];

    Table::new(rows, [Constraint::Length(13), Constraint::Min(15)]).block(panel("Current Conditions"))
}

fn display_day(day: Option<&DailySummary>, units: Units) -> Vec<Line<'static>> {
    let Some(day) = day else {
        return vec![Line::from(""), Line::from(format!(" {MISSING}"))];
    };

    vec![
        Line::from(""),
        Line::from(vec![
            Span::raw(" "),
            Span::styled(
                format!("{} {}", day.day_label, day.date_label),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw(format!(" {:13}", "High / Low")),
            Span::styled(
                format!(
                    "{} / {}",
                    temperature::format(day.high_temp, units),
                    temperature::format(day.low_temp, units)
                ),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(vec![
            Span::raw(format!(" {:13}", "Conditions")),
            Span::styled(day.condition.to_string(), Style::default().fg(Color::Green)),
        ]),
    ]
}

fn ui(f: &mut Frame, app: &App) {
    let vert_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(f.area());

    let headline = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(app.feed.display().to_string(), Style::default().fg(Color::Blue)),
        Span::raw(" : "),
        Span::raw(app.status.clone()),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .border_type(BorderType::Rounded),
    );
    f.render_widget(headline, vert_layout[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(vert_layout[1]);

    let forecast = app.forecast();
    f.render_widget(display_current_conditions(forecast, app.units), chunks[0]);

    let items: Vec<ListItem> = day_slots(forecast)
        .into_iter()
        .map(|day| ListItem::new(display_day(day, app.units)))
        .collect();
    f.render_widget(List::new(items).block(panel("Forecast")), chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::weather::Observation;
    use chrono::{NaiveDate, Utc};

    fn sample() -> Forecast {
        let feed = vec![
            Observation::new("2024-02-14T08:00:00Z", Some(5.0), Some("cloudy")),
            Observation::new("2024-02-14T09:00:00Z", Some(7.0), Some("rain")),
            Observation::new("2024-02-15T08:00:00Z", Some(1.0), Some("snow")),
        ];
        aggregate(&feed, NaiveDate::from_ymd_opt(2024, 2, 14).unwrap(), &Utc).unwrap()
    }

    #[test]
    fn test_day_slots_pad_to_four() {
        let fc = sample();
        let slots = day_slots(Some(&fc));
        assert_eq!(slots.len(), FORECAST_DAYS);
        assert!(slots[1].is_some());
        assert!(slots[2].is_none() && slots[3].is_none());
        assert!(day_slots(None).iter().all(Option::is_none));
    }

    #[test]
    fn test_report() {
        let fc = sample();
        let text = report(Some(&fc), Units::Metric);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "  Temperature  5.0 C");
        assert_eq!(lines[2], "  Conditions   Cloudy (cloudy)");
        assert!(lines[5].starts_with("  Wed 14 Feb"));
        assert!(lines[5].ends_with("Rain"));
        assert!(lines[6].contains("1.0 C") && lines[6].ends_with("Snow"));
        assert_eq!(lines[7], "  --");
        assert_eq!(lines[8], "  --");
    }

    #[test]
    fn test_report_without_forecast() {
        let text = report(None, Units::Imperial);
        assert!(text.starts_with("Current Conditions\n  --\n"));
        assert_eq!(text.matches("--").count(), 1 + FORECAST_DAYS);
    }

    #[test]
    fn test_report_layout() {
        let text = report(Some(&sample()), Units::Metric);
        assert!(text.ends_with("  --\n"));
        assert_eq!(text.lines().count(), 5 + FORECAST_DAYS);
        assert_eq!(text.lines().nth(3), Some(""));
        assert_eq!(text.lines().nth(4), Some("Forecast"));
    }

    #[test]
    fn test_empty_feed_keeps_previous_forecast() {
        let mut app = App::new(PathBuf::from("feed.json"), Units::Metric);
        assert!(!app.publish(Err(ForecastError::EmptyFeed)));
        assert!(app.forecast().is_none());
        assert!(app.status().starts_with("no data"));

        assert!(app.publish(Ok(sample())));
        assert!(!app.publish(Err(ForecastError::EmptyFeed)));
        assert_eq!(app.forecast(), Some(&sample()));
        assert!(app.status().starts_with("no update"));
    }

    #[test]
    fn test_refresh_missing_feed() {
        let mut app = App::new(PathBuf::from("/definitely/not/here.json"), Units::Metric);
        assert!(!app.refresh());
        assert!(app.status().starts_with("feed unavailable"));
    }
}
