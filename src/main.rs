use std::io;

use anyhow::{anyhow, Context};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::{backend::CrosstermBackend, Terminal};

use wxday::app::{report, run_app, App};
use wxday::cli::Args;
use wxday::config::{get_settings, Settings};
use wxday::logging::setup_logger;
use wxday::{aggregate_local, feed, ForecastError};

fn print_once(settings: &Settings, feed_path: &std::path::Path) -> anyhow::Result<()> {
    let observations = feed::load(feed_path)?;
    let outcome = aggregate_local(&observations);
    if settings.json {
        let value = match &outcome {
            Ok(forecast) => serde_json::to_value(forecast)?,
            Err(ForecastError::EmptyFeed) => serde_json::Value::Null,
            Err(e) => return Err(anyhow!("{e}")),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        if let Err(ref e) = outcome {
            info!("{e}");
        }
        print!("{}", report(outcome.as_ref().ok(), settings.units));
    }
    Ok(())
}

fn run_terminal(settings: &Settings, mut app: App) -> anyhow::Result<()> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, settings.refresh);

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res.context("terminal view failed")
}

fn main() -> anyhow::Result<()> {
    let (settings, source) = get_settings(Args::parse())?;

    setup_logger(settings.level, settings.log_file.as_deref(), settings.once)?;
    info!("config: {source}");

    let feed_path = settings
        .feed
        .clone()
        .ok_or_else(|| anyhow!("no feed given; pass a path or set `feed` in the config file"))?;

    let res = if settings.once {
        print_once(&settings, &feed_path)
    } else {
        run_terminal(&settings, App::new(feed_path, settings.units))
    };

    if let Err(ref e) = res {
        error!("{e:#}");
    }
    res
}
