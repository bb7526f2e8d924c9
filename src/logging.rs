use std::path::Path;

use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::Dispatch;
use log::LevelFilter;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

fn console() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}: {}",
                Local::now().format(TIME_FORMAT),
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stderr())
}

fn file(path: &Path) -> Result<Dispatch, fern::InitError> {
    Ok(Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}: {}",
                Local::now().format(TIME_FORMAT),
                record.level(),
                record.target(),
                message
            ));
        })
        .chain(fern::log_file(path)?))
}

/// Install the global logger.
///
/// Console output goes to stderr. With `console_output` off (the terminal view owns
/// the screen) only `log_file` receives records, and nothing is logged when
/// there is no file either.
pub fn setup_logger(
    level: LevelFilter,
    log_file: Option<&Path>,
    console_output: bool,
) -> Result<(), fern::InitError> {
    let mut dispatch = Dispatch::new().level(level);
    if console_output {
        dispatch = dispatch.chain(console());
    }
    if let Some(path) = log_file {
        dispatch = dispatch.chain(file(path)?);
    }
    if !console_output && log_file.is_none() {
        dispatch = dispatch.level(LevelFilter::Off);
    }
    dispatch.apply()?;
    Ok(())
}
