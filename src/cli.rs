use std::path::PathBuf;

use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;

use crate::weather::Units;

const ABOUT: &str = "Four day weather summary TUI";

const LONG_ABOUT: &str = "
TUI that reduces an hourly weather feed to current conditions and a four day summary.

The feed is a JSON file, either a met.no locationforecast \"compact\" document or a plain array
of {timestamp, temperature, sky_code} objects. It is re-read on every refresh, so another process
can keep it up to date.

Settings may also be given in wxday.toml, searched in $WXDAY_CONFIG, the current directory,
$XDG_CONFIG_HOME/wxday/ and /etc/wxday/. Command line flags take precedence.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(help = "Path to the forecast feed (JSON)")]
    pub feed: Option<PathBuf>,

    #[arg(short, long, help = "Path to config file (TOML)")]
    pub config: Option<PathBuf>,

    #[arg(short, long, env = "WXDAY_LEVEL", help = "Log level: trace, debug, info, warn, error, off")]
    pub level: Option<String>,

    #[arg(short, long, value_enum, help = "Display units")]
    pub units: Option<Units>,

    #[arg(short, long, env = "WXDAY_REFRESH", help = "Refresh interval in seconds")]
    pub refresh: Option<u64>,

    #[arg(long, help = "Also write log output to this file")]
    pub log_file: Option<PathBuf>,

    #[arg(long, help = "Print a single report and exit")]
    pub once: bool,

    #[arg(long, help = "Print a single report as JSON and exit")]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from(["wxday", "feed.json", "--units", "imperial", "--once", "-r", "30"]).unwrap();
        assert_eq!(args.feed, Some(PathBuf::from("feed.json")));
        assert_eq!(args.units, Some(Units::Imperial));
        assert_eq!(args.refresh, Some(30));
        assert!(args.once);
        assert!(!args.json);
    }

    #[test]
    fn test_reject_unknown_units() {
        assert!(Args::try_parse_from(["wxday", "--units", "kelvin"]).is_err());
    }
}
