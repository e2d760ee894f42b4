mod alarm;
mod remote;
mod state;
mod stopwatch;
mod theme;
mod timer;
mod ui;
mod worldclock;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};

use crate::state::{
    credentials_path, default_state_dir, load_credentials, load_timer_snapshot, timer_path,
};
use crate::ui::app::Tab;
use crate::worldclock::lookup_city_offset;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliTab {
    Clock,
    Alarm,
    Stopwatch,
    Timer,
}

impl From<CliTab> for Tab {
    fn from(value: CliTab) -> Self {
        match value {
            CliTab::Clock => Tab::Clock,
            CliTab::Alarm => Tab::Alarm,
            CliTab::Stopwatch => Tab::Stopwatch,
            CliTab::Timer => Tab::Timer,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "focusdeck",
    version,
    about = "Focus timer, alarms, stopwatch and world clock in one window"
)]
struct Cli {
    /// Directory for the countdown snapshot and remembered credentials.
    #[arg(long, default_value_os_t = default_state_dir())]
    state_dir: PathBuf,

    /// Tab shown on launch.
    #[arg(long, value_enum, default_value_t = CliTab::Timer)]
    tab: CliTab,

    /// Run without the identity, store and assist services.
    #[arg(long)]
    offline: bool,

    /// Print a summary of the local state files and exit.
    #[arg(long)]
    inspect_state: bool,

    /// Print the built-in offset-table entry for a city and exit.
    #[arg(long, value_name = "CITY")]
    locate: Option<String>,
}

fn main() {
    tracing_subscriber::fmt::init();
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(city) = cli.locate.as_deref() {
        return locate_city(city);
    }
    if cli.inspect_state {
        return inspect_state(&cli.state_dir);
    }

    ui::app::run_gui(cli.state_dir, cli.tab.into(), cli.offline)
}

fn locate_city(query: &str) -> Result<()> {
    let Some(offset) = lookup_city_offset(query) else {
        bail!("unknown city '{}'; not in the built-in offset table", query.trim());
    };
    println!("{} UTC{offset:+}", query.trim().to_lowercase());
    Ok(())
}

fn inspect_state(dir: &Path) -> Result<()> {
    println!("state directory: {}", dir.display());

    let timer_file = timer_path(dir);
    match load_timer_snapshot(&timer_file)
        .with_context(|| format!("failed to inspect {}", timer_file.display()))?
    {
        Some(snapshot) => println!(
            "timer: remaining_seconds={} total_seconds={} running={} last_timestamp={} theme_index={}",
            snapshot.remaining_seconds,
            snapshot.total_seconds,
            snapshot.running,
            snapshot.saved_at_unix,
            snapshot.theme_index
        ),
        None => println!("timer: no saved session"),
    }

    let credentials_file = credentials_path(dir);
    match load_credentials(&credentials_file)
        .with_context(|| format!("failed to inspect {}", credentials_file.display()))?
    {
        Some(credentials) => println!("credentials: remembered for {}", credentials.email),
        None => println!("credentials: none remembered"),
    }

    Ok(())
}
