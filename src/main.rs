use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use quota_watch::browser::{DriverProcess, SessionOptions, WebDriverSession};
use quota_watch::config::{load_file_config, WatchConfig};
use quota_watch::error_label;
use quota_watch::models::Target;
use quota_watch::monitor::Monitor;
use quota_watch::notify::ConsoleSink;
use quota_watch::process::Shutdown;
use quota_watch::validation::{clap_course_validator, clap_section_validator};

#[derive(Parser)]
#[command(name = "quota-watch")]
#[command(about = "Watch course section quotas and report every change", long_about = None)]
#[command(version)]
struct Cli {
    /// Course code as shown on the offerings page, e.g. "CS 101" (max 32 characters)
    #[arg(short, long, value_parser = clap_course_validator)]
    course: String,

    /// Section numbers to track, e.g. 1 2 or 001 (1-3 digits each)
    #[arg(
        short,
        long = "section",
        num_args = 1..,
        required = true,
        value_parser = clap_section_validator
    )]
    sections: Vec<String>,

    /// Seconds between polls [default: 60]
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Config file (default: <config dir>/quota-watch/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use a running WebDriver server instead of starting geckodriver
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Also send a desktop notification for every quota change
    #[arg(long)]
    notify: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply_to(&self, config: &mut WatchConfig) {
        if let Some(secs) = self.interval {
            config.monitor.poll_interval = Duration::from_secs(secs);
        }
        if self.webdriver_url.is_some() {
            config.webdriver_url = self.webdriver_url.clone();
        }
        if self.headed {
            config.headless = false;
        }
        if self.notify {
            config.notify = true;
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("quota_watch={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = WatchConfig::default();
    if let Some(file) = load_file_config(cli.config.as_deref())? {
        config.apply_file(file);
    }
    cli.apply_to(&mut config);
    config.validate()?;

    let target = Target::new(cli.course.as_str(), &cli.sections);
    println!("Course: {}", target.course().bold());
    println!("Sections: [{}]", target.sections().join(", "));

    let shutdown = Shutdown::new();
    shutdown
        .install_interrupt_handler()
        .context("Failed to install Ctrl-C handler")?;

    // Declared before the monitor so geckodriver outlives the session.
    let (_driver, webdriver_url) = match config.webdriver_url.clone() {
        Some(url) => (None, url),
        None => {
            let driver = DriverProcess::spawn(config.geckodriver.as_deref())
                .context("Failed to start geckodriver")?;
            let url = driver.url().to_string();
            (Some(driver), url)
        }
    };

    let options = SessionOptions {
        headless: config.headless,
        ..SessionOptions::default()
    };
    let session = WebDriverSession::start(&webdriver_url, options, shutdown.clone())
        .with_context(|| format!("Failed to open a browser session at {webdriver_url}"))?;

    let mut monitor = Monitor::new(
        target,
        config.monitor.clone(),
        session,
        ConsoleSink::new(config.notify),
        shutdown,
    );
    monitor.run()?;

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", error_label(&e).as_str().red().bold());
            ExitCode::FAILURE
        }
    }
}
