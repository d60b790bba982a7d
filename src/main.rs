use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use adsfetch::config::{Config, BASE_URL_ENV, DEV_KEY_ENV};
use adsfetch::process::{process_files, Job};
use adsfetch::request::SearchClient;
use adsfetch::{info_time, Result, DEFAULT_BASE_URL, DEFAULT_GRANT_FILTER, DEFAULT_ROWS, DEFAULT_TOP_VENUES};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Search ADS for authors or grants and print the results as TSV.
#[derive(Parser, Debug)]
#[command(name = "adsfetch", version, about)]
struct Cli {
    /// Developer API key. Without one requests may be rate limited or rejected.
    #[arg(long, global = true, env = DEV_KEY_ENV, default_value = "", hide_env_values = true)]
    dev_key: String,

    /// Search endpoint.
    #[arg(long, global = true, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Records requested per page.
    #[arg(long, global = true, default_value_t = DEFAULT_ROWS, value_parser = clap::value_parser!(u32).range(1..))]
    rows: u32,

    /// Per request timeout in seconds.
    #[arg(long, global = true, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Retries of a failed page request before giving up on the identifier.
    #[arg(long, global = true, default_value_t = 2)]
    max_retries: u32,

    /// Delay before the first retry, in milliseconds.
    #[arg(long, global = true, default_value_t = 500)]
    retry_delay_ms: u64,

    /// Enable debug logging (request urls included). `RUST_LOG` takes precedence when set.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bibliography per author name: bibcode, title, publication, authors.
    Authors {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Records per `org grant-id` line: bibcode, org, grant.
    Grants {
        /// Filter query sent with every grant lookup.
        #[arg(long, default_value = DEFAULT_GRANT_FILTER)]
        filter: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Refereed counts and top publication venues per author name.
    Facets {
        /// Number of publication venues to report.
        #[arg(long, default_value_t = DEFAULT_TOP_VENUES)]
        top: u32,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

impl Cli {
    fn config(&self) -> Config {
        Config::default()
            .with_base_url(&self.base_url)
            .with_dev_key(&self.dev_key)
            .with_rows(self.rows)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_retries(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    fn job(&self) -> (Job, &[PathBuf]) {
        match &self.command {
            Commands::Authors { files } => (Job::Authors, files.as_slice()),
            Commands::Grants { filter, files } => (
                Job::Grants {
                    filter: filter.clone(),
                },
                files.as_slice(),
            ),
            Commands::Facets { top, files } => (Job::Facets { top: *top }, files.as_slice()),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref(), cli.debug))
        .init();

    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins when set and valid, otherwise `--debug` picks between debug and info.
fn log_filter(rust_log: Option<&str>, debug: bool) -> EnvFilter {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level.to_string()))
}

/// `Ok(false)` when some input file could not be read.
async fn run(cli: &Cli) -> Result<bool> {
    let start_time = Local::now();
    let client = SearchClient::new(cli.config())?;
    let (job, files) = cli.job();

    let mut stdout = tokio::io::stdout();
    let summary = process_files(&client, &job, files, &mut stdout).await?;

    info_time!(
        start_time,
        "done: {} identifiers, {} failed, {} lines written",
        summary.identifiers,
        summary.failed,
        summary.lines_written
    );
    Ok(summary.unreadable_files == 0)
}
