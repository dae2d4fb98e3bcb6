mod config;

use clap::{Parser, Subcommand};
use chrono::{Local, TimeZone};
use common::JobId;
use jobq_client::{JobQuery, Readiness, TcpTransport};
use std::path::PathBuf;

use config::Config;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (.yaml or .toml); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seconds until a job's scheduled end time
    Remaining {
        /// Job id; defaults to the job this process runs under
        #[arg(long)]
        job: Option<u32>,
    },
    /// Scheduled end time of a job
    EndTime {
        #[arg(long)]
        job: Option<u32>,
    },
    /// Whether a job's allocated resources are ready to use
    Ready {
        job: u32,
        /// Keep polling until the job is ready or fatally not coming
        #[arg(long)]
        wait: bool,
        /// Seconds between polls with --wait
        #[arg(long, default_value_t = 10)]
        interval: u64,
    },
    /// Job id owning a process on this host
    Pid2job {
        /// Process id; defaults to this process
        pid: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    setup_logging(&config)?;

    let transport = TcpTransport::new(config.controller.addr.clone(), config.daemon.port);
    let query = JobQuery::new(transport).with_daemon_host(config.daemon.host.clone());

    match cli.command {
        Commands::Remaining { job } => {
            let job = JobId(job.unwrap_or(0));
            match query.remaining_time(job).await {
                Some(secs) => println!("{}", secs),
                None => {
                    eprintln!("remaining time unknown");
                    std::process::exit(1);
                }
            }
        }
        Commands::EndTime { job } => {
            let job = JobId(job.unwrap_or(0));
            let end_time = query.get_end_time(job).await?;
            match Local.timestamp_opt(end_time, 0).single() {
                Some(t) => println!("{}", t.format("%Y-%m-%d %H:%M:%S")),
                None => println!("{}", end_time),
            }
        }
        Commands::Ready { job, wait, interval } => loop {
            match query.is_ready(JobId(job)).await? {
                Readiness::Ready => {
                    println!("job {} is ready", job);
                    break;
                }
                Readiness::NotReady if wait => {
                    log::info!("job {} not ready, polling again in {}s", job, interval);
                    tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
                }
                Readiness::NotReady => {
                    println!("job {} is not ready", job);
                    std::process::exit(1);
                }
                Readiness::Fatal(code) => {
                    eprintln!("job {} will never become ready (code {})", job, code);
                    std::process::exit(2);
                }
            }
        },
        Commands::Pid2job { pid } => {
            let pid = pid.unwrap_or_else(std::process::id);
            let job = query.resolve_job_id(pid).await?;
            println!("{}", job);
        }
    }

    Ok(())
}

fn setup_logging(config: &Config) -> anyhow::Result<()> {
    let level = config
        .logging
        .level
        .parse::<log::LevelFilter>()
        .unwrap_or(log::LevelFilter::Warn);

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                chrono::Local::now().format("%Y-%m-%d][%H:%M:%S"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Some(ref path) = config.logging.output {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}
