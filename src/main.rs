//! One-Shield DLP Agent - Main Entry Point
//!
//! Reads download events as JSON lines (file argument or stdin), runs each
//! through the pipeline and prints one outcome per line on stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use oneshield_dlp::constants;
use oneshield_dlp::{AgentConfig, AgentResult, DownloadEvent, EventPipeline};

#[derive(Debug, Default)]
struct RunStats {
    processed: usize,
    rejected: usize,
}

fn init_logging() {
    let default_level = constants::env_string("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    log::info!("Starting {} v{}...", constants::APP_NAME, constants::APP_VERSION);

    let input = std::env::args_os().nth(1).map(PathBuf::from);

    match run(input).await {
        Ok(stats) => {
            log::info!(
                "Done: {} processed, {} rejected",
                stats.processed,
                stats.rejected
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Agent failed: {}", e);
            eprintln!("oneshield-dlp: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(input: Option<PathBuf>) -> AgentResult<RunStats> {
    let mut config = AgentConfig::load()?;

    // Events on stdin: the console prompt cannot share it
    if input.is_none() && config.interactive_prompts {
        log::warn!("Reading events from stdin, confirmation prompts disabled");
        config.interactive_prompts = false;
    }

    log::info!(
        "Agent {} | backend={} | pool={}",
        config.agent_id,
        if config.backend.enabled {
            config.backend.base_url.as_str()
        } else {
            "disabled"
        },
        config.reference_pool_path.display()
    );

    let pipeline = EventPipeline::from_config(&config)?;

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &input {
        Some(path) => {
            log::info!("Reading events from {}", path.display());
            Box::new(BufReader::new(tokio::fs::File::open(path).await?))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let stats = process_lines(&pipeline, reader).await?;
    pipeline.drain_feedback().await;
    Ok(stats)
}

async fn process_lines(
    pipeline: &EventPipeline,
    reader: Box<dyn AsyncBufRead + Unpin + Send>,
) -> AgentResult<RunStats> {
    let mut stats = RunStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event = match DownloadEvent::parse(line) {
            Ok(event) => event,
            Err(e) => {
                log::error!("[EVENT] Rejected: {}", e);
                stats.rejected += 1;
                continue;
            }
        };

        match pipeline.process(event).await {
            Ok(outcome) => {
                stats.processed += 1;
                match serde_json::to_string(&outcome) {
                    Ok(json) => println!("{}", json),
                    Err(e) => log::error!("[EVENT] {} outcome not serializable: {}", outcome.event_id, e),
                }
            }
            Err(_) => stats.rejected += 1,
        }
    }

    Ok(stats)
}
