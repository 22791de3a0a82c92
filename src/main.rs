use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use bkview::core::{
    self, JobStatus, JobType, RenderOptions, RunningLabel, SizeBase, WaitingLabel, render,
};
use bkview::rpc::{RpcClient, RpcServer};
use bkview::{config, console, context, logging};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

#[derive(Parser)]
#[command(name = "bkview")]
#[command(about = "Decode backup console job, volume and file-tree data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    overrides: ConfigArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a job status code and list the available actions
    Status {
        code: char,
        /// Job type code, for action availability
        #[arg(long = "type", default_value = "B")]
        job_type: char,
    },
    /// Decode a packed file mode into ls -l notation
    Mode { value: i64 },
    /// Format a byte count
    Size {
        bytes: u64,
        #[arg(long)]
        binary: bool,
    },
    /// Bucket an epoch timestamp relative to now
    Age { timestamp: i64 },
    /// Format a retention period given in seconds
    Duration { seconds: u64 },
    /// Render a console JSON response read from a file or stdin
    Render {
        kind: RecordKind,
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Serve the JSON-RPC decode service
    Serve,
    /// Call a method on a running decode service
    Call {
        method: String,
        /// JSON params
        params: Option<String>,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum RecordKind {
    Jobs,
    Volumes,
    Files,
}

/// Global flags that override the config file and environment.
#[derive(Args, Serialize)]
struct ConfigArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    rpc_bind: Option<SocketAddr>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    verbose: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    json_logs: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true, value_parser = parse_waiting_label)]
    waiting_label: Option<WaitingLabel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true, value_parser = parse_running_label)]
    running_label: Option<RunningLabel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true, allow_hyphen_values = true)]
    utc_offset_minutes: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true, value_parser = parse_size_base)]
    file_size_base: Option<SizeBase>,
}

fn parse_waiting_label(s: &str) -> Result<WaitingLabel, String> {
    match s {
        "waiting" => Ok(WaitingLabel::Waiting),
        "queued" => Ok(WaitingLabel::Queued),
        other => Err(format!("expected waiting or queued, got {}", other)),
    }
}

fn parse_running_label(s: &str) -> Result<RunningLabel, String> {
    match s {
        "generic" => Ok(RunningLabel::Generic),
        "phase" => Ok(RunningLabel::Phase),
        other => Err(format!("expected generic or phase, got {}", other)),
    }
}

fn parse_size_base(s: &str) -> Result<SizeBase, String> {
    match s {
        "decimal" => Ok(SizeBase::Decimal),
        "binary" => Ok(SizeBase::Binary),
        other => Err(format!("expected decimal or binary, got {}", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::AppConfig::new(Some(&cli.overrides))?;
    logging::init(logging::LogConfig::from(&config))?;
    let ctx = context::AppContext::new(config).context("Invalid configuration")?;

    match cli.command {
        Commands::Status { code, job_type } => {
            let status = JobStatus::from_code(code);
            #[derive(Serialize)]
            struct StatusOutput {
                #[serde(flatten)]
                info: core::StatusInfo,
                actions: core::ActionSet,
            }
            print_json(&StatusOutput {
                info: status.classify(&ctx.config.label_options()),
                actions: core::available_actions(status, JobType::from_code(job_type)),
            })?;
        }
        Commands::Mode { value } => match core::decode_mode(value)? {
            Some(symbolic) => println!("{}", symbolic),
            None => println!("-"),
        },
        Commands::Size { bytes, binary } => {
            let base = if binary {
                SizeBase::Binary
            } else {
                SizeBase::Decimal
            };
            println!("{}", base.format(bytes));
        }
        Commands::Age { timestamp } => {
            println!("{}", core::format_relative_age(Some(timestamp), Utc::now())?);
        }
        Commands::Duration { seconds } => println!("{}", core::format_duration(seconds)),
        Commands::Render { kind, input } => {
            let response = read_response(input.as_ref())?;
            run_render(kind, response, &ctx.render_options())?;
        }
        Commands::Serve => run_server(ctx).await.context("Failed to run decode service")?,
        Commands::Call { method, params } => {
            let params = params
                .map(|p| serde_json::from_str::<Value>(&p))
                .transpose()
                .context("params must be valid JSON")?;
            let client = RpcClient::new(ctx.config.rpc_bind);
            let result: Value = client
                .call(&method, params)
                .await
                .with_context(|| format!("Call to {} failed", method))?;
            print_json(&result)?;
        }
        Commands::Config => print!("{}", ctx.config.to_toml()?),
    }

    Ok(())
}

fn read_response(input: Option<&PathBuf>) -> Result<Value> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };

    if text.trim().is_empty() {
        bail!("No console response given");
    }
    serde_json::from_str(&text).context("Console response is not valid JSON")
}

fn run_render(kind: RecordKind, response: Value, options: &RenderOptions) -> Result<()> {
    match kind {
        RecordKind::Jobs => {
            let jobs = console::jobs(response)?;
            print_json(&render::render_jobs(&jobs, options))
        }
        RecordKind::Volumes => {
            let volumes = console::volumes(response)?;
            print_json(&render::render_volumes(&volumes, options))
        }
        RecordKind::Files => {
            let nodes = console::file_nodes(response)?;
            print_json(&render::render_file_nodes(&nodes, options))
        }
    }
}

async fn run_server(ctx: context::AppContext) -> Result<()> {
    let server = RpcServer::bind(ctx.clone(), ctx.config.rpc_bind).await?;
    info!(addr = %server.local_addr()?, "Decode service ready");

    tokio::select! {
        result = server.start() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received");
            server.shutdown();
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}
