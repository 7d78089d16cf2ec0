use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use ticket_console::{api, render_trace, ApiCtx, ClientConfig, Mode, Session};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Submit support tickets and inspect their traces", long_about = None)]
struct Cli {
    /// Base URL of the ticket service [default: $TICKET_API_BASE_URL or http://localhost:8000]
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds [default: $TICKET_API_TIMEOUT_SECS or none]
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Print raw JSON instead of formatted panels
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify a ticket
    Analyze {
        /// good, bad or compare
        #[arg(short, long, default_value = "good")]
        mode: Mode,
        /// Free-text ticket
        text: String,
        /// Wait for and print the trace detail
        #[arg(long)]
        trace: bool,
    },
    /// Show one trace
    Trace {
        trace_id: String,
    },
    /// List recent traces
    Traces {
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Check that the service is up
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("invalid client configuration")?;
    if let Some(ref base_url) = cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let ctx = Arc::new(ApiCtx::builder(config).build()?);

    match cli.command {
        Commands::Analyze { mode, text, trace } => {
            let session = Session::new(Arc::clone(&ctx));
            let Some(submission) = session.submit(&text, mode).await else {
                anyhow::bail!("nothing to submit: ticket text is empty");
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&submission.result)?);
            } else {
                print!("{}", submission.view);
            }
            if trace {
                submission.trace.await.context("trace fetch task panicked")?;
                match session.trace_detail() {
                    Some(detail) if cli.json => println!("{}", serde_json::to_string_pretty(&detail)?),
                    Some(detail) => print!("\n{}", render_trace(&detail)),
                    None => eprintln!("{}", "no trace detail available".bright_black()),
                }
            }
        }
        Commands::Trace { trace_id } => {
            let detail = api::fetch_trace(&ctx, &trace_id).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                print!("{}", render_trace(&detail));
            }
        }
        Commands::Traces { limit } => {
            let traces = api::list_traces(&ctx, limit).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&traces)?);
            } else if traces.is_empty() {
                println!("{}", "no traces".bright_black());
            } else {
                for t in traces {
                    println!(
                        "{}  {}  {}",
                        t.id.cyan(),
                        t.timestamp.as_deref().unwrap_or("-").bright_black(),
                        t.name.as_deref().unwrap_or("")
                    );
                }
            }
        }
        Commands::Health => {
            let health = api::health(&ctx).await?;
            if health.is_ok() {
                println!("{} {}", "✓".bright_green(), ctx.base_url);
            } else {
                anyhow::bail!("service at {} reports status {:?}", ctx.base_url, health.status);
            }
        }
    }

    Ok(())
}
