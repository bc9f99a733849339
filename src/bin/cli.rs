use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::sleep;

use live::delta::Source;
use live::dom::HOOK_ATTR;
use live::hooks::editor_sync::HOOK_NAME;
use live::hooks::{EditorSyncHook, Hook};
use live::{Client, ConnectionState, Element, SessionConfig};

#[derive(Parser)]
#[command(name = "live")]
#[command(
    about = "Live-update session client with rich-text editor sync, progress indication, and live-reload diagnostics",
    version
)]
struct Cli {
    /// Write logs to rolling files in this directory instead of stderr
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect a session and hold it open
    Connect {
        #[arg(short, long, default_value = "ws://127.0.0.1:4000/live")]
        endpoint: String,

        /// Anti-forgery token forwarded in the handshake
        #[arg(long)]
        csrf_token: Option<String>,

        /// Extra handshake parameters
        #[arg(long, value_name = "KEY=VALUE")]
        param: Vec<String>,

        /// Budget for the connect attempt before giving up, in milliseconds
        #[arg(long, default_value_t = 2500)]
        fallback_timeout_ms: u64,

        /// Arm the live-reload diagnostic channel
        #[arg(long)]
        dev: bool,
    },

    /// Connect, mount the editor sync hook on a demo element, and relay
    /// typed lines as user edits
    Demo {
        #[arg(short, long, default_value = "ws://127.0.0.1:4000/live")]
        endpoint: String,

        #[arg(long)]
        csrf_token: Option<String>,
    },
}

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.log_dir.as_deref());

    match cli.command {
        Commands::Connect {
            endpoint,
            csrf_token,
            param,
            fallback_timeout_ms,
            dev,
        } => {
            let mut config = SessionConfig::new()
                .dev(dev)
                .fallback_timeout(Duration::from_millis(fallback_timeout_ms));
            if let Some(token) = csrf_token {
                config = config.csrf_token(token);
            }
            for pair in param {
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {pair}"))?;
                config = config.param(key, value);
            }

            println!("{}", "🔌 Connecting live session...".cyan().bold());
            let client = live::start(&endpoint, config).await?;
            wait_for_handshake(&client).await;

            println!(
                "{} Session {} connected to {}",
                "✓".green(),
                client.handle().id().to_string().bright_yellow(),
                endpoint.bright_blue()
            );
            println!("  {}", "Ctrl-C to disconnect".bright_black());

            tokio::signal::ctrl_c().await?;
            client.close();
            println!("{}", "✓ Disconnected".green());
        }

        Commands::Demo {
            endpoint,
            csrf_token,
        } => {
            let mut config = SessionConfig::new();
            if let Some(token) = csrf_token {
                config = config.csrf_token(token);
            }

            println!("{}", "🔌 Connecting live session...".cyan().bold());
            let client = live::start(&endpoint, config).await?;
            wait_for_handshake(&client).await;

            let host = Element::new("div")
                .with_id("notebook")
                .with_attr(HOOK_ATTR, HOOK_NAME)
                .with_child(Element::new("div").with_id("editor"));
            let mut hook = EditorSyncHook::new();
            hook.mounted(&host, client.handle())?;
            let editor = hook
                .editor()
                .cloned()
                .ok_or_else(|| anyhow!("demo host lost its editor surface"))?;

            println!(
                "{} Editor mounted. Each line you type is relayed as a user edit.",
                "✓".green()
            );
            println!("  {}", "Ctrl-D to finish".bright_black());

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let end = editor.len();
                editor.insert_text(end, &format!("{line}\n"), Source::User);
                println!(
                    "{} {}",
                    "→".bright_blue(),
                    format!("document is now {} chars", editor.len()).bright_black()
                );
            }

            hook.destroyed();
            client.close();
            println!("{}", "✓ Disconnected".green());
        }
    }

    Ok(())
}

async fn wait_for_handshake(client: &Client) {
    for _ in 0..50 {
        if client.state() == ConnectionState::Connected {
            return;
        }
        sleep(Duration::from_millis(100)).await;
    }
    println!(
        "{} handshake not yet acknowledged, events will be dropped until it is",
        "⚠".yellow()
    );
}

fn init_logging(log_dir: Option<&Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "live-cli.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}
