//! Wellness Sensor Agent CLI
//!
//! Ambient emotion sensor reporting wellness events.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wellness_sensor_agent::{
    agent::{self, AgentError},
    transparency::create_shared_log,
    CommandClassifier, CommandFrameSource, Config, LoopExit, PRIVACY_DECLARATION, VERSION,
};

#[derive(Parser)]
#[command(name = "wellness-sensor")]
#[command(version = VERSION)]
#[command(about = "Ambient emotion sensor reporting wellness events", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and start sampling
    Start {
        /// Wellness API base address
        #[arg(long)]
        api_base: Option<String>,

        /// Account email
        #[arg(long)]
        email: Option<String>,

        /// Minimum seconds between classifications
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Check configuration and credentials without sampling
    Check,

    /// Show configuration
    Config,

    /// Display privacy declaration
    Privacy,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Start {
            api_base,
            email,
            interval,
        } => {
            let code = cmd_start(api_base, email, interval);
            std::process::exit(code);
        }
        Commands::Check => {
            cmd_check();
        }
        Commands::Config => {
            cmd_config();
        }
        Commands::Privacy => {
            cmd_privacy();
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Load configuration and apply CLI overrides.
fn resolve_config(
    api_base: Option<String>,
    email: Option<String>,
    interval: Option<u64>,
) -> anyhow::Result<Config> {
    let mut config = Config::load()
        .with_context(|| format!("loading {}", Config::config_path().display()))?;

    if let Some(base) = api_base {
        config.api_base = base;
    }
    if let Some(email) = email {
        config.account_email = email;
    }
    if let Some(secs) = interval {
        config.sampling_interval = Duration::from_secs(secs);
    }

    Ok(config)
}

fn cmd_start(api_base: Option<String>, email: Option<String>, interval: Option<u64>) -> i32 {
    println!("Wellness Sensor Agent v{VERSION}");
    println!();

    let config = match resolve_config(api_base, email, interval) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return 1;
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        eprintln!("Set it in {:?} or via environment variables.", Config::config_path());
        return 1;
    }

    println!("Starting agent...");
    println!("  API: {}", config.api_base);
    println!("  Account: {}", config.account_email);
    println!("  Sampling interval: {}s", config.sampling_interval.as_secs());
    println!("  Classifier timeout: {}s", config.classifier_timeout.as_secs());
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let source = match CommandFrameSource::new(&config.capture_command) {
        Ok(source) => source.with_timeout(config.capture_timeout),
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    let classifier = match CommandClassifier::new(&config.classifier_command) {
        Ok(classifier) => classifier.with_timeout(config.classifier_timeout),
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    let transparency_log = create_shared_log();
    let result = agent::run(
        &config,
        source,
        classifier,
        running,
        transparency_log.clone(),
    );

    let code = match result {
        Ok(LoopExit::Stopped) => {
            println!();
            println!("Stopped.");
            0
        }
        Ok(LoopExit::EndOfStream) => {
            println!();
            println!("Frame source ended.");
            0
        }
        Err(AgentError::Session(e)) => {
            eprintln!("Could not log in: {e}");
            eprintln!("Exiting.");
            return 1;
        }
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };

    // Final stats
    println!();
    println!("{}", transparency_log.summary());
    code
}

fn cmd_check() {
    let config = match resolve_config(None, None, None) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    println!("Checking {} as {}...", config.api_base, config.account_email);

    match agent::connect(&config) {
        Ok((client, session)) => {
            println!("  Login: OK ✓");
            println!("  Device ID: {}", client.device_id());
            println!("  Session established at {}", session.established_at());
        }
        Err(e) => {
            eprintln!("  Login: FAILED ✗");
            eprintln!("  {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config.redacted()).unwrap_or_else(|_| "Error".to_string())
    );
}

fn cmd_privacy() {
    println!("{PRIVACY_DECLARATION}");
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
