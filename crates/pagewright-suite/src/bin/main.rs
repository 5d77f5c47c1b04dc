use anyhow::Context;
use clap::Parser;
use pagewright_suite::{Params, Runner, Scenario, SuiteConfig};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "pagewright-suite")]
#[command(about = "End-to-end UI and API suite")]
#[command(version)]
struct Cli {
    /// Suite file to run
    config: PathBuf,

    /// Run in headless mode (overrides config)
    #[arg(long)]
    headless: bool,

    /// Set a parameter (can be used multiple times)
    #[arg(short = 'P', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Run only this scenario (can be used multiple times)
    #[arg(short, long = "scenario", value_name = "NAME")]
    scenarios: Vec<String>,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate config without running
    #[arg(long)]
    check: bool,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let params = Params::from_args(&cli.params)?;
    let mut config = SuiteConfig::load_with_params(&cli.config, &params)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    if !cli.scenarios.is_empty() {
        config.scenarios = cli
            .scenarios
            .iter()
            .map(|name| name.parse::<Scenario>())
            .collect::<pagewright_suite::Result<_>>()?;
    }

    if cli.check {
        println!("Config valid: {}", config.name);
        println!("  Base URL: {}", config.base_url);
        println!("  Timeout: {}ms", config.timeout_ms);
        let names: Vec<_> = config.scenarios.iter().map(|s| s.name()).collect();
        println!("  Scenarios: {}", names.join(", "));
        if !config.params.is_empty() {
            println!("  Parameters: {}", config.params.len());
            for (name, def) in &config.params {
                let req = if def.required { " (required)" } else { "" };
                let desc = def.description.as_deref().unwrap_or("");
                println!("    - {}{}: {}", name, req, desc);
            }
        }
        println!("  Attempts: {}", config.retries.attempts);
        return Ok(());
    }

    if cli.headless {
        config.browser.headless = true;
    }

    println!("Running: {}", config.name);

    let runner = Runner::for_suite(&config)
        .await
        .context("failed to launch browser")?;
    let results = runner.run(&config).await;
    runner.close().await?;

    println!();
    let mut failed = 0;
    for result in &results {
        if result.success {
            println!("✓ {} ({}ms)", result.scenario, result.duration_ms);
        } else {
            failed += 1;
            println!("✗ {} ({}ms)", result.scenario, result.duration_ms);
            if let Some(ref error) = result.error {
                println!("  Error: {}", error);
            }
            if let Some(ref screenshot) = result.screenshot {
                println!("  Screenshot: {}", screenshot);
            }
        }
        if result.retries > 0 {
            println!("  Retries: {}", result.retries);
        }
    }

    println!();
    if failed == 0 {
        println!("✓ Success");
    } else {
        println!("✗ Failed ({}/{} scenarios)", failed, results.len());
        std::process::exit(1);
    }

    Ok(())
}
