//! DevGuardian - AI-powered code analysis orchestrator
//!
//! A CLI tool that coordinates security, quality, devops,
//! documentation, compliance, and learning agents against local
//! source code, with an Ollama model doing the reasoning behind
//! each category.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, invalid input, etc.)
//!   2 - Overall score below the --fail-under threshold

mod agents;
mod cli;
mod config;
mod error;
mod llm;
mod models;
mod orchestrator;
mod report;
mod scanner;

use anyhow::{Context, Result};
use cli::{Cli, Command, ComplianceArgs, FixArgs, OutputFormat, PipelineArgs, ScanArgs};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::{CodeUnit, Issue, ScanReport};
use orchestrator::{Orchestrator, OrchestratorConfig, ScanOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Validate arguments
    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(cli.command, Command::InitConfig) {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&cli);

    info!("DevGuardian v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", cli);

    match run(cli).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle init-config: generate a default .devguardian.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(".devguardian.toml");

    if path.exists() {
        eprintln!("⚠️  .devguardian.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .devguardian.toml")?;

    println!("✅ Created .devguardian.toml with default settings.");
    println!("   Edit it to customize model, agents, excludes, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(cli: &Cli) {
    let level = cli.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the requested command. Returns the exit code (0 or 2).
async fn run(cli: Cli) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&cli)?;
    config.merge_with_args(&cli);

    let orchestrator = build_orchestrator(&config);

    println!("🤖 Initializing agents...");
    println!("   Model: {}", config.model.name);
    println!("   Ollama: {}", config.model.ollama_url);
    orchestrator.initialize().await?;

    let exit_code = match cli.command {
        Command::Scan(ref args) => run_scan(&orchestrator, &config, args).await?,
        Command::Fix(ref args) => run_fix(&orchestrator, &config, args).await?,
        Command::Pipeline(ref args) => run_pipeline(&orchestrator, args).await?,
        Command::Compliance(ref args) => run_compliance(&orchestrator, args).await?,
        // Handled in main before logging was set up.
        Command::InitConfig => 0,
    };

    orchestrator.shutdown().await?;
    Ok(exit_code)
}

/// Build the orchestrator over the default agent registry.
fn build_orchestrator(config: &Config) -> Orchestrator {
    let client: Arc<dyn llm::TextGenerator> =
        Arc::new(llm::OllamaClient::new(config.model.llm_config()));
    let registry = agents::default_registry(client);

    Orchestrator::new(
        registry,
        OrchestratorConfig {
            agent_timeout: Duration::from_secs(config.scan.agent_timeout_seconds),
            fix_concurrency: config.fix.concurrency,
        },
    )
}

/// Run the scan workflow against a file or directory.
async fn run_scan(
    orchestrator: &Orchestrator,
    config: &Config,
    args: &ScanArgs,
) -> Result<i32> {
    let started = Instant::now();
    let agents = args
        .agents
        .clone()
        .unwrap_or_else(|| config.scan.default_agents.clone());

    let units = collect_units(&args.path, config)?;
    if units.is_empty() {
        anyhow::bail!("No matching source files under {}", args.path.display());
    }

    println!(
        "\n🔍 Scanning {} file(s) with agents: {}",
        units.len(),
        agents.join(", ")
    );

    // Ctrl-C aborts pending categories but keeps completed results.
    let token = CancellationToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });
    }
    let options = ScanOptions {
        agent_timeout: None,
        cancellation: Some(token.clone()),
    };

    let progress = (units.len() > 1).then(|| scan_progress(units.len() as u64));
    let mut reports: Vec<ScanReport> = Vec::with_capacity(units.len());
    for unit in &units {
        if let Some(ref pb) = progress {
            pb.set_message(unit.filepath.clone().unwrap_or_default());
        }
        let scan_report = orchestrator
            .execute_scan(unit, &agents, options.clone())
            .await?;
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
        reports.push(scan_report);

        if token.is_cancelled() {
            warn!("Scan cancelled, keeping {} completed report(s)", reports.len());
            break;
        }
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let score = report::average_score(&reports);
    print_scan_summary(&reports, score, started.elapsed().as_secs_f64());

    let content = match (args.format, reports.len()) {
        (OutputFormat::Json, 1) => report::generate_json(&reports[0])?,
        (OutputFormat::Json, _) => report::generate_json(&reports)?,
        (OutputFormat::Markdown, 1) => report::generate_scan_markdown(&reports[0]),
        (OutputFormat::Markdown, _) => report::generate_scan_set_markdown(&reports),
    };
    let output = output_path(args.output.as_deref(), config);
    std::fs::write(&output, &content)
        .with_context(|| format!("Failed to write report to {}", output.display()))?;
    println!("\n✅ Report saved to: {}", output.display());

    if let Some(threshold) = args.fail_under {
        if score < threshold {
            eprintln!(
                "\n⛔ Overall score {} is below the {} threshold. Failing (exit code 2).",
                score, threshold
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Run the fix workflow against one file and an issues list.
async fn run_fix(orchestrator: &Orchestrator, config: &Config, args: &FixArgs) -> Result<i32> {
    let unit = scanner::read_unit(&args.path)?;
    let issues = load_issues(&args.issues)?;

    println!(
        "\n🔧 Generating fixes for {} issue(s) in {}",
        issues.len(),
        args.path.display()
    );

    let fix_report = orchestrator.execute_auto_fix(&unit, &issues).await?;

    println!("\n📊 Fix Summary:");
    println!(
        "   Fixed: {}/{}",
        fix_report.fixed_issues, fix_report.total_issues
    );
    for outcome in &fix_report.fixes {
        match outcome.error {
            Some(ref error) => println!("   ❌ {}: {}", outcome.issue_id, error),
            None => println!("   ✅ {}", outcome.issue_id),
        }
    }

    let content = match args.format {
        OutputFormat::Json => report::generate_json(&fix_report)?,
        OutputFormat::Markdown => report::generate_fix_markdown(&fix_report),
    };
    let output = output_path(args.output.as_deref(), config);
    std::fs::write(&output, &content)
        .with_context(|| format!("Failed to write report to {}", output.display()))?;
    println!("\n✅ Report saved to: {}", output.display());

    Ok(0)
}

/// Run pipeline generation through the devops agent.
async fn run_pipeline(orchestrator: &Orchestrator, args: &PipelineArgs) -> Result<i32> {
    let spec = agents::PipelineSpec {
        language: args.language.clone(),
        framework: args.framework.clone(),
        platform: args.platform.clone(),
        deploy_target: args.deploy_target.clone(),
    };

    println!(
        "\n🚀 Generating a {} pipeline for {} ({})",
        spec.platform, spec.language, spec.framework
    );

    let payload = orchestrator.generate_pipeline(&spec).await?;

    match args.output {
        Some(ref output) => {
            // Prefer the raw pipeline text when the model provided one.
            let content = match payload
                .get("pipeline_config")
                .and_then(serde_json::Value::as_str)
            {
                Some(text) => text.to_string(),
                None => report::generate_json(&payload)?,
            };
            std::fs::write(output, &content)
                .with_context(|| format!("Failed to write pipeline to {}", output.display()))?;
            println!("\n✅ Pipeline saved to: {}", output.display());
        }
        None => println!("\n{}", report::generate_json(&payload)?),
    }

    Ok(0)
}

/// Run a standards check through the compliance agent.
async fn run_compliance(orchestrator: &Orchestrator, args: &ComplianceArgs) -> Result<i32> {
    let unit = scanner::read_unit(&args.path)?;
    let standards = args.standards.clone().unwrap_or_default();

    println!("\n📋 Checking {} for compliance", args.path.display());

    let payload = orchestrator.check_compliance(&unit, &standards).await?;

    if let Some(compliant) = payload.get("compliant").and_then(serde_json::Value::as_bool) {
        if compliant {
            println!("   ✅ Compliant");
        } else {
            let violations = payload
                .get("violations")
                .and_then(serde_json::Value::as_array)
                .map_or(0, Vec::len);
            println!("   ❌ {} violation(s) found", violations);
        }
    }

    match args.output {
        Some(ref output) => {
            std::fs::write(output, report::generate_json(&payload)?)
                .with_context(|| format!("Failed to write result to {}", output.display()))?;
            println!("\n✅ Result saved to: {}", output.display());
        }
        None => println!("\n{}", report::generate_json(&payload)?),
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(cli: &Cli) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = cli.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded config from .devguardian.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

/// Build code units from a scan target, file or directory.
fn collect_units(path: &Path, config: &Config) -> Result<Vec<CodeUnit>> {
    if path.is_dir() {
        let file_scanner = scanner::FileScanner::new(
            path.to_path_buf(),
            scanner::ScanConfig::from(&config.scan),
        );
        file_scanner.collect_units()
    } else {
        Ok(vec![scanner::read_unit(path)?])
    }
}

/// Load the issues list for a fix run.
fn load_issues(path: &Path) -> Result<Vec<Issue>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read issues file: {}", path.display()))?;

    let issues: Vec<Issue> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse issues file: {}", path.display()))?;

    Ok(issues)
}

/// Resolve the report output path, CLI flag first, then config.
fn output_path(cli_output: Option<&Path>, config: &Config) -> PathBuf {
    match cli_output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(&config.report.output),
    }
}

/// Progress bar for multi-file scans.
fn scan_progress(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

/// Print the scan outcome to stdout.
fn print_scan_summary(reports: &[ScanReport], score: u8, duration: f64) {
    println!("\n📊 Scan Summary:");
    println!("   Overall score: {}/100", score);

    if let [single] = reports {
        for (kind, result) in &single.agents {
            match result.score {
                Some(s) if result.status.is_success() => println!(
                    "   {} {}: {:.0} ({}ms)",
                    kind.emoji(),
                    kind,
                    s,
                    result.duration_ms
                ),
                _ if result.status.is_success() => println!(
                    "   {} {}: ok ({}ms)",
                    kind.emoji(),
                    kind,
                    result.duration_ms
                ),
                _ => println!(
                    "   {} {}: ❌ {}",
                    kind.emoji(),
                    kind,
                    result.error.as_deref().unwrap_or("failed")
                ),
            }
        }
        if !single.unknown_agents.is_empty() {
            println!(
                "   ⚠️ Unknown agents skipped: {}",
                single.unknown_agents.join(", ")
            );
        }
    } else {
        for scan_report in reports {
            println!(
                "   📄 {}: {}/100 ({}/{} agents ok)",
                scan_report.filepath.as_deref().unwrap_or("(inline)"),
                scan_report.overall_score,
                scan_report.success_count(),
                scan_report.agents.len()
            );
        }
    }
    println!("   Duration: {:.1}s", duration);
}
