//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DevGuardian - AI-powered code analysis orchestrator
///
/// Run security, quality, devops, documentation, compliance, and
/// learning agents against local source code using an Ollama model.
/// Markdown/JSON reports. Built in Rust.
///
/// Examples:
///   devguardian scan src/
///   devguardian scan app.py --agents security,quality,compliance
///   devguardian fix app.py --issues issues.json
///   devguardian pipeline --language rust --framework axum
///   devguardian compliance app.py --standards SOC2,HIPAA
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Ollama model to use for analysis
    ///
    /// Recommended models: llama3.2:latest, codellama:34b, qwen2.5-coder:32b.
    /// Can also be set via DEVGUARDIAN_MODEL env var or .devguardian.toml config.
    #[arg(short, long, value_name = "NAME", env = "DEVGUARDIAN_MODEL", global = true)]
    pub model: Option<String>,

    /// Ollama API endpoint URL
    #[arg(long, value_name = "URL", env = "OLLAMA_URL", global = true)]
    pub ollama_url: Option<String>,

    /// Request timeout in seconds for each model call
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .devguardian.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Analyze a file or directory
    Scan(ScanArgs),
    /// Generate fixes for previously reported issues
    Fix(FixArgs),
    /// Generate a CI/CD pipeline configuration
    Pipeline(PipelineArgs),
    /// Check code against compliance standards
    Compliance(ComplianceArgs),
    /// Write a default .devguardian.toml and exit
    InitConfig,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScanArgs {
    /// File or directory to analyze
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Agents to run (comma-separated)
    ///
    /// Values: security, quality, devops, documentation, compliance, learning.
    /// Defaults to the [scan] section of .devguardian.toml.
    #[arg(short, long, value_name = "AGENTS", value_delimiter = ',')]
    pub agents: Option<Vec<String>>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Fail when the overall score is below this threshold
    ///
    /// Useful for CI pipelines. Exit code 2 when the threshold is breached.
    #[arg(long, value_name = "SCORE")]
    pub fail_under: Option<u8>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct FixArgs {
    /// File the issues were reported against
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// JSON file with the issues to fix
    ///
    /// An array of {id, agent, type, severity, description} objects,
    /// as produced by a previous scan payload.
    #[arg(short, long, value_name = "FILE")]
    pub issues: PathBuf,

    /// Output file path for the fix report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Language of the project the pipeline builds
    #[arg(short, long, value_name = "LANG")]
    pub language: String,

    /// Framework of the project
    #[arg(short, long, value_name = "NAME")]
    pub framework: String,

    /// CI platform to target
    #[arg(long, value_name = "NAME", default_value = "github")]
    pub platform: String,

    /// Deployment target
    #[arg(long, value_name = "NAME", default_value = "aws")]
    pub deploy_target: String,

    /// Write the pipeline configuration to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ComplianceArgs {
    /// File to check
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Standards to check against (comma-separated)
    ///
    /// Defaults to SOC2 and GDPR.
    #[arg(short, long, value_name = "STANDARDS", value_delimiter = ',')]
    pub standards: Option<Vec<String>>,

    /// Write the compliance result to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref url) = self.ollama_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Command::Scan(ref args) = self.command {
            if let Some(threshold) = args.fail_under {
                if threshold > 100 {
                    return Err("--fail-under must be between 0 and 100".to_string());
                }
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_scan_defaults() {
        let cli = parse(&["devguardian", "scan", "src/"]);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan command");
        };
        assert_eq!(args.path, PathBuf::from("src/"));
        assert!(args.agents.is_none());
        assert_eq!(args.format, OutputFormat::Markdown);
        assert!(args.fail_under.is_none());
    }

    #[test]
    fn test_agent_list_parsing() {
        let cli = parse(&[
            "devguardian",
            "scan",
            "app.py",
            "--agents",
            "security,quality,compliance",
        ]);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan command");
        };
        assert_eq!(
            args.agents,
            Some(vec![
                "security".to_string(),
                "quality".to_string(),
                "compliance".to_string()
            ])
        );
    }

    #[test]
    fn test_pipeline_defaults() {
        let cli = parse(&[
            "devguardian",
            "pipeline",
            "--language",
            "rust",
            "--framework",
            "axum",
        ]);
        let Command::Pipeline(args) = cli.command else {
            panic!("expected pipeline command");
        };
        assert_eq!(args.platform, "github");
        assert_eq!(args.deploy_target, "aws");
    }

    #[test]
    fn test_fix_requires_issues_file() {
        assert!(Cli::try_parse_from(["devguardian", "fix", "app.py"]).is_err());
    }

    #[test]
    fn test_validation_conflicting_verbosity() {
        let cli = parse(&["devguardian", "-v", "-q", "scan", "src/"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_validation_fail_under_range() {
        let cli = parse(&["devguardian", "scan", "src/", "--fail-under", "150"]);
        assert!(cli.validate().is_err());

        let cli = parse(&["devguardian", "scan", "src/", "--fail-under", "80"]);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_validation_bad_ollama_url() {
        let cli = parse(&["devguardian", "--ollama-url", "localhost:11434", "scan", "x"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let cli = parse(&["devguardian", "scan", "src/"]);
        assert_eq!(cli.log_level(), tracing::Level::INFO);

        let cli = parse(&["devguardian", "-v", "scan", "src/"]);
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);

        let cli = parse(&["devguardian", "-q", "scan", "src/"]);
        assert_eq!(cli.log_level(), tracing::Level::ERROR);
    }
}
