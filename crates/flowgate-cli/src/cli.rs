//! Command-line interface for the flowgate utility
//!
//! Provides a CLI to normalize, audit, and gate BPMN 2.0 diagram files.

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use flowgate::checklist::{run_checklist, ChecklistStatus};
use flowgate::core::logging::init_logging;
use flowgate::diff::unified_diff;
use flowgate::extract::{extract_di, extract_graph};
use flowgate::lint::run_lint;
use flowgate::patterns::check_patterns;
use flowgate::schema::validate_schema;
use flowgate::{audit_document, normalize_document, BpmnDoc, NamespaceTable, Severity};

/// Flowgate - Validate and auto-correct BPMN 2.0 diagrams
#[derive(Parser)]
#[command(name = "flowgate")]
#[command(about = "A Rust utility to validate and auto-correct BPMN 2.0 diagrams")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize and audit a batch of BPMN files
    Batch {
        /// Rewrite non-canonical shape sizes in place
        #[arg(long)]
        fix: bool,

        /// Report structural audit issues
        #[arg(long)]
        audit: bool,

        /// Print a unified diff of the normalization (dry run unless --fix)
        #[arg(long)]
        diff: bool,

        /// BPMN files or glob patterns to process
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Run the full validation gate over one BPMN file
    Check {
        /// BPMN file to validate
        file: PathBuf,
    },
}

/// One finding in the check report
struct Finding {
    rule: String,
    message: String,
    node_id: Option<String>,
}

impl Finding {
    fn new(rule: impl Into<String>, message: impl Into<String>, node_id: Option<String>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
            node_id,
        }
    }

    fn render(&self) -> String {
        match &self.node_id {
            Some(node) => format!(" - [{}] {} (node={})", self.rule, self.message, node),
            None => format!(" - [{}] {}", self.rule, self.message),
        }
    }
}

/// Main CLI application
pub struct FlowgateApp;

impl FlowgateApp {
    /// Create a new application instance
    pub fn new() -> Self {
        Self
    }

    /// Run the application with the given CLI arguments.
    ///
    /// Returns the process exit code: zero when the gate passes, one when
    /// any blocking finding was reported.
    pub fn run(&self, cli: Cli) -> Result<i32> {
        // Initialize logging with CLI flags (environment variables take precedence)
        let log_level_str = std::env::var("FLOWGATE_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("FLOWGATE_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        // Reinitialize logging with CLI/environment settings
        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Flowgate v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Batch {
                fix,
                audit,
                diff,
                files,
            } => self.batch_command(fix, audit, diff, &files, cli.verbose),
            Commands::Check { file } => self.check_command(&file, cli.verbose),
        }
    }

    /// Handle the batch command
    pub fn batch_command(
        &self,
        fix: bool,
        audit: bool,
        diff: bool,
        patterns: &[String],
        verbose: bool,
    ) -> Result<i32> {
        if !fix && !audit && !diff {
            bail!("choose at least one of --fix, --audit, or --diff");
        }

        let mut exit_code = 0;
        for pattern in patterns {
            for file in expand_pattern(pattern)? {
                if !file.exists() {
                    eprintln!("[skip] {} does not exist", file.display());
                    continue;
                }
                if verbose {
                    eprintln!("Processing {}", file.display());
                }
                if self.process_file(&file, fix, audit, diff)? {
                    exit_code = 1;
                }
            }
        }
        Ok(exit_code)
    }

    /// Process one file in batch mode. Returns true when audit issues were
    /// found.
    fn process_file(&self, file: &Path, fix: bool, audit: bool, diff: bool) -> Result<bool> {
        let xml = fs::read_to_string(file)
            .map_err(|e| anyhow!("Failed to read '{}': {}", file.display(), e))?;
        let mut doc = match BpmnDoc::parse(&xml) {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("[skip] {}: {}", file.display(), e);
                return Ok(false);
            }
        };

        if fix || diff {
            match normalize_document(&mut doc) {
                Ok(changes) if !changes.is_empty() => {
                    let out = doc.pretty(&NamespaceTable::standard(), 2)?;
                    if diff {
                        print!("{}", unified_diff(&xml, &out, &file.display().to_string()));
                    }
                    if fix {
                        fs::write(file, out)
                            .map_err(|e| anyhow!("Failed to write '{}': {}", file.display(), e))?;
                        println!(
                            "[fix] {}: {} shape(s) normalized",
                            file.display(),
                            changes.len()
                        );
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("[skip] {}: {}", file.display(), e);
                    return Ok(false);
                }
            }
        }

        if audit {
            match audit_document(&doc) {
                Ok(issues) if issues.is_empty() => {
                    println!("[ok] {}: no audit issues", file.display());
                }
                Ok(issues) => {
                    for issue in &issues {
                        match &issue.node_id {
                            Some(node) => println!(
                                "[issue] {} ({}): {} - {}",
                                file.display(),
                                node,
                                issue.rule_id,
                                issue.message
                            ),
                            None => println!(
                                "[issue] {}: {} - {}",
                                file.display(),
                                issue.rule_id,
                                issue.message
                            ),
                        }
                    }
                    return Ok(true);
                }
                Err(e) => {
                    eprintln!("[skip] {}: {}", file.display(), e);
                }
            }
        }

        Ok(false)
    }

    /// Handle the check command
    pub fn check_command(&self, file: &Path, verbose: bool) -> Result<i32> {
        if !file.exists() {
            eprintln!("File not found: {}", file.display());
            return Ok(1);
        }
        let xml = fs::read_to_string(file)
            .map_err(|e| anyhow!("Failed to read '{}': {}", file.display(), e))?;
        let doc = BpmnDoc::parse(&xml)?;

        if verbose {
            eprintln!("Checking {}", file.display());
        }

        let (errors, warnings) = gather_findings(&doc);

        if errors.is_empty() {
            println!("✅ No blocking errors.");
        } else {
            println!("❌ BPMN issues found:");
            for finding in &errors {
                println!("{}", finding.render());
            }
        }
        if !warnings.is_empty() {
            println!("⚠️  Warnings:");
            for finding in &warnings {
                println!("{}", finding.render());
            }
        }

        Ok(if errors.is_empty() { 0 } else { 1 })
    }
}

impl Default for FlowgateApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold every validation surface into error and warning finding lists.
///
/// Schema errors, error-severity lint issues, every pattern hit, and failed
/// checklist items block; warning-severity lint issues and checklist warns
/// are advisory.
fn gather_findings(doc: &BpmnDoc) -> (Vec<Finding>, Vec<Finding>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for e in validate_schema(doc).errors {
        errors.push(Finding::new(e.code, e.message, None));
    }

    match extract_graph(doc) {
        Ok(graph) => {
            let di = extract_di(doc);
            for issue in run_lint(&graph, di.as_ref()) {
                let finding = Finding::new(issue.rule_id, issue.message, issue.node_id);
                match issue.severity {
                    Severity::Error => errors.push(finding),
                    Severity::Warning | Severity::Info => warnings.push(finding),
                }
            }
            for hit in check_patterns(&graph, di.as_ref()) {
                errors.push(Finding::new(hit.pattern_id, hit.message, hit.node_id));
            }
        }
        Err(e) => {
            errors.push(Finding::new("require-process", e.to_string(), None));
        }
    }

    for item in run_checklist(doc) {
        match item.status {
            ChecklistStatus::Fail => errors.push(Finding::new(item.id, item.message, None)),
            ChecklistStatus::Warn => warnings.push(Finding::new(item.id, item.message, None)),
            ChecklistStatus::Pass => {}
        }
    }

    (errors, warnings)
}

/// Expand a CLI file argument into concrete paths.
///
/// Arguments containing glob metacharacters go through the glob crate;
/// everything else is taken as a literal path so missing files still get a
/// per-file skip message.
fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    if !pattern.contains(['*', '?', '[']) {
        return Ok(vec![PathBuf::from(pattern)]);
    }
    let mut paths = Vec::new();
    for entry in glob::glob(pattern).map_err(|e| anyhow!("Invalid pattern '{}': {}", pattern, e))? {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => eprintln!("[skip] {}: {}", e.path().display(), e.error()),
        }
    }
    Ok(paths)
}
