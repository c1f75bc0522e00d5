//! Setu CLI - Command-line interface for Shiksha Setu
//!
//! Commands:
//! - score: Score face-mesh frames into engagement metrics
//! - translate: Look up a UI string
//! - language: Show or change the saved language
//! - run: Execute a source file in the playground
//! - ask: Ask the tutor a question
//! - doctor: Diagnose configuration and storage

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use shiksha_setu::compiler::{CompilerService, Language};
use shiksha_setu::engagement::{EngagementAggregator, EngagementMetrics, EngagementMonitor, Frame};
use shiksha_setu::locale::catalog;
use shiksha_setu::tutor::{TutorResponder, TutorSession};
use shiksha_setu::{
    translate, JsonFileStore, KeyValueStore, LanguageContext, Locale, SetuConfig, SetuError,
    SETU_VERSION,
};

/// Setu - Core engine for the Shiksha Setu learning platform
#[derive(Parser)]
#[command(name = "setu")]
#[command(version = SETU_VERSION)]
#[command(about = "Engagement scoring, bilingual lookup and playground tools", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "setu.json")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score face-mesh frames (NDJSON) into engagement metrics
    Score {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Print a session summary after the metrics
        #[arg(long)]
        summary: bool,

        /// Load engagement history from file
        #[arg(long)]
        load_history: Option<PathBuf>,

        /// Save engagement history to file after processing
        #[arg(long)]
        save_history: Option<PathBuf>,
    },

    /// Look up a UI string
    Translate {
        /// Catalog key, e.g. "greeting"
        key: String,

        /// Locale code; defaults to the saved language
        #[arg(short, long)]
        locale: Option<String>,
    },

    /// Show or change the saved language
    Language {
        #[command(subcommand)]
        action: LanguageAction,
    },

    /// Execute a source file
    Run {
        /// Source file
        file: PathBuf,

        /// Language name; guessed from the file extension when omitted
        #[arg(short, long)]
        language: Option<String>,

        /// File to feed as stdin
        #[arg(long)]
        stdin: Option<PathBuf>,
    },

    /// Ask the tutor a question
    Ask {
        /// Question text
        message: String,

        /// Locale code; defaults to the saved language
        #[arg(short, long)]
        locale: Option<String>,

        /// Rule set used for local replies
        #[arg(long, default_value = "web")]
        rules: RuleSet,
    },

    /// Diagnose configuration and storage
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum LanguageAction {
    /// Print the saved language
    Get,
    /// Save a new language
    Set {
        /// Locale code (en, hi, pa)
        code: String,
    },
    /// List supported languages
    List,
}

#[derive(Clone, ValueEnum)]
enum RuleSet {
    /// Bilingual subject rules from the web tutor
    Web,
    /// Hindi subject rules from the mobile tutor
    Mobile,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one metrics record per line)
    Ndjson,
    /// JSON array of metrics records
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), SetuCliError> {
    let config = SetuConfig::load_from_file(&cli.config)?.apply_env();

    match cli.command {
        Commands::Score {
            input,
            output,
            output_format,
            summary,
            load_history,
            save_history,
        } => cmd_score(
            &config,
            &input,
            &output,
            output_format,
            summary,
            load_history.as_deref(),
            save_history.as_deref(),
        ),

        Commands::Translate { key, locale } => cmd_translate(&config, &key, locale.as_deref()),

        Commands::Language { action } => cmd_language(&config, action),

        Commands::Run {
            file,
            language,
            stdin,
        } => cmd_run(&config, &file, language.as_deref(), stdin.as_deref()),

        Commands::Ask {
            message,
            locale,
            rules,
        } => cmd_ask(&config, &message, locale.as_deref(), rules),

        Commands::Doctor { json } => cmd_doctor(&config, &cli.config, json),
    }
}

fn cmd_score(
    config: &SetuConfig,
    input: &Path,
    output: &Path,
    output_format: OutputFormat,
    summary: bool,
    load_history: Option<&Path>,
    save_history: Option<&Path>,
) -> Result<(), SetuCliError> {
    let aggregator = match load_history {
        Some(path) => EngagementAggregator::from_json(&fs::read_to_string(path)?)?,
        None => EngagementAggregator::new(config.history_capacity),
    };
    let mut monitor =
        EngagementMonitor::with_aggregator(aggregator).with_average_window(config.average_window());

    let reader: Box<dyn BufRead> = if input.to_string_lossy() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(fs::File::open(input)?))
    };

    // Frames are scored one at a time, in order
    let mut metrics: Vec<EngagementMetrics> = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let frame: Frame = serde_json::from_str(trimmed).map_err(|e| {
            SetuCliError::ParseError(format!("Failed to parse frame on line {}: {}", index + 1, e))
        })?;
        metrics.push(monitor.process_frame(&frame));
    }

    if metrics.is_empty() {
        return Err(SetuCliError::NoFrames);
    }

    let mut output_data = format_output(&metrics, &output_format)?;
    if summary {
        output_data.push_str(&serde_json::to_string(&monitor.summary())?);
        output_data.push('\n');
    }

    if output.to_string_lossy() == "-" {
        let mut stdout = io::stdout();
        write!(stdout, "{}", output_data)?;
        stdout.flush()?;
    } else {
        fs::write(output, output_data)?;
    }

    if let Some(path) = save_history {
        fs::write(path, monitor.save_history()?)?;
    }

    Ok(())
}

fn cmd_translate(
    config: &SetuConfig,
    key: &str,
    locale: Option<&str>,
) -> Result<(), SetuCliError> {
    let locale = resolve_locale(config, locale)?;
    println!("{}", translate(key, locale));
    Ok(())
}

fn cmd_language(config: &SetuConfig, action: LanguageAction) -> Result<(), SetuCliError> {
    match action {
        LanguageAction::Get => {
            let context = language_context(config);
            let locale = context.locale();
            println!("{} ({})", locale.code(), locale.native_name());
        }
        LanguageAction::Set { code } => {
            let mut context = language_context(config);
            context.set_language_code(&code)?;
            let locale = context.locale();
            println!("{} ({})", locale.code(), locale.native_name());
        }
        LanguageAction::List => {
            for locale in Locale::ALL {
                let strings = catalog::keys(locale).len();
                println!("{}\t{}\t{} strings", locale.code(), locale.native_name(), strings);
            }
        }
    }
    Ok(())
}

fn cmd_run(
    config: &SetuConfig,
    file: &Path,
    language: Option<&str>,
    stdin: Option<&Path>,
) -> Result<(), SetuCliError> {
    let code = fs::read_to_string(file)?;
    let language = match language {
        Some(name) => name.to_string(),
        None => file
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Language::from_extension)
            .map(|l| l.as_str().to_string())
            .ok_or_else(|| {
                SetuCliError::ParseError(format!(
                    "Cannot infer language from {}",
                    file.display()
                ))
            })?,
    };
    let input = match stdin {
        Some(path) => Some(fs::read_to_string(path)?),
        None => None,
    };

    // No remote client ships with the CLI, so execution always takes the local path
    let service = CompilerService::from_config(None, &config.compiler);
    let result = service.execute(&code, &language, input.as_deref());
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn cmd_ask(
    config: &SetuConfig,
    message: &str,
    locale: Option<&str>,
    rules: RuleSet,
) -> Result<(), SetuCliError> {
    let locale = resolve_locale(config, locale)?;
    let responder = match rules {
        RuleSet::Web => TutorResponder::builtin(),
        RuleSet::Mobile => TutorResponder::mobile(),
    };
    let mut session = TutorSession::new().with_responder(responder);
    match session.ask(message, locale) {
        Some(reply) => {
            if reply.fallback {
                println!("[demo] {}", reply.text);
            } else {
                println!("{}", reply.text);
            }
            Ok(())
        }
        None => Err(SetuCliError::ParseError("Message is empty".to_string())),
    }
}

fn cmd_doctor(config: &SetuConfig, config_path: &Path, json: bool) -> Result<(), SetuCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "setu_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Setu version {}", SETU_VERSION),
    });

    checks.push(if config_path.exists() {
        DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: format!("Loaded {}", config_path.display()),
        }
    } else {
        DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: format!("{} not found, using defaults", config_path.display()),
        }
    });

    let store = JsonFileStore::new(&config.store_path);
    checks.push(match store.read(shiksha_setu::locale::LANGUAGE_KEY) {
        Ok(Some(code)) => DoctorCheck {
            name: "store".to_string(),
            status: CheckStatus::Ok,
            message: format!("Saved language: {}", code),
        },
        Ok(None) => DoctorCheck {
            name: "store".to_string(),
            status: CheckStatus::Ok,
            message: "No saved language, default will be used".to_string(),
        },
        Err(e) => DoctorCheck {
            name: "store".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        },
    });

    checks.push(match config.compiler.api_key {
        Some(_) => DoctorCheck {
            name: "compiler".to_string(),
            status: CheckStatus::Warning,
            message: "API key set, but the CLI has no remote client; using fallback execution"
                .to_string(),
        },
        None => DoctorCheck {
            name: "compiler".to_string(),
            status: CheckStatus::Ok,
            message: "Fallback execution (no API key)".to_string(),
        },
    });

    checks.push(DoctorCheck {
        name: "stdin".to_string(),
        status: CheckStatus::Ok,
        message: if atty::is(atty::Stream::Stdin) {
            "stdin is a TTY (interactive mode)".to_string()
        } else {
            "stdin is a pipe (ready for frames)".to_string()
        },
    });

    let report = DoctorReport {
        version: SETU_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Setu Doctor Report");
        println!("==================");
        println!("Version: {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(SetuCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn language_context(config: &SetuConfig) -> LanguageContext<JsonFileStore> {
    LanguageContext::load_with_default(JsonFileStore::new(&config.store_path), config.default_locale)
}

fn resolve_locale(config: &SetuConfig, code: Option<&str>) -> Result<Locale, SetuCliError> {
    match code {
        Some(code) => Ok(code.parse::<Locale>()?),
        None => Ok(language_context(config).locale()),
    }
}

fn format_output(
    metrics: &[EngagementMetrics],
    format: &OutputFormat,
) -> Result<String, SetuCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for record in metrics {
                lines.push(serde_json::to_string(record)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(metrics)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(metrics)? + "\n"),
    }
}

// Error handling

enum SetuCliError {
    Io(io::Error),
    Setu(SetuError),
    Json(serde_json::Error),
    NoFrames,
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for SetuCliError {
    fn from(e: io::Error) -> Self {
        SetuCliError::Io(e)
    }
}

impl From<SetuError> for SetuCliError {
    fn from(e: SetuError) -> Self {
        SetuCliError::Setu(e)
    }
}

impl From<serde_json::Error> for SetuCliError {
    fn from(e: serde_json::Error) -> Self {
        SetuCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SetuCliError> for CliError {
    fn from(e: SetuCliError) -> Self {
        match e {
            SetuCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SetuCliError::Setu(e) => {
                let (code, hint) = match &e {
                    SetuError::Config(_) => ("CONFIG_ERROR", "Check setu.json"),
                    SetuError::UnsupportedLocale(_) => {
                        ("UNSUPPORTED_LOCALE", "Run 'setu language list'")
                    }
                    SetuError::StorageUnavailable(_) => {
                        ("STORAGE_UNAVAILABLE", "Check storePath in setu.json")
                    }
                    _ => ("SETU_ERROR", "Run 'setu doctor' for details"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            SetuCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            SetuCliError::NoFrames => CliError {
                code: "NO_FRAMES".to_string(),
                message: "No frames found in input".to_string(),
                hint: Some("Provide one frame JSON object per line".to_string()),
            },
            SetuCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            SetuCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
