//! `openapi-to-mcp`: convert `OpenAPI` / Swagger documents into MCP tool definitions.

mod config;
mod source;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::CliConfig;
use mcp_openapi_tools::{BuiltinDelegate, OpenApiToolConverter, ToolGenerationResult};
use owo_colors::{OwoColorize as _, Stream};
use source::{DEFAULT_MAX_SPEC_BYTES, HashPolicy, SpecSource};
use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "openapi-to-mcp")]
#[command(version, about = "Convert OpenAPI 3.x / Swagger 2.0 documents into MCP tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: `$XDG_CONFIG_HOME/mcp-openapi-tools/config.json`)
    #[arg(long, global = true, env = "OPENAPI_TO_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `mcp_openapi_tools=trace` (overrides `RUST_LOG`)
    #[arg(long, global = true, env = "OPENAPI_TO_MCP_LOG")]
    log_level: Option<String>,

    /// Log output format (always written to stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a spec and print the tool list with errors as JSON
    #[command(after_help = "EXAMPLES:\n  \
        openapi-to-mcp convert --spec petstore.yaml --pretty\n  \
        curl -s https://example.com/openapi.json | openapi-to-mcp convert --spec -")]
    Convert {
        #[command(flatten)]
        spec: SpecArgs,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Write the JSON output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a spec and report errors; exits with 1 on fatal errors
    Check {
        #[command(flatten)]
        spec: SpecArgs,
    },
}

#[derive(Args)]
struct SpecArgs {
    /// Spec location: file path, http(s) URL, or `-` for stdin
    #[arg(short, long)]
    spec: String,

    /// Expected `sha256:<hex>` digest of the spec
    #[arg(long, env = "OPENAPI_TO_MCP_SPEC_HASH")]
    spec_hash: Option<String>,

    /// What to do when the digest does not match
    #[arg(long, value_enum, default_value_t = HashPolicy::Warn)]
    hash_policy: HashPolicy,

    /// Refuse specs larger than this many bytes
    #[arg(long, default_value_t = DEFAULT_MAX_SPEC_BYTES)]
    max_spec_bytes: usize,

    /// Seed tool annotations from HTTP method semantics
    #[arg(long)]
    infer_annotations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref(), cli.log_format);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!(
                "{} {e:#}",
                "error:".if_supports_color(Stream::Stderr, |t| t.red().bold().to_string())
            );
            ExitCode::from(2)
        }
    }
}

fn init_tracing(level: Option<&str>, format: LogFormat) {
    let filter = level
        .and_then(|l| EnvFilter::try_new(l).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let cfg = config::load_config(&config_path)?;

    match cli.command {
        Command::Convert {
            spec,
            pretty,
            output,
        } => {
            let result = convert(&spec, &cfg).await?;
            let json = if pretty || cfg.pretty {
                serde_json::to_string_pretty(&result)
            } else {
                serde_json::to_string(&result)
            }
            .context("serialize conversion result")?;

            match output {
                Some(path) => std::fs::write(&path, format!("{json}\n"))
                    .with_context(|| format!("write output {}", path.display()))?,
                None => {
                    let mut stdout = std::io::stdout().lock();
                    writeln!(stdout, "{json}").context("write to stdout")?;
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { spec } => {
            let result = convert(&spec, &cfg).await?;
            print_report(&result);
            if result.has_fatal_errors() {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

async fn convert(args: &SpecArgs, cfg: &CliConfig) -> anyhow::Result<ToolGenerationResult> {
    let source = SpecSource::parse(&args.spec)?;
    let text = source.read(args.max_spec_bytes).await?;

    if let Some(expected) = &args.spec_hash {
        source::verify_hash(&text, expected, args.hash_policy)
            .with_context(|| format!("verify {source}"))?;
    }

    let mut options = cfg.convert.clone();
    options.infer_annotations |= args.infer_annotations;

    let converter = OpenApiToolConverter::new(BuiltinDelegate, options);
    let result = converter.convert(&text).await;
    tracing::info!(
        source = %source,
        tools = result.result.len(),
        errors = result.errors.len(),
        "conversion finished"
    );
    Ok(result)
}

fn print_report(result: &ToolGenerationResult) {
    for err in &result.errors {
        let label = if err.key.is_fatal() {
            "error"
                .if_supports_color(Stream::Stdout, |t| t.red().bold().to_string())
                .to_string()
        } else {
            "warning"
                .if_supports_color(Stream::Stdout, |t| t.yellow().bold().to_string())
                .to_string()
        };
        println!("{label} [{}] {}", err.key, err.message);
    }
    let mark = if result.has_fatal_errors() {
        "✗".if_supports_color(Stream::Stdout, |t| t.red().to_string())
            .to_string()
    } else {
        "✓".if_supports_color(Stream::Stdout, |t| t.green().to_string())
            .to_string()
    };
    println!(
        "{mark} {} tool(s), {} error(s)",
        result.result.len(),
        result.errors.len()
    );
}
