mod display;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use clausecheck_ai::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, GroqClient, GroqConfig, InvokeError, Invoker, RetryPolicy,
};
use clausecheck_core::{ComplianceReport, DocumentKind, extract_text};
use clausecheck_store::{GuideStore, SampleCatalogue};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Upload limit carried over from the web service.
const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

// sysexits(3)
const EX_DATAERR: u8 = 65;
const EX_TEMPFAIL: u8 = 75;
const EX_CONFIG: u8 = 78;

#[derive(Parser)]
#[command(name = "clausecheck", version, about = "Check employment contracts against country regulations")]
struct Cli {
    /// Directory containing `country-guides/` and `sample-contracts/`.
    #[arg(long, env = "CLAUSECHECK_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a contract (PDF, DOCX or TXT) for compliance.
    Analyze(AnalyzeArgs),
    /// List available country guides.
    Countries,
    /// Print one country guide as JSON.
    Country { code: String },
    /// List bundled sample contracts.
    Samples,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Contract file to analyze.
    file: PathBuf,

    /// Target country code, e.g. `germany`, `uk`, `usa`.
    #[arg(short, long)]
    country: String,

    /// Print the JSON envelope instead of the report card.
    #[arg(long)]
    json: bool,

    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, env = "CLAUSECHECK_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, env = "CLAUSECHECK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request transport timeout.
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// Upper bound on the whole analysis, including rate-limit retries.
    #[arg(long)]
    deadline_secs: Option<u64>,

    #[arg(long, default_value_t = RetryPolicy::default().max_retries)]
    max_retries: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisResponse<'a> {
    success: bool,
    file_name: &'a str,
    country_code: String,
    country_name: &'a str,
    /// ISO 8601 timestamp string.
    analyzed_at: String,
    analysis: &'a ComplianceReport,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("clausecheck v{}", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Analyze(args) => analyze(&cli.data_dir, args).await,
        Command::Countries => {
            let store = GuideStore::open(&cli.data_dir.join("country-guides"))?;
            display::print_countries(&store.list()?);
            Ok(())
        }
        Command::Country { code } => {
            let store = GuideStore::open(&cli.data_dir.join("country-guides"))?;
            let profile = store.get(&code)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
            Ok(())
        }
        Command::Samples => {
            let samples = SampleCatalogue::list(&cli.data_dir.join("sample-contracts"))?;
            display::print_samples(&samples);
            Ok(())
        }
    }
}

async fn analyze(data_dir: &Path, args: AnalyzeArgs) -> anyhow::Result<()> {
    let store = GuideStore::open(&data_dir.join("country-guides"))?;
    let profile = store.get(&args.country)?;

    let kind = DocumentKind::from_path(&args.file).ok_or_else(|| {
        anyhow!(
            "Invalid file type for {}. Allowed: PDF, DOCX, TXT",
            args.file.display()
        )
    })?;
    let size = std::fs::metadata(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?
        .len();
    if size > MAX_DOCUMENT_BYTES {
        bail!(
            "{} is {size} bytes; the limit is {MAX_DOCUMENT_BYTES}",
            args.file.display()
        );
    }

    let file_name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    info!(file = file_name, "parsing document");
    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;
    let text = extract_text(&bytes, kind.mime())?;

    let config = GroqConfig {
        model: args.model,
        base_url: args.base_url,
        timeout: Duration::from_secs(args.timeout_secs),
        ..GroqConfig::new(args.api_key)
    };
    let client = GroqClient::new(config).context("building HTTP client")?;
    let invoker = Invoker::new(client).with_policy(RetryPolicy {
        max_retries: args.max_retries,
        ..RetryPolicy::default()
    });

    let country_code = args.country.to_uppercase();
    info!(
        country = %country_code,
        model = invoker.client().model(),
        max_retries = invoker.policy().max_retries,
        "analyzing compliance"
    );
    let analysis = invoker.analyze(&text, &profile);
    let result = match args.deadline_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), analysis)
            .await
            .map_err(|_| anyhow!("analysis did not finish within {secs}s"))?,
        None => analysis.await,
    };
    let report = result.inspect_err(|e| {
        if let InvokeError::MalformedResponse { raw, .. } = e {
            debug!(raw = %raw, "raw model payload");
        }
    })?;

    if args.json {
        let response = AnalysisResponse {
            success: true,
            file_name,
            country_code,
            country_name: &profile.name,
            analyzed_at: chrono::Utc::now().to_rfc3339(),
            analysis: &report,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        display::print_report(file_name, &profile.name, &report);
    }
    Ok(())
}

/// Map invoke failures to sysexits codes; everything else exits with 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<InvokeError>() {
        Some(InvokeError::RateLimitExhausted { .. }) => EX_TEMPFAIL,
        Some(InvokeError::Upstream(_)) => EX_CONFIG,
        Some(InvokeError::MalformedResponse { .. }) => EX_DATAERR,
        None => 1,
    }
}
