use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use clinsum::{
    load_documents, process_document, read_batch_artifact, run_benchmark, write_json_atomic,
    AuditLog, BatchArtifact, BatchConfig, BatchExecutor, ClinicalDocument, GeminiClient,
    GeminiConfig, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "clinsum")]
#[command(author, version, about = "Clinical transcript de-identification and summarization pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the four-stage pipeline over a single transcript
    Process {
        /// Input file containing the raw transcript text
        #[arg(short, long)]
        input: PathBuf,

        /// Audit log file (JSONL, one entry per stage invocation)
        #[arg(long, default_value = "logs/audit.jsonl")]
        audit_log: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Process a batch of documents under the request-rate ceiling
    Batch {
        /// Input rows file (JSON array or JSONL of {text, id?, source?})
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the batch artifact
        #[arg(short, long, default_value = "data/batch_results.json")]
        output: PathBuf,

        /// Maximum number of documents to process
        #[arg(long, default_value = "5")]
        limit: usize,

        /// Fixed delay between documents, seconds
        #[arg(long, default_value = "10")]
        delay_secs: u64,

        /// Extended cooldown after a rate-limit signal, seconds
        #[arg(long, default_value = "60")]
        cooldown_secs: u64,

        /// Audit log file (JSONL, one entry per stage invocation)
        #[arg(long, default_value = "logs/audit.jsonl")]
        audit_log: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compare a persisted batch run against the reference baselines
    Benchmark {
        /// Batch artifact produced by the batch subcommand
        #[arg(short, long, default_value = "data/batch_results.json")]
        input: PathBuf,

        /// Output file for the benchmark artifact
        #[arg(short, long, default_value = "data/benchmark_results.json")]
        output: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            audit_log,
            verbose,
        } => {
            setup_logging(verbose);
            process_single(input, audit_log).await
        }
        Commands::Batch {
            input,
            output,
            limit,
            delay_secs,
            cooldown_secs,
            audit_log,
            verbose,
        } => {
            setup_logging(verbose);
            run_batch(input, output, limit, delay_secs, cooldown_secs, audit_log).await
        }
        Commands::Benchmark {
            input,
            output,
            verbose,
        } => {
            setup_logging(verbose);
            benchmark(input, output)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn process_single(input: PathBuf, audit_log: PathBuf) -> Result<()> {
    let raw_text = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read transcript: {input:?}"))?;

    let client = GeminiClient::new(GeminiConfig::from_env()?);
    let mut audit = AuditLog::to_file(&audit_log)?;

    let document = ClinicalDocument::new(
        input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "0".to_string()),
        "file",
        raw_text,
    );

    let record =
        process_document(&client, &PipelineConfig::default(), &mut audit, &document).await;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn run_batch(
    input: PathBuf,
    output: PathBuf,
    limit: usize,
    delay_secs: u64,
    cooldown_secs: u64,
    audit_log: PathBuf,
) -> Result<()> {
    info!("Loading documents from {:?}", input);
    let documents = load_documents(&input)?;
    info!("Loaded {} documents", documents.len());

    let client = GeminiClient::new(GeminiConfig::from_env()?);
    let mut audit = AuditLog::to_file(&audit_log)?;

    let config = BatchConfig {
        limit,
        request_delay: Duration::from_secs(delay_secs),
        throttle_cooldown: Duration::from_secs(cooldown_secs),
    };
    let mut executor = BatchExecutor::new(config);

    let report = executor
        .run(&client, &PipelineConfig::default(), &mut audit, documents)
        .await;

    if let Some(scores) = &report.aggregate_scores {
        info!(
            "Average ROUGE: rouge1 {:.3}, rouge2 {:.3}, rougeL {:.3}",
            scores.rouge1, scores.rouge2, scores.rouge_l
        );
    }

    let artifact = BatchArtifact::from_report(report);
    write_json_atomic(&artifact, &output)?;
    info!("Batch artifact written to {:?}", output);

    Ok(())
}

fn benchmark(input: PathBuf, output: PathBuf) -> Result<()> {
    let artifact = read_batch_artifact(&input)?;
    info!(
        "Benchmarking {} records from {:?}",
        artifact.results.len(),
        input
    );

    let report = run_benchmark(&artifact.results);

    println!("Samples scored: {}", report.num_samples);
    println!(
        "ROUGE-1  pipeline {:.3}  extractive {:.3}  template {:.3}",
        report.our_pipeline.rouge1,
        report.baseline_extractive.rouge1,
        report.baseline_template.rouge1
    );
    if let Some(pct) = report.improvement_vs_extractive_pct {
        println!("vs extractive baseline: {pct:+.1}% (ROUGE-1)");
    }
    if let Some(pct) = report.improvement_vs_template_pct {
        println!("vs template baseline:   {pct:+.1}% (ROUGE-1)");
    }

    write_json_atomic(&report, &output)?;
    info!("Benchmark artifact written to {:?}", output);

    Ok(())
}
