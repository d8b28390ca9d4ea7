use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

use scrna_deploy::config::Config;
use scrna_deploy::exec::CommandRunner;
use scrna_deploy::jobs::JobSource;
use scrna_deploy::logging;
use scrna_deploy::pipeline::{persist_report, FailurePolicy, Pipeline, RunReport};

#[derive(Parser)]
#[command(name = "scrna_deploy")]
#[command(about = "Deploy single-cell RNA-seq analysis pipelines")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log the external commands without executing them
    #[arg(long, global = true)]
    dry: bool,

    /// Run every remaining stage even after one fails
    #[arg(long, global = true)]
    keep_going: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single sample
    Run {
        /// Sample name to uniquely identify the run
        name: String,
        /// Link to the BAM file to process
        link: String,
    },
    /// Process multiple samples given as name,link tokens
    Batch {
        /// name,link pairs, e.g. sample1,http://example.org/sample1.bam
        #[arg(required = true)]
        jobs: Vec<String>,
    },
    /// Process samples listed in a links file (one "name link" per line)
    File {
        /// Path to the links file
        #[arg(default_value = "links.txt")]
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let log_path = logging::init_logging();
    info!("Logging to {log_path}");

    match run(cli, &log_path) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, log_path: &str) -> anyhow::Result<bool> {
    let config = Config::load_or_default()?;
    let policy = if cli.keep_going {
        FailurePolicy::KeepGoing
    } else {
        FailurePolicy::Abort
    };

    // The single-sample front door is the only one that ships its own log.
    let (source, upload_log) = match &cli.command {
        Commands::Run { name, link } => (
            JobSource::Single {
                name: name.clone(),
                link: link.clone(),
            },
            true,
        ),
        Commands::Batch { jobs } => (JobSource::List(jobs.clone()), false),
        Commands::File { path } => (JobSource::File(path.clone()), false),
    };

    let jobs = source.collect()?;
    if jobs.is_empty() {
        warn!("No sample jobs to process");
        println!("⚠️  No sample jobs to process");
        return Ok(true);
    }

    let mut pipeline = Pipeline::new(config, policy);
    if upload_log {
        pipeline = pipeline.with_log_upload(log_path);
    }

    let started_at = chrono::Utc::now();
    let mut runner = CommandRunner::new(cli.dry);
    let reports = pipeline.run_all(&mut runner, &jobs);

    for report in &reports {
        println!("\n📊 Pipeline results for {}:", report.sample);
        println!("   Stages completed: {}", report.stages_completed.join(", "));
        println!("   FASTQ mate pairs: {}", report.fastq_pairs);
        match &report.failed_stage {
            Some(stage) => {
                println!("   ❌ Failed at stage: {stage}");
                for err in &report.errors {
                    println!("   - {err}");
                }
            }
            None => println!("   ✅ Completed in {:.1}s", report.duration_secs),
        }
    }

    let all_succeeded = reports.iter().all(|r| r.succeeded());

    if !cli.dry {
        let report = RunReport {
            started_at,
            dry: cli.dry,
            samples: reports,
        };
        let report_file = persist_report(&report)?;
        info!("💾 Saved run report to {report_file}");
        println!("\n💾 Run report: {report_file}");
    }

    Ok(all_succeeded)
}
