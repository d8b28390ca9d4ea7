use crate::config::Config;
use crate::error::Result;
use crate::exec::{CmdOutcome, CommandRunner};
use crate::fastq;
use crate::jobs::SampleJob;
use crate::paths::SamplePaths;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use std::fs;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// What to do with a sample's remaining stages after one fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Skip the remaining stages for that sample (default).
    Abort,
    /// Log the failure and run the remaining stages anyway.
    KeepGoing,
}

/// Per-sample outcome, serialized into the run report.
#[derive(Debug, Serialize)]
pub struct SampleReport {
    pub sample: String,
    pub stages_completed: Vec<String>,
    pub failed_stage: Option<String>,
    pub errors: Vec<String>,
    pub fastq_pairs: usize,
    pub duration_secs: f64,
}

impl SampleReport {
    fn new(sample: &str) -> Self {
        Self {
            sample: sample.to_string(),
            stages_completed: Vec::new(),
            failed_stage: None,
            errors: Vec::new(),
            fastq_pairs: 0,
            duration_secs: 0.0,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.failed_stage.is_none() && self.errors.is_empty()
    }
}

/// Full run report persisted alongside the log file.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub dry: bool,
    pub samples: Vec<SampleReport>,
}

/// Sequences the five stages (fetch, convert, discover, quantify,
/// sync-and-cleanup) for each sample, delegating every external call to
/// the [`CommandRunner`]. Strictly sequential: one sample at a time, one
/// process at a time.
pub struct Pipeline {
    config: Config,
    policy: FailurePolicy,
    upload_log: Option<String>,
}

impl Pipeline {
    pub fn new(config: Config, policy: FailurePolicy) -> Self {
        Self {
            config,
            policy,
            upload_log: None,
        }
    }

    /// Also upload the driver's own log file during the sync stage
    /// (single-sample mode).
    pub fn with_log_upload(mut self, log_path: &str) -> Self {
        self.upload_log = Some(log_path.to_string());
        self
    }

    /// Run every job in order. A sample's failure never aborts the batch.
    pub fn run_all(&self, runner: &mut CommandRunner, jobs: &[SampleJob]) -> Vec<SampleReport> {
        jobs.iter().map(|job| self.run_sample(runner, job)).collect()
    }

    #[instrument(skip(self, runner, job), fields(sample = %job.name))]
    pub fn run_sample(&self, runner: &mut CommandRunner, job: &SampleJob) -> SampleReport {
        let started = Instant::now();
        let paths = SamplePaths::new(&job.name, &self.config.remote.bucket);
        let mut report = SampleReport::new(&job.name);

        info!("🚀 Starting pipeline for {}", job.name);
        counter!("scrna_pipeline_runs_total").increment(1);

        let mut proceed = self.advance(&mut report, "fetch", self.fetch(runner, job, &paths));

        if proceed {
            proceed = self.advance(&mut report, "convert", self.convert(runner, &paths));
        }

        let mut inputs = Vec::new();
        if proceed {
            let outcome = match self.discover(&paths, &mut report) {
                Ok(paired) => {
                    inputs = paired;
                    CmdOutcome::success()
                }
                Err(e) => CmdOutcome::Failure {
                    exit_code: None,
                    stderr: e.to_string(),
                },
            };
            proceed = self.advance(&mut report, "discover", outcome);
        }

        if proceed {
            proceed = self.advance(
                &mut report,
                "quantify",
                self.quantify(runner, &paths, &inputs),
            );
        }

        if proceed {
            self.advance(&mut report, "sync", self.sync_and_cleanup(runner, &paths));
        }

        report.duration_secs = started.elapsed().as_secs_f64();
        histogram!("scrna_sample_duration_seconds").record(report.duration_secs);

        if report.succeeded() {
            info!("✅ Pipeline finished for {}", job.name);
        } else {
            warn!(
                "Pipeline for {} failed at stage {}",
                job.name,
                report.failed_stage.as_deref().unwrap_or("unknown")
            );
        }
        report
    }

    /// Record a stage outcome and decide whether the next stage runs.
    fn advance(&self, report: &mut SampleReport, stage: &str, outcome: CmdOutcome) -> bool {
        match outcome {
            CmdOutcome::Failure { exit_code, stderr } => {
                counter!("scrna_stage_failures_total", "stage" => stage.to_string()).increment(1);
                let code = exit_code.map_or_else(|| "none".to_string(), |c| c.to_string());
                let msg = format!("stage {} failed (exit {}): {}", stage, code, stderr.trim());
                error!("{msg}");
                report.errors.push(msg);
                if report.failed_stage.is_none() {
                    report.failed_stage = Some(stage.to_string());
                }
                self.policy == FailurePolicy::KeepGoing
            }
            _ => {
                report.stages_completed.push(stage.to_string());
                true
            }
        }
    }

    /// Stage 1: download the BAM with a multi-connection fetch.
    fn fetch(&self, runner: &mut CommandRunner, job: &SampleJob, paths: &SamplePaths) -> CmdOutcome {
        info!("⬇️  Downloading {} to {}", job.link, paths.bam());
        let args = vec![
            "-x".to_string(),
            self.config.threads.to_string(),
            "-o".to_string(),
            paths.bam(),
            job.link.clone(),
        ];
        runner.run(&self.config.tools.downloader, &args)
    }

    /// Stage 2: demultiplex the BAM into per-gem-group FASTQs, then drop
    /// the BAM.
    fn convert(&self, runner: &mut CommandRunner, paths: &SamplePaths) -> CmdOutcome {
        info!("🔄 Converting {} to FASTQs at {}", paths.bam(), paths.fastq_dir());
        let args = vec![
            format!("--nthreads={}", self.config.threads),
            paths.bam(),
            paths.fastq_dir(),
        ];
        let converted = runner.run(&self.config.tools.converter, &args);
        if converted.is_failure() && self.policy == FailurePolicy::Abort {
            return converted;
        }

        info!("Removing BAM...");
        let removed = runner.remove_path(&paths.bam());
        if converted.is_failure() {
            converted
        } else {
            removed
        }
    }

    /// Stage 3: glob the gem-group directory and pair the mates. An empty
    /// result is not a failure; the quantifier command is still built (and,
    /// under --dry, logged) with no input files.
    fn discover(&self, paths: &SamplePaths, report: &mut SampleReport) -> Result<Vec<String>> {
        let found = fastq::discover(&paths.fastq_glob())?;
        let paired = fastq::pair_mates(&found);
        report.fastq_pairs = paired.len() / 2;
        info!(
            "🔎 Discovered {} FASTQ files under {}, {} usable mate pairs",
            found.len(),
            paths.gemgroup_dir(),
            report.fastq_pairs
        );
        if paired.is_empty() {
            warn!("No paired FASTQ files found under {}", paths.gemgroup_dir());
        }
        Ok(paired)
    }

    /// Stage 4: run the quantifier over the paired FASTQs.
    fn quantify(
        &self,
        runner: &mut CommandRunner,
        paths: &SamplePaths,
        inputs: &[String],
    ) -> CmdOutcome {
        info!("🧮 Quantifying {} with {}", paths.fastq_dir(), self.config.tools.quantifier);
        let mut args = vec![
            "count".to_string(),
            "-i".to_string(),
            self.config.quant.index.clone(),
            "-g".to_string(),
            self.config.quant.t2g.clone(),
            "-x".to_string(),
            self.config.quant.technology.clone(),
            "--h5ad".to_string(),
            "--cellranger".to_string(),
        ];
        args.extend(inputs.iter().cloned());
        args.push("-t".to_string());
        args.push(self.config.threads.to_string());
        args.push("-o".to_string());
        args.push(paths.output_dir());
        runner.run(&self.config.tools.quantifier, &args)
    }

    /// Stage 5: mirror the output directory (and, in single-sample mode,
    /// the log file) to the bucket, then remove the local FASTQ tree and
    /// output directory. Under fail-fast, a failed upload keeps the local
    /// artifacts on disk.
    fn sync_and_cleanup(&self, runner: &mut CommandRunner, paths: &SamplePaths) -> CmdOutcome {
        info!("☁️  Syncing {} to {}", paths.output_dir(), paths.remote_output());
        let synced = runner.run(
            &self.config.tools.sync,
            &[
                "s3".to_string(),
                "sync".to_string(),
                paths.output_dir(),
                paths.remote_output(),
            ],
        );
        if synced.is_failure() && self.policy == FailurePolicy::Abort {
            return synced;
        }

        let mut log_upload_failed = None;
        if let Some(log_path) = &self.upload_log {
            info!("☁️  Uploading log {} to {}", log_path, paths.remote_key(log_path));
            let uploaded = runner.run(
                &self.config.tools.sync,
                &[
                    "s3".to_string(),
                    "cp".to_string(),
                    log_path.clone(),
                    paths.remote_key(log_path),
                ],
            );
            if uploaded.is_failure() && self.policy == FailurePolicy::Abort {
                return uploaded;
            }
            if uploaded.is_failure() {
                log_upload_failed = Some(uploaded);
            }
        }

        info!("🧹 Cleaning up...");
        let removed_fastqs = runner.remove_path(&paths.fastq_dir());
        let removed_output = runner.remove_path(&paths.output_dir());

        if synced.is_failure() {
            synced
        } else if let Some(failed) = log_upload_failed {
            failed
        } else if removed_fastqs.is_failure() {
            removed_fastqs
        } else {
            removed_output
        }
    }
}

/// Persist the run report next to the log file, named by wall-clock time
/// like the log itself.
pub fn persist_report(report: &RunReport) -> Result<String> {
    let timestamp = Utc::now().format("%Y%m%d-%H%M%S");
    let filename = format!("run_report_{timestamp}.json");
    let json_content = serde_json::to_string_pretty(report)?;
    fs::write(&filename, json_content)?;
    Ok(filename)
}
