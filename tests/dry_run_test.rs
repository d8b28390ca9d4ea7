use anyhow::Result;

use scrna_deploy::config::Config;
use scrna_deploy::exec::CommandRunner;
use scrna_deploy::jobs::SampleJob;
use scrna_deploy::pipeline::{FailurePolicy, Pipeline};

fn dry_history(pipeline: &Pipeline, job: &SampleJob) -> Vec<String> {
    let mut runner = CommandRunner::new(true);
    pipeline.run_sample(&mut runner, job);
    runner.history().to_vec()
}

#[test]
fn test_dry_run_logs_all_five_stages_in_order() -> Result<()> {
    let job = SampleJob::from_token("sample1,http://example.org/sample1.bam")?;
    let pipeline = Pipeline::new(Config::default(), FailurePolicy::Abort);

    let history = dry_history(&pipeline, &job);

    assert_eq!(
        history,
        vec![
            "aria2c -x 16 -o sample1.bam http://example.org/sample1.bam",
            "./bamtofastq-1.3.2 --nthreads=16 sample1.bam fastqs/sample1",
            "rm -rf sample1.bam",
            "kb count -i kb_human.idx -g kbtg.txt -x 10xv2 --h5ad --cellranger -t 16 -o out_sample1",
            "aws s3 sync out_sample1 s3://umesh-churchlab/out_sample1",
            "rm -rf fastqs/sample1",
            "rm -rf out_sample1",
        ]
    );
    Ok(())
}

#[test]
fn test_dry_run_is_idempotent() -> Result<()> {
    let job = SampleJob::from_token("sample1,http://example.org/sample1.bam")?;
    let pipeline = Pipeline::new(Config::default(), FailurePolicy::Abort);

    let first = dry_history(&pipeline, &job);
    let second = dry_history(&pipeline, &job);
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_single_sample_mode_also_uploads_the_log() -> Result<()> {
    let job = SampleJob::new("sample1", "http://example.org/sample1.bam")?;
    let pipeline = Pipeline::new(Config::default(), FailurePolicy::Abort)
        .with_log_upload("output_20240101-000000.000000.log");

    let history = dry_history(&pipeline, &job);

    let log_cp = "aws s3 cp output_20240101-000000.000000.log \
                  s3://umesh-churchlab/output_20240101-000000.000000.log";
    let sync_pos = history
        .iter()
        .position(|c| c.starts_with("aws s3 sync"))
        .expect("sync command missing");
    assert_eq!(history[sync_pos + 1], log_cp);
    assert_eq!(history[sync_pos + 2], "rm -rf fastqs/sample1");
    Ok(())
}

#[test]
fn test_config_overrides_reach_the_command_lines() -> Result<()> {
    let mut config = Config::default();
    config.threads = 4;
    config.tools.downloader = "fetcher".to_string();
    config.remote.bucket = "s3://other-lab".to_string();

    let job = SampleJob::new("s", "http://example.org/s.bam")?;
    let pipeline = Pipeline::new(config, FailurePolicy::Abort);
    let history = dry_history(&pipeline, &job);

    assert_eq!(history[0], "fetcher -x 4 -o s.bam http://example.org/s.bam");
    assert!(history
        .iter()
        .any(|c| c == "aws s3 sync out_s s3://other-lab/out_s"));
    Ok(())
}

/// Point every tool at an executable that cannot exist so each external
/// stage fails at spawn time.
fn unrunnable_config() -> Config {
    let mut config = Config::default();
    let missing = "scrna-deploy-test-no-such-tool".to_string();
    config.tools.downloader = missing.clone();
    config.tools.converter = missing.clone();
    config.tools.quantifier = missing.clone();
    config.tools.sync = missing;
    config
}

#[test]
fn test_fail_fast_skips_the_remaining_stages() -> Result<()> {
    let job = SampleJob::new("failfast_sample", "http://example.org/x.bam")?;
    let pipeline = Pipeline::new(unrunnable_config(), FailurePolicy::Abort);

    let mut runner = CommandRunner::new(false);
    let report = pipeline.run_sample(&mut runner, &job);

    assert_eq!(report.failed_stage.as_deref(), Some("fetch"));
    assert!(report.stages_completed.is_empty());
    // only the fetch command was ever attempted
    assert_eq!(runner.history().len(), 1);
    assert!(runner.history()[0].starts_with("scrna-deploy-test-no-such-tool -x 16"));
    Ok(())
}

#[test]
fn test_keep_going_runs_every_stage_despite_failures() -> Result<()> {
    let job = SampleJob::new("keepgoing_sample", "http://example.org/x.bam")?;
    let pipeline = Pipeline::new(unrunnable_config(), FailurePolicy::KeepGoing);

    let mut runner = CommandRunner::new(false);
    let report = pipeline.run_sample(&mut runner, &job);

    assert_eq!(report.failed_stage.as_deref(), Some("fetch"));
    // fetch, convert, rm bam, quantify, sync, rm fastqs, rm out
    assert_eq!(runner.history().len(), 7);
    assert!(runner.history()[6].ends_with("out_keepgoing_sample"));
    // discovery ran and found nothing; it is the one stage that cannot
    // fail here
    assert_eq!(report.stages_completed, vec!["discover"]);
    assert_eq!(report.fastq_pairs, 0);
    Ok(())
}
