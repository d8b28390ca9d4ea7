use crate::error::{PipelineError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One (name, link) unit of work, processed end-to-end by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleJob {
    pub name: String,
    pub link: String,
}

impl SampleJob {
    pub fn new(name: &str, link: &str) -> Result<Self> {
        let safe_name = sanitize_name(name);
        if safe_name.is_empty() {
            return Err(PipelineError::EmptyName(name.to_string()));
        }
        Ok(Self {
            name: safe_name,
            link: link.trim().to_string(),
        })
    }

    /// Parse a `name,link` token, splitting on the first comma only so the
    /// link may itself contain commas.
    pub fn from_token(token: &str) -> Result<Self> {
        let (name, link) = token
            .split_once(',')
            .ok_or_else(|| PipelineError::MalformedJob(token.to_string()))?;
        Self::new(name.trim(), link.trim())
    }
}

/// Keep only alphanumerics, spaces, dots and underscores, then drop
/// trailing whitespace. Produces a filesystem-safe identifier.
pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '.' | '_'))
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Where sample jobs come from: one pipeline, three historical front doors.
#[derive(Debug, Clone)]
pub enum JobSource {
    /// A single positional name + link pair.
    Single { name: String, link: String },
    /// Repeated `name,link` tokens.
    List(Vec<String>),
    /// A links file with one whitespace-separated `name link` per line.
    File(PathBuf),
}

impl JobSource {
    pub fn collect(&self) -> Result<Vec<SampleJob>> {
        match self {
            JobSource::Single { name, link } => Ok(vec![SampleJob::new(name, link)?]),
            JobSource::List(tokens) => tokens.iter().map(|t| SampleJob::from_token(t)).collect(),
            JobSource::File(path) => jobs_from_file(path),
        }
    }
}

fn jobs_from_file(path: &Path) -> Result<Vec<SampleJob>> {
    let content = fs::read_to_string(path)?;
    let mut jobs = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next()) {
            (Some(name), Some(link)) => jobs.push(SampleJob::new(name, link)?),
            _ => warn!(
                "Skipping malformed line {} in {}: '{}'",
                lineno + 1,
                path.display(),
                line
            ),
        }
    }
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("sample#1!"), "sample1");
        assert_eq!(sanitize_name("  GSM123_rep.2  "), "GSM123_rep.2");
        assert_eq!(sanitize_name("a b"), "a b");
        assert_eq!(sanitize_name("bad/../path"), "bad..path");
        assert_eq!(sanitize_name("!!!"), "");
    }

    #[test]
    fn test_token_splits_on_first_comma_only() {
        let job = SampleJob::from_token(" sample1 , http://example.org/a,b.bam ").unwrap();
        assert_eq!(job.name, "sample1");
        assert_eq!(job.link, "http://example.org/a,b.bam");
    }

    #[test]
    fn test_token_without_comma_is_malformed() {
        assert!(matches!(
            SampleJob::from_token("sample1"),
            Err(PipelineError::MalformedJob(_))
        ));
    }

    #[test]
    fn test_name_sanitized_to_empty_is_rejected() {
        assert!(matches!(
            SampleJob::new("###", "http://example.org/x.bam"),
            Err(PipelineError::EmptyName(_))
        ));
    }
}
