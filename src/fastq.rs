use crate::constants::{MATE1_MARKER, MATE2_MARKER};
use crate::error::Result;
use glob::glob;
use tracing::{debug, warn};

/// Discover converter output matching `pattern`, sorted lexicographically.
/// Unreadable entries are skipped with a warning.
pub fn discover(pattern: &str) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in glob(pattern)? {
        match entry {
            Ok(path) => files.push(path.to_string_lossy().into_owned()),
            Err(e) => warn!("Skipping unreadable glob entry: {e}"),
        }
    }
    files.sort();
    Ok(files)
}

/// Order discovered FASTQs as adjacent (mate-1, mate-2) pairs for the
/// quantifier. Each mate-1 file keeps its sorted position; a mate-1 whose
/// mate-2 counterpart is absent is dropped, as is any mate-2 without a
/// mate-1.
pub fn pair_mates(files: &[String]) -> Vec<String> {
    let mut ordered = Vec::with_capacity(files.len());
    for file in files {
        if file.contains(MATE1_MARKER) {
            let mate2 = file.replace(MATE1_MARKER, MATE2_MARKER);
            if files.contains(&mate2) {
                ordered.push(file.clone());
                ordered.push(mate2);
            } else {
                debug!("Dropping orphan mate-1 file {file}");
            }
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pairs_stay_adjacent_in_sorted_order() {
        let input = files(&[
            "a_R1_001.fastq.gz",
            "a_R2_001.fastq.gz",
            "b_R1_001.fastq.gz",
            "b_R2_001.fastq.gz",
        ]);
        assert_eq!(
            pair_mates(&input),
            files(&[
                "a_R1_001.fastq.gz",
                "a_R2_001.fastq.gz",
                "b_R1_001.fastq.gz",
                "b_R2_001.fastq.gz",
            ])
        );
    }

    #[test]
    fn test_orphan_mate1_is_dropped() {
        let input = files(&[
            "a_R1_001.fastq.gz",
            "a_R2_001.fastq.gz",
            "b_R1_001.fastq.gz",
        ]);
        assert_eq!(
            pair_mates(&input),
            files(&["a_R1_001.fastq.gz", "a_R2_001.fastq.gz"])
        );
    }

    #[test]
    fn test_mate2_only_input_yields_nothing() {
        let input = files(&["a_R2_001.fastq.gz", "b_R2_001.fastq.gz"]);
        assert!(pair_mates(&input).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(pair_mates(&[]).is_empty());
    }

    #[test]
    fn test_discover_sorts_and_filters_by_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let gem = dir.path().join("gemgroup001");
        fs::create_dir_all(&gem).unwrap();
        for name in [
            "s_R2_001.fastq.gz",
            "s_R1_001.fastq.gz",
            "notes.txt",
            "s_I1_001.fastq.gz",
        ] {
            fs::write(gem.join(name), b"").unwrap();
        }

        let pattern = format!("{}/*_R*.fastq.gz", gem.display());
        let found = discover(&pattern).unwrap();
        assert_eq!(
            found,
            vec![
                gem.join("s_R1_001.fastq.gz").to_string_lossy().into_owned(),
                gem.join("s_R2_001.fastq.gz").to_string_lossy().into_owned(),
            ]
        );
    }

    #[test]
    fn test_discover_missing_directory_is_empty() {
        let found = discover("no/such/dir/gemgroup001/*_R*.fastq.gz").unwrap();
        assert!(found.is_empty());
    }
}
