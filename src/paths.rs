use crate::constants::GEM_GROUP;

/// Every filesystem and remote-key convention derived from a sample name,
/// in one place. Stage N's output path is stage N+1's input path.
#[derive(Debug, Clone)]
pub struct SamplePaths {
    name: String,
    bucket: String,
}

impl SamplePaths {
    pub fn new(name: &str, bucket: &str) -> Self {
        Self {
            name: name.to_string(),
            bucket: bucket.trim_end_matches('/').to_string(),
        }
    }

    /// Download target for the fetch stage.
    pub fn bam(&self) -> String {
        format!("{}.bam", self.name)
    }

    /// Root of the converter's FASTQ output tree.
    pub fn fastq_dir(&self) -> String {
        format!("fastqs/{}", self.name)
    }

    pub fn gemgroup_dir(&self) -> String {
        format!("{}/{}", self.fastq_dir(), GEM_GROUP)
    }

    /// Glob matching the converter's paired-end read files.
    pub fn fastq_glob(&self) -> String {
        format!("{}/*_R*.fastq.gz", self.gemgroup_dir())
    }

    /// Quantification results directory.
    pub fn output_dir(&self) -> String {
        format!("out_{}", self.name)
    }

    /// Remote prefix mirroring the local output directory.
    pub fn remote_output(&self) -> String {
        self.remote_key(&self.output_dir())
    }

    pub fn remote_key(&self, local: &str) -> String {
        format!("{}/{}", self.bucket, local)
    }
}
