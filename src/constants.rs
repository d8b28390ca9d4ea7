/// Tool names and pipeline conventions shared across stages.
/// These are the compiled-in defaults; `config.toml` can override the
/// executables, reference files, thread count and bucket.

// External tool executables
pub const DOWNLOADER_BIN: &str = "aria2c";
pub const CONVERTER_BIN: &str = "./bamtofastq-1.3.2";
pub const QUANTIFIER_BIN: &str = "kb";
pub const SYNC_BIN: &str = "aws";

// Quantifier reference files and chemistry
pub const DEFAULT_INDEX: &str = "kb_human.idx";
pub const DEFAULT_T2G: &str = "kbtg.txt";
pub const DEFAULT_TECHNOLOGY: &str = "10xv2";

// Thread count handed to the downloader, converter and quantifier alike
pub const DEFAULT_THREADS: u32 = 16;

// Demultiplexing partition subdirectory produced by the converter
pub const GEM_GROUP: &str = "gemgroup001";

// Paired-end mate markers in FASTQ file names
pub const MATE1_MARKER: &str = "_R1_";
pub const MATE2_MARKER: &str = "_R2_";

// Bucket that receives quantification output and run logs
pub const DEFAULT_BUCKET: &str = "s3://umesh-churchlab";
