use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;
use tracing::{error, info};

/// Tagged result of one external invocation.
#[derive(Debug, Clone)]
pub enum CmdOutcome {
    Success { stdout: String },
    Failure { exit_code: Option<i32>, stderr: String },
    /// Dry run: the command was logged but never spawned. Downstream
    /// stages treat this as success.
    Skipped,
}

impl CmdOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, CmdOutcome::Failure { .. })
    }

    pub(crate) fn success() -> Self {
        CmdOutcome::Success {
            stdout: String::new(),
        }
    }
}

/// Runs external programs one at a time, blocking until each exits, and
/// keeps the rendered command line of every invocation in order.
pub struct CommandRunner {
    dry: bool,
    history: Vec<String>,
}

impl CommandRunner {
    pub fn new(dry: bool) -> Self {
        Self {
            dry,
            history: Vec::new(),
        }
    }

    pub fn dry(&self) -> bool {
        self.dry
    }

    /// Rendered command lines in invocation order.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Log, record and (unless dry) execute a command, capturing both
    /// output streams in full. Stdout is logged at info; stderr, when
    /// non-empty, at error regardless of the exit status. A spawn error
    /// (e.g. missing executable) is a `Failure` with no exit code.
    pub fn run(&mut self, program: &str, args: &[String]) -> CmdOutcome {
        let rendered = render(program, args);
        info!("{rendered}");
        self.history.push(rendered);
        if self.dry {
            return CmdOutcome::Skipped;
        }

        let output = match Command::new(program).args(args).output() {
            Ok(output) => output,
            Err(e) => {
                error!("Failed to spawn {program}: {e}");
                return CmdOutcome::Failure {
                    exit_code: None,
                    stderr: e.to_string(),
                };
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !stdout.is_empty() {
            info!("{stdout}");
        }
        if !stderr.is_empty() {
            error!("{stderr}");
        }

        if output.status.success() {
            CmdOutcome::Success { stdout }
        } else {
            CmdOutcome::Failure {
                exit_code: output.status.code(),
                stderr,
            }
        }
    }

    /// Driver-side recursive removal, logged and recorded like any other
    /// stage command. A missing path counts as success.
    pub fn remove_path(&mut self, path: &str) -> CmdOutcome {
        let rendered = format!("rm -rf {path}");
        info!("{rendered}");
        self.history.push(rendered);
        if self.dry {
            return CmdOutcome::Skipped;
        }

        let target = Path::new(path);
        let removed = if target.is_dir() {
            fs::remove_dir_all(target)
        } else {
            fs::remove_file(target)
        };
        match removed {
            Ok(()) => CmdOutcome::success(),
            Err(e) if e.kind() == ErrorKind::NotFound => CmdOutcome::success(),
            Err(e) => {
                error!("Failed to remove {path}: {e}");
                CmdOutcome::Failure {
                    exit_code: None,
                    stderr: e.to_string(),
                }
            }
        }
    }
}

fn render(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
