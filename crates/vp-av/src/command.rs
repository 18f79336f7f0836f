//! Builder for launching external tool processes.
//!
//! Encoder output is not parsed; the child inherits the server's stdout and
//! stderr so operators can follow ffmpeg's log alongside ours.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use vp_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> vp_core::Result<()> {
/// ToolCommand::new(PathBuf::from("ffmpeg"))
///     .args(["-i", "/path/to/input.mp4"])
///     .args(["-c", "copy", "/path/to/output.mkv"])
///     .run_inherited()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Short program name used in errors and logs.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Spawn the process with inherited stdout/stderr and wait for it to exit.
    ///
    /// The child handle is owned by this future and released when the process
    /// exits, whatever the outcome.
    ///
    /// # Errors
    ///
    /// - Returns [`vp_core::Error::Tool`] if spawning the process fails (for
    ///   example when the binary cannot be found).
    /// - Returns [`vp_core::Error::Tool`] if the process exits with a non-zero
    ///   status.
    pub async fn run_inherited(&self) -> vp_core::Result<()> {
        let program_name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        tracing::debug!("Spawning {} {}", self.program.display(), self.args.join(" "));

        let mut child = cmd.spawn().map_err(|e| vp_core::Error::Tool {
            tool: program_name.clone(),
            message: format!("failed to spawn: {e}"),
        })?;

        let status = child.wait().await.map_err(|e| vp_core::Error::Tool {
            tool: program_name.clone(),
            message: format!("I/O error waiting for process: {e}"),
        })?;

        if !status.success() {
            return Err(vp_core::Error::Tool {
                tool: program_name,
                message: format!("exited with {status}"),
            });
        }

        Ok(())
    }
}
