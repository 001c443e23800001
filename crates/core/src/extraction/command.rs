//! Running external command-line tools with a timeout.

use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use super::error::ExtractionError;

/// Runs `program` to completion and returns its output if it exited successfully.
///
/// The child is killed if the timeout expires.
pub(crate) async fn run_tool(
    tool: &str,
    program: &Path,
    args: &[String],
    timeout_secs: u64,
) -> Result<Output, ExtractionError> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_error(tool, program, e))?;

    let output = match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await
    {
        Ok(result) => result?,
        Err(_) => {
            // Dropping the wait future drops the child, which kills it.
            return Err(ExtractionError::Timeout {
                tool: tool.to_string(),
                timeout_secs,
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ExtractionError::tool_failed(
            tool,
            format!("exited with code: {:?}", output.status.code()),
            if stderr.is_empty() { None } else { Some(stderr) },
        ));
    }

    Ok(output)
}

/// Checks that `program` can be started at all.
pub(crate) async fn probe_tool(
    tool: &str,
    program: &Path,
    version_flag: &str,
) -> Result<(), ExtractionError> {
    Command::new(program)
        .arg(version_flag)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|_| ())
        .map_err(|e| spawn_error(tool, program, e))
}

fn spawn_error(tool: &str, program: &Path, e: std::io::Error) -> ExtractionError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ExtractionError::ToolNotFound {
            tool: tool.to_string(),
            path: program.to_path_buf(),
        }
    } else {
        ExtractionError::Io(e)
    }
}
