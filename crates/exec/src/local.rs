// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local executor: spawns `bash -c <command>` as a subprocess (spec
//! §4.1 "Local mode").

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use actoriac_core::TransportError;

use crate::{CommandExecutor, CommandResult, LineCallback, LineSource};

/// Runs commands via a local `bash -c` subprocess. `identifier()` is
/// always `"local"`.
#[derive(Debug, Clone, Default)]
pub struct LocalExecutor;

#[async_trait]
impl CommandExecutor for LocalExecutor {
    async fn execute(
        &self,
        command: &str,
        on_line: Option<LineCallback>,
    ) -> Result<CommandResult, TransportError> {
        let mut child = Command::new("bash")
            .arg("-c")
            .arg(command)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| TransportError::Generic(e.to_string()))?;

        #[allow(clippy::expect_used)]
        let stdout = child.stdout.take().expect("stdout was piped");
        #[allow(clippy::expect_used)]
        let stderr = child.stderr.take().expect("stderr was piped");

        // Read stdout on the calling task, stderr on a helper task, so
        // neither stream's OS pipe buffer can fill up and deadlock the
        // child (spec §4.1).
        let stderr_cb = on_line.clone();
        let stderr_task = tokio::spawn(async move { read_lines(stderr, LineSource::Stderr, stderr_cb).await });

        let stdout_buf = read_lines(stdout, LineSource::Stdout, on_line).await;
        let stderr_buf = stderr_task.await.map_err(|e| TransportError::Interrupted(e.to_string()))?;

        let status = child.wait().await.map_err(|e| TransportError::Generic(e.to_string()))?;

        Ok(CommandResult {
            stdout: stdout_buf.trim_end().to_string(),
            stderr: stderr_buf.trim_end().to_string(),
            exit_code: status.code().unwrap_or(-1),
        })
    }

    fn identifier(&self) -> &str {
        "local"
    }
}

async fn read_lines<R>(reader: R, source: LineSource, on_line: Option<LineCallback>) -> String
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut captured = String::new();
    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(cb) = &on_line {
            cb(source, &line);
        }
        captured.push_str(&line);
        captured.push('\n');
    }
    captured
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
