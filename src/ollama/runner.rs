use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::constants::COMMAND_TIMEOUT_SECS;

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs on behalf of the discovery service
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `program` to completion and capture its output.
    /// A missing binary surfaces as `io::ErrorKind::NotFound`.
    async fn run(&self, program: &str, args: &[&str]) -> io::Result<ProcessOutput>;

    /// Start `program` in the background without waiting for it
    fn spawn_detached(&self, program: &str, args: &[&str]) -> io::Result<()>;
}

/// Runs real processes via tokio
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str]) -> io::Result<ProcessOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let timeout_duration = Duration::from_secs(COMMAND_TIMEOUT_SECS);
        let output = match timeout(timeout_duration, cmd.output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("{} timed out after {} seconds", program, timeout_duration.as_secs()),
                ))
            }
        };

        Ok(ProcessOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> io::Result<()> {
        // std rather than tokio: the child must outlive this process' runtime
        std::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }
}
