use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::common::errors::CleanerError;

/// Raw result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A successful run printing `stdout`
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed run printing `stderr`
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Trimmed stdout, or trimmed stderr when stdout is empty
    pub fn text(&self) -> String {
        let out = self.stdout.trim();
        if out.is_empty() {
            self.stderr.trim().to_string()
        } else {
            out.to_string()
        }
    }
}

/// Executes one external program to completion.
///
/// The bridge client only talks to devices through this seam, so tests can
/// script device responses without an adb binary.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, CleanerError>;
}

/// Runs real processes, killing them when they overrun their timeout
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, CleanerError> {
        let command_line = render_command(program, args);
        let fault = |message: String| CleanerError::ExecutionFault {
            command: command_line.clone(),
            message,
        };

        let started = Instant::now();
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| fault(format!("Failed to start '{}': {}", program, e)))?;

        // Drain both pipes on their own threads so a chatty child cannot block
        // on a full pipe while we wait for it.
        let stdout_handle = child.stdout.take().map(spawn_reader);
        let stderr_handle = child.stderr.take().map(spawn_reader);

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if started.elapsed() >= timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        warn!(command = %command_line, secs = timeout.as_secs(), "command timed out");
                        return Err(CleanerError::Timeout {
                            command: command_line,
                            secs: timeout.as_secs(),
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    return Err(fault(format!("Failed to poll command: {}", e)));
                }
            }
        };

        let stdout = stdout_handle.map(join_reader).unwrap_or_default();
        let stderr = stderr_handle.map(join_reader).unwrap_or_default();

        debug!(
            command = %command_line,
            success = status.success(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "command finished"
        );

        Ok(CommandOutput {
            success: status.success(),
            stdout,
            stderr,
        })
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_reader(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

/// Render a program and its arguments the way a user would type them
pub fn render_command(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_prefers_stdout() {
        let out = CommandOutput {
            success: true,
            stdout: "  hello\n".to_string(),
            stderr: "warning".to_string(),
        };
        assert_eq!(out.text(), "hello");
    }

    #[test]
    fn test_text_falls_back_to_stderr() {
        let out = CommandOutput::failed("error: device not found\n");
        assert_eq!(out.text(), "error: device not found");
    }

    #[test]
    fn test_render_command() {
        assert_eq!(render_command("adb", &[]), "adb");
        assert_eq!(
            render_command("adb", &["shell".to_string(), "ls".to_string()]),
            "adb shell ls"
        );
    }

    #[test]
    fn test_missing_program_is_execution_fault() {
        let err = SystemRunner
            .run(
                "emucleaner-definitely-not-a-real-program",
                &[],
                Duration::from_secs(1),
            )
            .unwrap_err();
        assert!(matches!(err, CleanerError::ExecutionFault { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_overrunning_command_times_out() {
        let err = SystemRunner
            .run("sleep", &["5".to_string()], Duration::from_millis(200))
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_stdout() {
        let out = SystemRunner
            .run("echo", &["ready".to_string()], Duration::from_secs(5))
            .unwrap();
        assert!(out.success);
        assert_eq!(out.text(), "ready");
    }
}
