// src/exec/execution.rs

//! A single subprocess invocation.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tracing::debug;

use crate::errors::ExecError;

const READ_CHUNK: usize = 8 * 1024;

/// One fully specified request to spawn a process.
///
/// Built fresh for every call of
/// [`ExternalCommand::run`](super::ExternalCommand::run) and consumed by
/// exactly one [`Execution::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub stdin: Vec<u8>,
    /// Merge stderr into the captured output instead of keeping it for
    /// error messages only.
    pub combine_output: bool,
}

impl Execution {
    pub fn new(
        program: impl Into<PathBuf>,
        args: Vec<String>,
        stdin: impl Into<Vec<u8>>,
        combine_output: bool,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            stdin: stdin.into(),
            combine_output,
        }
    }

    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Spawn the process, feed stdin, wait for exit and classify the result.
    ///
    /// If feeding stdin fails the function returns early and the child is
    /// killed when it is dropped.
    pub async fn run(&self) -> Result<Vec<u8>, ExecError> {
        let program = self.program_name();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: program.clone(),
                source,
            })?;

        debug!(program = %program, pid = ?child.id(), args = ?self.args, "spawned process");

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let feed = async {
            let stdin = stdin.ok_or_else(|| ExecError::Stdin {
                program: program.clone(),
                source: io::Error::other("stdin pipe was not created"),
            })?;
            feed_stdin(stdin, &self.stdin)
                .await
                .map_err(|source| ExecError::Stdin {
                    program: program.clone(),
                    source,
                })
        };

        let collect = async {
            collect_output(stdout, stderr, self.combine_output)
                .await
                .map_err(|source| ExecError::Wait {
                    program: program.clone(),
                    source,
                })
        };

        let wait = async {
            child.wait().await.map_err(|source| ExecError::Wait {
                program: program.clone(),
                source,
            })
        };

        let ((), (stdout, stderr), status) = tokio::try_join!(feed, collect, wait)?;

        debug!(program = %program, code = ?status.code(), stdout_len = stdout.len(), "process exited");

        classify(&program, status.code(), self.combine_output, stdout, stderr)
    }
}

/// Write the payload and close the pipe. A child that exits without reading
/// all of its input makes this fail with `BrokenPipe`.
async fn feed_stdin(mut stdin: ChildStdin, payload: &[u8]) -> io::Result<()> {
    if !payload.is_empty() {
        stdin.write_all(payload).await?;
    }
    stdin.shutdown().await
}

/// Returns `(captured, stderr)`. In combined mode both streams land in
/// `captured` and `stderr` is empty.
async fn collect_output<O, E>(
    stdout: Option<O>,
    stderr: Option<E>,
    combine: bool,
) -> io::Result<(Vec<u8>, Vec<u8>)>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    if combine {
        let merged = read_interleaved(stdout, stderr).await?;
        return Ok((merged, Vec::new()));
    }
    tokio::try_join!(read_all(stdout), read_all(stderr))
}

async fn read_all<R: AsyncRead + Unpin>(reader: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Read two streams into one buffer in arrival order.
async fn read_interleaved<O, E>(stdout: Option<O>, stderr: Option<E>) -> io::Result<Vec<u8>>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut merged = Vec::new();
    let mut out_buf = vec![0u8; READ_CHUNK];
    let mut err_buf = vec![0u8; READ_CHUNK];
    let mut out = stdout;
    let mut err = stderr;

    loop {
        tokio::select! {
            n = read_chunk(&mut out, &mut out_buf), if out.is_some() => {
                let n = n?;
                if n == 0 {
                    out = None;
                } else {
                    merged.extend_from_slice(&out_buf[..n]);
                }
            }
            n = read_chunk(&mut err, &mut err_buf), if err.is_some() => {
                let n = n?;
                if n == 0 {
                    err = None;
                } else {
                    merged.extend_from_slice(&err_buf[..n]);
                }
            }
            else => break,
        }
    }

    Ok(merged)
}

async fn read_chunk<R: AsyncRead + Unpin>(
    reader: &mut Option<R>,
    buf: &mut [u8],
) -> io::Result<usize> {
    match reader {
        Some(r) => r.read(buf).await,
        None => Ok(0),
    }
}

/// Turn an exit code and captured output into the run's result.
///
/// `code` is `None` when the process was killed by a signal. A nonzero exit
/// with something on stdout counts as success: checkers commonly exit nonzero
/// to say "findings were reported".
pub fn classify(
    program: &str,
    code: Option<i32>,
    combine_output: bool,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
) -> Result<Vec<u8>, ExecError> {
    if code == Some(0) {
        return Ok(stdout);
    }

    let stderr = if combine_output {
        String::from_utf8_lossy(&stdout).into_owned()
    } else {
        String::from_utf8_lossy(&stderr).into_owned()
    };

    match code {
        None => Err(ExecError::Terminated {
            program: program.to_string(),
            stderr,
        }),
        Some(code) if stdout.is_empty() => Err(ExecError::EmptyStdout {
            program: program.to_string(),
            code,
            stderr,
        }),
        Some(code) => {
            debug!(program, code, "nonzero exit with output; treating as findings");
            Ok(stdout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_exit_returns_stdout() {
        let out = classify("tool", Some(0), false, b"ok\n".to_vec(), b"noise".to_vec()).unwrap();
        assert_eq!(out, b"ok\n");
    }

    #[test]
    fn zero_exit_with_empty_stdout_is_fine() {
        let out = classify("tool", Some(0), false, Vec::new(), Vec::new()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn nonzero_exit_with_output_is_benign() {
        let out = classify("tool", Some(1), false, b"finding".to_vec(), Vec::new()).unwrap();
        assert_eq!(out, b"finding");
    }

    #[test]
    fn nonzero_exit_without_output_fails() {
        let err = classify("tool", Some(2), false, Vec::new(), b"bad flag".to_vec()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("exited with status 2"), "{msg}");
        assert!(msg.contains("stdout was empty"), "{msg}");
        assert!(msg.contains("bad flag"), "{msg}");
    }

    #[test]
    fn signal_is_reported_as_terminated() {
        let err = classify("tool", None, false, b"partial".to_vec(), b"killed".to_vec()).unwrap_err();
        match err {
            ExecError::Terminated { program, stderr } => {
                assert_eq!(program, "tool");
                assert_eq!(stderr, "killed");
            }
            other => panic!("expected Terminated, got {other:?}"),
        }
    }

    #[test]
    fn combined_mode_reports_captured_output_as_stderr() {
        let err = classify("tool", None, true, b"mixed".to_vec(), Vec::new()).unwrap_err();
        assert!(err.to_string().contains("mixed"));
    }

    #[tokio::test]
    async fn interleaved_read_collects_both_streams() {
        let out: &[u8] = b"from stdout ";
        let err: &[u8] = b"from stderr";
        let merged = read_interleaved(Some(out), Some(err)).await.unwrap();
        let text = String::from_utf8(merged).unwrap();
        assert!(text.contains("from stdout"));
        assert!(text.contains("from stderr"));
        assert_eq!(text.len(), out.len() + err.len());
    }

    #[tokio::test]
    async fn unread_stdin_is_a_write_failure() {
        let Ok(true_bin) = which::which("true") else {
            eprintln!("skipping: `true` is necessary to run this test");
            return;
        };

        // Far more than a pipe buffer, so the write cannot finish before exit.
        let exec = Execution::new(true_bin, Vec::new(), vec![b'x'; 4 * 1024 * 1024], false);
        match exec.run().await {
            Err(ExecError::Stdin { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
            }
            other => panic!("expected Stdin error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn separate_read_keeps_streams_apart() {
        let out: &[u8] = b"out";
        let err: &[u8] = b"err";
        let (captured, stderr) = collect_output(Some(out), Some(err), false).await.unwrap();
        assert_eq!(captured, b"out");
        assert_eq!(stderr, b"err");
    }
}
