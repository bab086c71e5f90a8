//! Line transports between the session and a search engine.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::EngineError;

/// A bidirectional line channel to an engine.
///
/// `recv` must be cancel safe: the session races it against timeouts and
/// other event sources.
#[async_trait]
pub trait EngineTransport: Send {
    /// Send one line; the newline is added by the transport.
    async fn send(&mut self, line: &str) -> Result<(), EngineError>;

    /// Next line from the engine, or `None` once it has gone away.
    async fn recv(&mut self) -> Option<String>;
}

/// Engine running as a child process, speaking UCI over stdin/stdout.
///
/// Dropping the transport kills the process.
pub struct ProcessTransport {
    child: Child,
    stdin: ChildStdin,
    lines: mpsc::UnboundedReceiver<String>,
}

impl ProcessTransport {
    pub fn spawn(path: &Path, args: &[String]) -> Result<Self, EngineError> {
        let spawn_err = |source| EngineError::Spawn {
            path: path.display().to_string(),
            source,
        };
        let mut child = Command::new(path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_err)?;

        let stdin = child.stdin.take().ok_or(EngineError::Closed)?;
        let stdout = child.stdout.take().ok_or(EngineError::Closed)?;

        // Pump stdout into a channel so `recv` stays cancel safe
        let (tx, lines) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout).lines();
            loop {
                match reader.next_line().await {
                    Ok(Some(line)) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "engine stdout read failed");
                        break;
                    }
                }
            }
        });

        debug!(path = %path.display(), pid = ?child.id(), "engine process started");
        Ok(Self {
            child,
            stdin,
            lines,
        })
    }

    /// Wait for the process to exit after `quit`.
    pub async fn wait(mut self) -> Result<(), EngineError> {
        drop(self.stdin);
        self.child.wait().await?;
        Ok(())
    }
}

#[async_trait]
impl EngineTransport for ProcessTransport {
    async fn send(&mut self, line: &str) -> Result<(), EngineError> {
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<String> {
        self.lines.recv().await
    }
}

/// In-process transport: the other end is an [`EngineEnd`] that plays the
/// engine's part. Used to embed an engine running on a task, and in tests.
pub struct ChannelTransport {
    outbound: mpsc::UnboundedSender<String>,
    inbound: mpsc::UnboundedReceiver<String>,
}

/// The engine side of a [`ChannelTransport`].
pub struct EngineEnd {
    pub commands: mpsc::UnboundedReceiver<String>,
    pub replies: mpsc::UnboundedSender<String>,
}

impl ChannelTransport {
    pub fn pair() -> (ChannelTransport, EngineEnd) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        (
            ChannelTransport {
                outbound: cmd_tx,
                inbound: reply_rx,
            },
            EngineEnd {
                commands: cmd_rx,
                replies: reply_tx,
            },
        )
    }
}

#[async_trait]
impl EngineTransport for ChannelTransport {
    async fn send(&mut self, line: &str) -> Result<(), EngineError> {
        self.outbound
            .send(line.to_string())
            .map_err(|_| EngineError::Closed)
    }

    async fn recv(&mut self) -> Option<String> {
        self.inbound.recv().await
    }
}

impl EngineEnd {
    pub fn reply(&self, line: &str) {
        // A dropped session just means nobody is listening any more
        let _ = self.replies.send(line.to_string());
    }

    /// Commands received so far, without waiting.
    pub fn drain(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(line) = self.commands.try_recv() {
            out.push(line);
        }
        out
    }
}
