//! Per-task outcomes and the single writer that prints them.
//!
//! Tasks never touch stdout or stderr. Each one sends exactly one [`Outcome`]
//! over a channel, and [`spawn_output_writer`] renders every outcome as whole
//! lines, so output from concurrent tasks can interleave only at line
//! boundaries.

use std::io;
use std::path::PathBuf;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use super::error::ProbeError;

/// Terminal state of one probe task.
#[derive(Debug)]
pub enum Outcome {
    /// The input line was not a valid absolute URL. Nothing is printed.
    Ignored {
        /// The input line.
        raw_url: String,
    },
    /// The response was not selected for saving.
    Reported {
        /// The input line.
        raw_url: String,
        /// Response status code.
        status: u16,
    },
    /// The response was written to an artifact.
    Saved {
        /// Artifact path.
        path: PathBuf,
        /// The input line.
        raw_url: String,
        /// Response status code.
        status: u16,
    },
    /// The task ended early.
    Failed(ProbeError),
}

impl Outcome {
    /// Line for standard output, including the trailing newline.
    #[must_use]
    pub fn summary_line(&self) -> Option<String> {
        match self {
            Self::Reported { raw_url, status } => Some(format!("{raw_url} {status}\n")),
            Self::Saved {
                path,
                raw_url,
                status,
            } => Some(format!("{}: {raw_url} {status}\n", path.display())),
            Self::Ignored { .. } | Self::Failed(_) => None,
        }
    }

    /// Line for standard error, including the trailing newline.
    #[must_use]
    pub fn diagnostic_line(&self) -> Option<String> {
        match self {
            Self::Failed(error) => Some(format!("{error}\n")),
            _ => None,
        }
    }
}

/// Spawns the writer that drains `outcomes` until every sender is dropped.
///
/// Each line is written with a single `write_all` followed by a flush. The
/// writers are handed back when the channel closes.
pub fn spawn_output_writer<O, E>(
    mut outcomes: UnboundedReceiver<Outcome>,
    mut out: O,
    mut err: E,
) -> JoinHandle<io::Result<(O, E)>>
where
    O: AsyncWrite + Unpin + Send + 'static,
    E: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(outcome) = outcomes.recv().await {
            if let Some(line) = outcome.summary_line() {
                out.write_all(line.as_bytes()).await?;
                out.flush().await?;
            }
            if let Some(line) = outcome.diagnostic_line() {
                err.write_all(line.as_bytes()).await?;
                err.flush().await?;
            }
        }
        Ok((out, err))
    })
}
