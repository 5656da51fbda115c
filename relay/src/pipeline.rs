//! Feed lines from a reader through the decoder into a sink

use crate::error::RelayResult;
use crate::sink::CommandSink;
use protocol::CommandDecoder;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

/// Counts gathered over one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Lines read, including blank ones
    pub lines: usize,
    /// Blank lines that were not decoded
    pub skipped: usize,
    /// Lines decoded into a typed command
    pub typed: usize,
    /// Lines passed through verbatim
    pub pass_through: usize,
}

/// Decode every non-blank line of `reader` and hand the result to `sink`.
///
/// The sink is flushed once the reader is exhausted.
pub async fn run<R, S>(
    decoder: &CommandDecoder,
    reader: R,
    sink: &mut S,
) -> RelayResult<PipelineStats>
where
    R: AsyncBufRead + Unpin,
    S: CommandSink + ?Sized,
{
    let mut stats = PipelineStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        stats.lines += 1;
        if line.trim().is_empty() {
            debug!("Skipping blank line {}", stats.lines);
            stats.skipped += 1;
            continue;
        }

        let command = decoder.decode(&line);
        if command.is_pass_through() {
            stats.pass_through += 1;
        } else {
            stats.typed += 1;
        }
        sink.accept(&command).await?;
    }

    sink.flush().await?;
    info!(
        "Relayed {} lines to {} sink ({} typed, {} passed through, {} blank)",
        stats.lines,
        sink.sink_name(),
        stats.typed,
        stats.pass_through,
        stats.skipped
    );

    Ok(stats)
}
