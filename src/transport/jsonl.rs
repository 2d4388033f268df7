//! # JSON Lines Transport
//!
//! One JSON message per line, over any tokio reader/writer.
//!
//! ```text
//! stdin : {"buttons":[0,1],"axes":[0.0,0.0]}
//! stdout: {"steering_angle":0.0,"speed":150.0}
//! ```
//!
//! Blank input lines are skipped. A line that does not decode as a
//! [`JoystickState`], invalid UTF-8 included, is reported as a recoverable
//! error and the stream continues with the next line.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use super::{CommandSink, JoystickSource};
use crate::error::{Result, TeleopError};
use crate::messages::{DriveCommand, JoystickState};

/// Reads joystick snapshots, one JSON object per line.
pub struct JsonLinesSource<R> {
    reader: R,
    buf: Vec<u8>,
    line_number: u64,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesSource<R> {
    /// Wraps a buffered reader.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use movr_teleop::transport::jsonl::JsonLinesSource;
    /// use tokio::io::BufReader;
    ///
    /// let source = JsonLinesSource::new(BufReader::new(tokio::io::stdin()));
    /// ```
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_number: 0,
        }
    }

    /// Number of lines read so far, blank lines included.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> JoystickSource for JsonLinesSource<R> {
    async fn next_state(&mut self) -> Option<Result<JoystickState>> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf).await {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(TeleopError::Io(e))),
            }
            self.line_number += 1;

            if self.buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            // Decoded from bytes so a line of invalid UTF-8 only fails itself
            return Some(serde_json::from_slice(&self.buf).map_err(|e| {
                debug!("Line {} is not a joystick state: {}", self.line_number, e);
                TeleopError::Json(e)
            }));
        }
    }
}

/// Writes drive commands, one JSON object per line.
///
/// Flushes after every command so a downstream reader sees each command as
/// soon as it is published.
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesSink<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> CommandSink for JsonLinesSink<W> {
    async fn publish(&mut self, command: DriveCommand) -> Result<()> {
        let mut line = serde_json::to_vec(&command)?;
        line.push(b'\n');

        self.writer.write_all(&line).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
