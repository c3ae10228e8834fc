//! Line framing shared by the streaming decoders
//!
//! Both streaming wire formats (line-delimited JSON and `data:` framed SSE)
//! are line oriented. Transport chunks do not respect line boundaries, so
//! bytes are buffered until a full line is available. Buffering happens on raw
//! bytes, which keeps multi-byte UTF-8 sequences split across chunks intact.

use async_stream::stream;
use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

use super::error::LlmError;
use super::provider::EventStream;
use super::types::StreamEvent;

/// Raw response body as delivered by reqwest
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// What a decoder makes of a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Zero or more text fragments extracted from the line
    Emit(Vec<String>),
    /// End-of-stream marker: stop reading the transport
    Stop,
}

impl LineOutcome {
    pub fn nothing() -> Self {
        LineOutcome::Emit(Vec::new())
    }
}

/// Accumulates bytes and hands out complete lines
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    /// Append a chunk and return every line it completed, without terminators
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(newline_pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            lines.push(decode_line_bytes(&line));
        }
        lines
    }

    /// Flush a trailing line that had no terminator
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        Some(decode_line_bytes(&rest))
    }
}

fn decode_line_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(|c: char| c == '\n' || c == '\r')
        .to_string()
}

/// Drive a line decoder over a response body
///
/// Every fragment the decoder extracts is emitted as soon as its line is
/// complete. A transport failure mid-body becomes a single error event and
/// ends the sequence. Cancellation stops reading; the body is dropped with the
/// stream.
pub fn decode_lines<F>(
    mut byte_stream: ByteStream,
    cancel: CancellationToken,
    mut decode_line: F,
) -> EventStream
where
    F: FnMut(&str) -> LineOutcome + Send + 'static,
{
    Box::pin(stream! {
        let mut buffer = LineBuffer::default();
        let mut finished = false;

        while !finished {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("decode loop cancelled");
                    break;
                }
                chunk = byte_stream.next() => chunk,
            };

            let lines = match next {
                Some(Ok(bytes)) => buffer.push(&bytes),
                Some(Err(err)) => {
                    let err = LlmError::from(err);
                    tracing::error!(error = %err, "response body failed mid-stream");
                    yield err.into_event();
                    break;
                }
                None => {
                    finished = true;
                    buffer.finish().into_iter().collect()
                }
            };

            for line in lines {
                match decode_line(&line) {
                    LineOutcome::Emit(texts) => {
                        for text in texts {
                            yield StreamEvent::fragment(text);
                        }
                    }
                    LineOutcome::Stop => {
                        finished = true;
                        break;
                    }
                }
            }
        }
    })
}
