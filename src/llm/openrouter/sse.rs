//! Server-Sent Events decoder for OpenAI-compatible streams

use tokio_util::sync::CancellationToken;

use crate::llm::core::lines::{decode_lines, ByteStream, LineOutcome};
use crate::llm::core::provider::EventStream;

use super::types::ChatCompletionResponse;

const DATA_PREFIX: &str = "data:";
const DONE_MARKER: &str = "[DONE]";

/// Parse a stream of bytes as `data:` framed SSE
///
/// `data: [DONE]` ends the sequence even if the connection stays open.
pub fn parse_sse_stream(byte_stream: ByteStream, cancel: CancellationToken) -> EventStream {
    decode_lines(byte_stream, cancel, decode_line)
}

/// Decode a single SSE line
///
/// Comments (`: OPENROUTER PROCESSING`), `event:` lines and blank separators
/// carry no content.
pub fn decode_line(line: &str) -> LineOutcome {
    let Some(data) = line.strip_prefix(DATA_PREFIX) else {
        return LineOutcome::nothing();
    };
    let data = data.trim();

    if data == DONE_MARKER {
        return LineOutcome::Stop;
    }
    if data.is_empty() {
        return LineOutcome::nothing();
    }

    match serde_json::from_str::<ChatCompletionResponse>(data) {
        Ok(chunk) => LineOutcome::Emit(chunk.into_delta_text().into_iter().collect()),
        Err(e) => {
            tracing::debug!(error = %e, data, "dropping undecodable SSE payload");
            LineOutcome::nothing()
        }
    }
}

/// Extract the reply text from a whole non-streaming body
pub fn parse_body(body: &str) -> Option<String> {
    match serde_json::from_str::<ChatCompletionResponse>(body) {
        Ok(response) => response.into_message_text(),
        Err(e) => {
            tracing::debug!(error = %e, "dropping undecodable completion body");
            None
        }
    }
}
