//! Line-delimited JSON decoder for Gemini responses

use tokio_util::sync::CancellationToken;

use crate::llm::core::lines::{decode_lines, ByteStream, LineOutcome};
use crate::llm::core::provider::EventStream;

use super::types::GenerateContentResponse;

/// Parse a stream of bytes as Gemini line-delimited JSON
///
/// Each non-blank line is one JSON object. Every text part of the first
/// candidate becomes one fragment. Lines that fail to parse, or parse without
/// the expected structure, produce nothing.
pub fn parse_ndjson_stream(byte_stream: ByteStream, cancel: CancellationToken) -> EventStream {
    decode_lines(byte_stream, cancel, decode_line)
}

/// Decode a single line of the stream
pub fn decode_line(line: &str) -> LineOutcome {
    let line = line.trim();
    if line.is_empty() {
        return LineOutcome::nothing();
    }

    match serde_json::from_str::<GenerateContentResponse>(line) {
        Ok(response) => LineOutcome::Emit(response.into_text_parts()),
        Err(e) => {
            tracing::debug!(error = %e, line, "dropping undecodable Gemini line");
            LineOutcome::nothing()
        }
    }
}

/// Extract the reply text from a whole non-streaming body
pub fn parse_body(body: &str) -> Option<String> {
    match serde_json::from_str::<GenerateContentResponse>(body) {
        Ok(response) => {
            let text = response.into_text_parts().concat();
            (!text.is_empty()).then_some(text)
        }
        Err(e) => {
            tracing::debug!(error = %e, "dropping undecodable Gemini body");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::core::types::StreamEvent;
    use bytes::Bytes;
    use futures::{stream, StreamExt};

    async fn collect(chunks: &[&'static [u8]]) -> Vec<StreamEvent> {
        let byte_stream: ByteStream = Box::pin(stream::iter(
            chunks
                .iter()
                .map(|c| Ok(Bytes::from_static(*c)))
                .collect::<Vec<_>>(),
        ));
        parse_ndjson_stream(byte_stream, CancellationToken::new())
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_parse_simple_line() {
        let events = collect(&[
            b"{\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Hello\"}]}}]}\n",
        ])
        .await;
        assert_eq!(events, vec![StreamEvent::fragment("Hello")]);
    }

    #[tokio::test]
    async fn test_parse_multiple_lines_and_parts() {
        let events = collect(&[
            b"{\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hello\"},{\"text\":\",\"}]}}]}\n",
            b"\n{\"candidates\":[{\"content\":{\"parts\":[{\"text\":\" World\"}]}}]}\n",
        ])
        .await;
        assert_eq!(
            events,
            vec![
                StreamEvent::fragment("Hello"),
                StreamEvent::fragment(","),
                StreamEvent::fragment(" World"),
            ]
        );
    }

    #[tokio::test]
    async fn test_parse_chunked_line() {
        let events = collect(&[
            b"{\"candidates\":[{\"content\":{\"role\":\"mo",
            b"del\",\"parts\":[{\"text\":\"Hello\"}]}}]}\n",
        ])
        .await;
        assert_eq!(events, vec![StreamEvent::fragment("Hello")]);
    }

    #[tokio::test]
    async fn test_invalid_json_is_dropped() {
        let events = collect(&[
            b"{invalid json}\n",
            b"{\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"ok\"}]}}]}\n",
        ])
        .await;
        assert_eq!(events, vec![StreamEvent::fragment("ok")]);
    }

    #[tokio::test]
    async fn test_missing_structure_is_dropped() {
        let events = collect(&[
            b"{\"usageMetadata\":{\"promptTokenCount\":3}}\n",
            b"{\"candidates\":[{\"finishReason\":\"STOP\"}]}\n",
        ])
        .await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_unterminated_last_line_is_decoded() {
        let events =
            collect(&[b"{\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"tail\"}]}}]}"]).await;
        assert_eq!(events, vec![StreamEvent::fragment("tail")]);
    }

    #[test]
    fn test_parse_body_concatenates_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Hi"},{"text":"!"}]}}]}"#;
        assert_eq!(parse_body(body).as_deref(), Some("Hi!"));
        assert!(parse_body(r#"{"candidates":[]}"#).is_none());
        assert!(parse_body("not json").is_none());
    }
}
