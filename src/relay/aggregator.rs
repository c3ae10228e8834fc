//! Forward-and-accumulate wrapper around a provider stream

use async_stream::stream;
use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::llm::{EventStream, Message, StreamEvent};
use crate::store::ChatStore;

/// Where the finished reply is stored
#[derive(Clone)]
pub struct ReplySink {
    pub store: Arc<dyn ChatStore>,
    pub session_id: Uuid,
    /// Model key recorded on the assistant message
    pub model: String,
}

/// Accumulated reply that is written exactly once
///
/// Persisting through `finish` waits for the write. If the owning stream is
/// dropped first, `Drop` hands whatever was accumulated to a background task.
struct PendingReply {
    sink: ReplySink,
    text: String,
    persisted: bool,
}

impl PendingReply {
    fn new(sink: ReplySink) -> Self {
        Self {
            sink,
            text: String::new(),
            persisted: false,
        }
    }

    fn push(&mut self, text: &str) {
        self.text.push_str(text);
    }

    async fn finish(&mut self) {
        if let Some(task) = self.spawn_persist() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "reply persistence task failed");
            }
        }
    }

    fn spawn_persist(&mut self) -> Option<tokio::task::JoinHandle<()>> {
        if self.persisted {
            return None;
        }
        self.persisted = true;

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(session_id = %self.sink.session_id, "no runtime; assistant reply not persisted");
                return None;
            }
        };

        let sink = self.sink.clone();
        let message = Message::assistant(std::mem::take(&mut self.text), sink.model.clone());
        Some(handle.spawn(async move {
            match sink.store.append_message(sink.session_id, &message).await {
                Ok(()) => tracing::info!(
                    session_id = %sink.session_id,
                    model = %sink.model,
                    chars = message.content.len(),
                    "persisted assistant reply"
                ),
                Err(e) => tracing::error!(
                    session_id = %sink.session_id,
                    error = %e,
                    "failed to persist assistant reply"
                ),
            }
        }))
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        if !self.persisted {
            tracing::debug!(session_id = %self.sink.session_id, "reply stream dropped early");
            let _ = self.spawn_persist();
        }
    }
}

/// Wrap provider events so the reply is persisted exactly once
///
/// Fragments are forwarded as they arrive and empty ones are skipped. An error
/// event is forwarded, its sentinel text appended to the reply, and the
/// sequence closes. The reply is persisted after upstream exhaustion, after an
/// error, on cancellation, or (best effort) when the stream is dropped. The
/// sequence always closes with `StreamEvent::End`.
pub fn aggregate(
    mut events: EventStream,
    sink: ReplySink,
    cancel: CancellationToken,
) -> EventStream {
    Box::pin(stream! {
        let mut reply = PendingReply::new(sink);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("relay cancelled; persisting partial reply");
                    None
                }
                event = events.next() => event,
            };

            match next {
                Some(StreamEvent::Fragment { text }) => {
                    if text.is_empty() {
                        continue;
                    }
                    reply.push(&text);
                    yield StreamEvent::Fragment { text };
                }
                Some(event @ StreamEvent::Error { .. }) => {
                    if let Some(text) = event.as_text() {
                        reply.push(&text);
                    }
                    yield event;
                    break;
                }
                Some(StreamEvent::End) | None => break,
            }
        }

        drop(events);
        reply.finish().await;
        yield StreamEvent::End;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ErrorKind;
    use crate::store::{self, Session, UserProfile};
    use async_trait::async_trait;
    use futures::stream;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        appended: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl ChatStore for RecordingStore {
        async fn upsert_user(&self, _profile: &UserProfile) -> store::Result<Uuid> {
            Ok(Uuid::new_v4())
        }

        async fn create_session(&self, owner: Option<Uuid>, title: &str) -> store::Result<Session> {
            Ok(Session {
                id: Uuid::new_v4(),
                owner,
                title: title.to_string(),
                started_at: chrono::Utc::now(),
            })
        }

        async fn get_session(&self, _session_id: Uuid) -> store::Result<Option<Session>> {
            Ok(None)
        }

        async fn append_message(&self, _session_id: Uuid, message: &Message) -> store::Result<()> {
            self.appended.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn load_history(&self, _session_id: Uuid, _limit: Option<i64>) -> store::Result<Vec<Message>> {
            Ok(Vec::new())
        }
    }

    fn sink(store: &Arc<RecordingStore>) -> ReplySink {
        ReplySink {
            store: store.clone(),
            session_id: Uuid::new_v4(),
            model: "llama-3.1-8b".to_string(),
        }
    }

    fn events(items: Vec<StreamEvent>) -> EventStream {
        Box::pin(stream::iter(items))
    }

    fn persisted(store: &RecordingStore) -> Vec<String> {
        store
            .appended
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.content.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_forwards_and_persists_once() {
        let store = Arc::new(RecordingStore::default());
        let out: Vec<_> = aggregate(
            events(vec![
                StreamEvent::fragment("Hi"),
                StreamEvent::fragment(""),
                StreamEvent::fragment("!"),
            ]),
            sink(&store),
            CancellationToken::new(),
        )
        .collect()
        .await;

        assert_eq!(
            out,
            vec![
                StreamEvent::fragment("Hi"),
                StreamEvent::fragment("!"),
                StreamEvent::End,
            ]
        );
        assert_eq!(persisted(&store), vec!["Hi!"]);
        let appended = store.appended.lock().unwrap();
        assert_eq!(appended[0].model.as_deref(), Some("llama-3.1-8b"));
    }

    #[tokio::test]
    async fn test_error_is_terminal_and_persisted_with_partial_text() {
        let store = Arc::new(RecordingStore::default());
        let out: Vec<_> = aggregate(
            events(vec![
                StreamEvent::fragment("Part"),
                StreamEvent::error(ErrorKind::Transport, "connection reset"),
                StreamEvent::fragment("never"),
            ]),
            sink(&store),
            CancellationToken::new(),
        )
        .collect()
        .await;

        assert_eq!(out.len(), 3);
        assert!(matches!(out[1], StreamEvent::Error { .. }));
        assert_eq!(out[2], StreamEvent::End);
        assert_eq!(persisted(&store), vec!["PartError: connection reset"]);
    }

    #[tokio::test]
    async fn test_cancellation_persists_partial_reply() {
        let store = Arc::new(RecordingStore::default());
        let cancel = CancellationToken::new();
        let upstream: EventStream = Box::pin(
            stream::iter(vec![StreamEvent::fragment("partial")]).chain(stream::pending()),
        );

        let mut relayed = aggregate(upstream, sink(&store), cancel.clone());
        assert_eq!(relayed.next().await, Some(StreamEvent::fragment("partial")));

        cancel.cancel();
        assert_eq!(relayed.next().await, Some(StreamEvent::End));
        assert_eq!(relayed.next().await, None);
        assert_eq!(persisted(&store), vec!["partial"]);
    }

    #[tokio::test]
    async fn test_dropped_stream_persists_in_background() {
        let store = Arc::new(RecordingStore::default());
        let upstream: EventStream = Box::pin(
            stream::iter(vec![StreamEvent::fragment("half")]).chain(stream::pending()),
        );

        let mut relayed = aggregate(upstream, sink(&store), CancellationToken::new());
        assert_eq!(relayed.next().await, Some(StreamEvent::fragment("half")));
        drop(relayed);

        for _ in 0..50 {
            if !persisted(&store).is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(persisted(&store), vec!["half"]);
    }

    #[tokio::test]
    async fn test_reply_lands_in_its_session() {
        let store = Arc::new(RecordingStore::default());
        let session = store.create_session(None, "New Chat").await.unwrap();
        let sink = ReplySink {
            session_id: session.id,
            ..sink(&store)
        };

        let out: Vec<_> = aggregate(events(vec![]), sink, CancellationToken::new())
            .collect()
            .await;

        assert_eq!(out, vec![StreamEvent::End]);
        assert_eq!(session.title, "New Chat");
        assert_eq!(persisted(&store), vec![""]);
    }
}
