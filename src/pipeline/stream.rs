//! Streaming generation on a background worker.
//!
//! The orchestrator runs on its own tokio task and reports every checkpoint
//! as a [`StatusEvent`] over an unbounded channel, followed by exactly one
//! `result` or `error` event and then the [`StatusEvent::Done`] sentinel.
//! The consumer awaits each event as it arrives and joins the worker once
//! the sentinel is seen, so no event is lost and the consumer never finishes
//! before the worker does.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::agents::{AgentResult, IdeaOrchestrator, StatusCallback, StatusEvent};

/// A generation run in progress on a background worker.
pub struct GenerationStream {
    events: mpsc::UnboundedReceiver<StatusEvent>,
    worker: Option<JoinHandle<()>>,
    finished: bool,
}

impl std::fmt::Debug for GenerationStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationStream")
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl GenerationStream {
    /// Starts generating an idea on a dedicated tokio task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        orchestrator: Arc<IdeaOrchestrator>,
        topic: impl Into<String>,
        wildness: i32,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let topic = topic.into();

        let worker = tokio::spawn(async move {
            if let Err(e) = run_worker(&orchestrator, &topic, wildness, tx).await {
                tracing::debug!(error = %e, "Stream consumer went away before the run finished");
            }
        });

        Self {
            events: rx,
            worker: Some(worker),
            finished: false,
        }
    }

    /// Waits for the next event to forward.
    ///
    /// Returns `None` after the sentinel has been received and the worker
    /// joined. The sentinel itself is never returned.
    pub async fn next_event(&mut self) -> Option<StatusEvent> {
        if self.finished {
            return None;
        }

        match self.events.recv().await {
            Some(StatusEvent::Done) => {
                self.finished = true;
                self.join_worker().await
            }
            Some(event) => Some(event),
            None => {
                // Senders dropped without a sentinel: the worker died mid-run.
                self.finished = true;
                let failure = self.join_worker().await;
                Some(failure.unwrap_or_else(|| {
                    StatusEvent::error("generation worker exited without a result")
                }))
            }
        }
    }

    /// Forwards every event to `sink` until the stream ends.
    ///
    /// If `sink` fails (for example the client disconnected), the remaining
    /// events are drained and the worker is still joined before the sink's
    /// error is returned.
    pub async fn forward<F>(mut self, mut sink: F) -> AgentResult<()>
    where
        F: FnMut(StatusEvent) -> AgentResult<()>,
    {
        let mut sink_error = None;
        while let Some(event) = self.next_event().await {
            if sink_error.is_none() {
                if let Err(e) = sink(event) {
                    tracing::warn!(error = %e, "Event sink failed, draining remaining events");
                    sink_error = Some(e);
                }
            }
        }

        match sink_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Joins the worker, turning a panic into an error event.
    async fn join_worker(&mut self) -> Option<StatusEvent> {
        let worker = self.worker.take()?;
        match worker.await {
            Ok(()) => None,
            Err(e) => {
                tracing::error!(error = %e, "Generation worker failed");
                Some(StatusEvent::error(format!("generation worker failed: {}", e)))
            }
        }
    }
}

/// Runs the orchestrator, publishing status, the outcome and the sentinel.
async fn run_worker(
    orchestrator: &IdeaOrchestrator,
    topic: &str,
    wildness: i32,
    tx: mpsc::UnboundedSender<StatusEvent>,
) -> AgentResult<()> {
    let status_tx = tx.clone();
    let on_status: Box<StatusCallback> = Box::new(move |message: &str| {
        // A closed channel only means nobody is listening any more.
        let _ = status_tx.send(StatusEvent::status(message));
    });

    let outcome = match orchestrator
        .generate_idea(topic, wildness, Some(on_status.as_ref()))
        .await
    {
        Ok(result) => StatusEvent::result(result),
        Err(e) => {
            tracing::warn!(error = %e, "Streaming generation failed");
            StatusEvent::error(e.to_string())
        }
    };

    tx.send(outcome)?;
    tx.send(StatusEvent::Done)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::test_support::{routing_models, StageRoutingProvider, ROUTED_POLISHED};
    use crate::agents::{AgentError, IdeaStages, OrchestratorConfig};

    fn orchestrator(coherence: &str, novelty: &str) -> Arc<IdeaOrchestrator> {
        Arc::new(IdeaOrchestrator::new(
            IdeaStages::from_llm(
                Arc::new(StageRoutingProvider::new(coherence, novelty)),
                &routing_models(),
            ),
            OrchestratorConfig::new().with_version("stream-test"),
        ))
    }

    async fn collect(stream: GenerationStream) -> Vec<StatusEvent> {
        let mut events = Vec::new();
        stream
            .forward(|event| {
                events.push(event);
                Ok(())
            })
            .await
            .expect("forwarding succeeds");
        events
    }

    #[tokio::test]
    async fn test_stream_success_order() {
        let stream = GenerationStream::spawn(orchestrator("0.9", "0.8"), "gravity", 50);
        let events = collect(stream).await;

        let expected_status = [
            "mining assumptions",
            "composing",
            "checking coherence",
            "scoring novelty",
            "polishing",
        ];
        assert_eq!(events.len(), expected_status.len() + 1);
        for (event, expected) in events.iter().zip(expected_status) {
            assert_eq!(event, &StatusEvent::status(expected));
        }
        match events.last() {
            Some(StatusEvent::Result { data }) => {
                assert_eq!(data.idea, ROUTED_POLISHED);
                assert_eq!(data.version, "stream-test");
            }
            other => panic!("expected result event, got {:?}", other),
        }
        assert!(!events.iter().any(StatusEvent::is_done));
    }

    #[tokio::test]
    async fn test_stream_failure_ends_with_error() {
        let stream = GenerationStream::spawn(orchestrator("0.1", "0.8"), "gravity", 50);
        let events = collect(stream).await;

        let refining = events
            .iter()
            .filter(|e| **e == StatusEvent::status("refining"))
            .count();
        assert_eq!(refining, 3);
        match events.last() {
            Some(StatusEvent::Error { message }) => {
                assert!(message.contains("no novel idea generated"))
            }
            other => panic!("expected error event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_next_event_returns_none_after_sentinel() {
        let mut stream = GenerationStream::spawn(orchestrator("0.9", "0.8"), "gravity", 50);
        let mut count = 0;
        while stream.next_event().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 6);
        assert!(stream.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_sink_error_still_drains() {
        let stream = GenerationStream::spawn(orchestrator("0.9", "0.8"), "gravity", 50);
        let mut seen = 0;
        let err = stream
            .forward(|_| {
                seen += 1;
                Err(AgentError::ChannelError("client disconnected".to_string()))
            })
            .await
            .expect_err("sink error surfaces");

        assert!(matches!(err, AgentError::ChannelError(_)));
        assert_eq!(seen, 1);
    }

    #[tokio::test]
    async fn test_blank_topic_streams_error() {
        let stream = GenerationStream::spawn(orchestrator("0.9", "0.8"), "  ", 50);
        let events = collect(stream).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], StatusEvent::Error { .. }));
    }
}
