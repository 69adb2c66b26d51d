use super::event::DisconnectReason;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio_tungstenite::tungstenite::Message;

/// Consumer callback receiving the raw payload of every inbound message
pub type MessageHandler = Arc<dyn Fn(String) + Send + Sync>;

/// What the read loop should do after a frame was dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Continue,
    Closed(DisconnectReason),
}

/// Routes inbound frames of one channel connection to the consumer
pub struct FrameDispatcher {
    channel: String,
    handler: MessageHandler,
}

impl FrameDispatcher {
    pub fn new(channel: impl Into<String>, handler: MessageHandler) -> Self {
        Self {
            channel: channel.into(),
            handler,
        }
    }

    /// Handles a single frame. Text payloads go to the handler untouched.
    ///
    /// A panicking handler is logged and does not stop the connection.
    pub fn dispatch(&self, msg: Message) -> Dispatch {
        match msg {
            Message::Text(text) => {
                tracing::debug!(channel = %self.channel, "Received message: {}", text.as_str());
                self.deliver(text.as_str().to_owned());
                Dispatch::Continue
            }
            Message::Close(frame) => {
                let reason = match frame {
                    Some(close_frame) => {
                        tracing::warn!(
                            channel = %self.channel,
                            "Server closed connection: code={:?}, reason='{}'",
                            close_frame.code,
                            close_frame.reason.as_str()
                        );
                        DisconnectReason::with_code(
                            close_frame.reason.as_str(),
                            u16::from(close_frame.code),
                        )
                    }
                    None => {
                        tracing::warn!(
                            channel = %self.channel,
                            "Server closed connection without close frame"
                        );
                        DisconnectReason::new("server closed connection")
                    }
                };
                Dispatch::Closed(reason)
            }
            Message::Ping(data) => {
                tracing::debug!("Received ping ({} bytes)", data.len());
                Dispatch::Continue
            }
            Message::Pong(data) => {
                tracing::debug!("Received pong ({} bytes)", data.len());
                Dispatch::Continue
            }
            Message::Binary(data) => {
                tracing::warn!(
                    channel = %self.channel,
                    "Ignoring unexpected binary message ({} bytes)",
                    data.len()
                );
                Dispatch::Continue
            }
            Message::Frame(_) => {
                tracing::debug!("Received raw frame (internal)");
                Dispatch::Continue
            }
        }
    }

    fn deliver(&self, payload: String) {
        let handler = &self.handler;
        if let Err(cause) = panic::catch_unwind(AssertUnwindSafe(|| handler(payload))) {
            let detail = cause
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| cause.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            tracing::error!(channel = %self.channel, "Message handler panicked: {}", detail);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio_tungstenite::tungstenite::protocol::CloseFrame;
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

    fn recording_dispatcher() -> (FrameDispatcher, Arc<Mutex<Vec<String>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let handler: MessageHandler = Arc::new(move |payload: String| sink.lock().unwrap().push(payload));
        (FrameDispatcher::new("orders", handler), received)
    }

    #[test]
    fn test_text_forwarded_unmodified_once() {
        let (dispatcher, received) = recording_dispatcher();

        let payload = r#"  {"order": 42, "note": "ünïcode"}  "#;
        assert_eq!(dispatcher.dispatch(Message::text(payload)), Dispatch::Continue);

        assert_eq!(received.lock().unwrap().as_slice(), [payload.to_string()]);
    }

    #[test]
    fn test_panicking_handler_does_not_stop_dispatch() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let handler: MessageHandler = Arc::new(move |payload: String| {
            if payload == "boom" {
                panic!("handler failed on {}", payload);
            }
            sink.lock().unwrap().push(payload);
        });
        let dispatcher = FrameDispatcher::new("orders", handler);

        assert_eq!(dispatcher.dispatch(Message::text("boom")), Dispatch::Continue);
        assert_eq!(dispatcher.dispatch(Message::text("after")), Dispatch::Continue);

        assert_eq!(received.lock().unwrap().as_slice(), ["after".to_string()]);
    }

    #[test]
    fn test_control_and_binary_frames_not_forwarded() {
        let (dispatcher, received) = recording_dispatcher();

        assert_eq!(
            dispatcher.dispatch(Message::Ping(vec![1u8, 2].into())),
            Dispatch::Continue
        );
        assert_eq!(
            dispatcher.dispatch(Message::Pong(Vec::<u8>::new().into())),
            Dispatch::Continue
        );
        assert_eq!(
            dispatcher.dispatch(Message::binary(vec![0xde, 0xad])),
            Dispatch::Continue
        );

        assert!(received.lock().unwrap().is_empty());
    }

    #[test]
    fn test_close_frame_carries_code_and_reason() {
        let (dispatcher, received) = recording_dispatcher();

        let frame = CloseFrame {
            code: CloseCode::Away,
            reason: "restarting".into(),
        };
        match dispatcher.dispatch(Message::Close(Some(frame))) {
            Dispatch::Closed(reason) => {
                assert_eq!(reason.code, Some(1001));
                assert_eq!(reason.message, "restarting");
                assert!(!reason.initiated_locally);
            }
            other => panic!("expected close, got {:?}", other),
        }

        assert_eq!(
            dispatcher.dispatch(Message::Close(None)),
            Dispatch::Closed(DisconnectReason::new("server closed connection"))
        );
        assert!(received.lock().unwrap().is_empty());
    }
}
