//! Status reporting for the bootstrap run.
//!
//! A run signals exactly two transition points: start, and end with a success flag.
//! [`StatusGuard`] guarantees `end` fires once, as `end(false)` unless the success
//! path called [`StatusGuard::succeed`].

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::error::TrySendError;

/// Receives start/end notifications for a run
pub trait StatusReporter: Send + Sync {
    fn start(&self, message: &str);

    fn end(&self, success: bool);
}

/// Status event, as sent over a channel
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StatusEvent {
    Started {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        cluster: Option<String>,
    },
    Ended {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        cluster: Option<String>,
    },
}

/// Channel-based status reporter.
pub struct ChannelStatusReporter {
    sender: tokio::sync::mpsc::Sender<StatusEvent>,
    cluster: Option<String>,
}

impl ChannelStatusReporter {
    pub fn new(sender: tokio::sync::mpsc::Sender<StatusEvent>) -> Self {
        Self {
            sender,
            cluster: None,
        }
    }

    pub fn with_cluster_name(
        sender: tokio::sync::mpsc::Sender<StatusEvent>,
        cluster: String,
    ) -> Self {
        Self {
            sender,
            cluster: Some(cluster),
        }
    }
}

impl StatusReporter for ChannelStatusReporter {
    fn start(&self, message: &str) {
        let _ = self.sender.try_send(StatusEvent::Started {
            message: message.to_string(),
            cluster: self.cluster.clone(),
        });
    }

    /// The end signal must not be lost: when the channel is full it is sent
    /// from a spawned task once the consumer makes room.
    fn end(&self, success: bool) {
        let event = StatusEvent::Ended {
            success,
            cluster: self.cluster.clone(),
        };
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let sender = self.sender.clone();
                    handle.spawn(async move {
                        if sender.send(event).await.is_err() {
                            tracing::warn!("[Status] Receiver dropped before end signal");
                        }
                    });
                }
                Err(_) => {
                    tracing::warn!("[Status] Status channel full, end signal dropped");
                }
            },
            Err(TrySendError::Closed(_)) => {
                tracing::warn!("[Status] Status channel closed, end signal dropped");
            }
        }
    }
}

/// Status reporter that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatusReporter;

impl StatusReporter for LogStatusReporter {
    fn start(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn end(&self, success: bool) {
        if success {
            tracing::info!("✓ control-plane started");
        } else {
            tracing::error!("✗ control-plane failed to start");
        }
    }
}

/// Scoped start/end notification: `end(false)` on drop unless marked successful.
pub struct StatusGuard<'a> {
    reporter: &'a dyn StatusReporter,
    success: bool,
}

impl<'a> StatusGuard<'a> {
    pub fn start(reporter: &'a dyn StatusReporter, message: &str) -> Self {
        reporter.start(message);
        Self {
            reporter,
            success: false,
        }
    }

    /// Consume the guard, ending the run as successful
    pub fn succeed(mut self) {
        self.success = true;
    }
}

impl Drop for StatusGuard<'_> {
    fn drop(&mut self) {
        self.reporter.end(self.success);
    }
}
