//! Cross-thread dispatch queue
//!
//! Observers may run off the context thread. They post plain event data
//! through a [`QueueSender`]; the context thread drains the queue into an
//! [`EventDispatcher`] when it is safe to run script.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use jsbridge_engine::{ScriptContext, ScriptValue};

use super::{DispatchOutcome, EventDispatcher};
use crate::config::BridgeConfig;
use crate::events::NativeEventData;

/// Dispatch queue errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The queue already holds its capacity of pending events
    #[error("Dispatch queue full (capacity {0})")]
    Full(usize),

    /// The receiving side was dropped
    #[error("Dispatch queue disconnected")]
    Disconnected,
}

/// Event waiting for the context thread
#[derive(Debug, Clone, PartialEq)]
pub enum PendingDispatch {
    Event(NativeEventData),
    IntersectionChange {
        event: NativeEventData,
        intersection_ratio: f64,
    },
    Custom {
        event: NativeEventData,
        detail: ScriptValue,
    },
}

impl PendingDispatch {
    pub fn event(&self) -> &NativeEventData {
        match self {
            Self::Event(event) => event,
            Self::IntersectionChange { event, .. } => event,
            Self::Custom { event, .. } => event,
        }
    }
}

/// Sending half, cloneable and `Send`
#[derive(Debug, Clone)]
pub struct QueueSender {
    sender: Sender<PendingDispatch>,
    capacity: usize,
}

impl QueueSender {
    /// Queue an event without blocking
    ///
    /// This is safe to call from any thread. A full queue drops the event.
    #[tracing::instrument(skip_all, fields(event_type = %pending.event().event_type))]
    pub fn post(&self, pending: PendingDispatch) -> Result<(), QueueError> {
        match self.sender.try_send(pending) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Dispatch queue full, dropping event");
                Err(QueueError::Full(self.capacity))
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!("Dispatch queue disconnected");
                Err(QueueError::Disconnected)
            }
        }
    }

    /// Queue an event, blocking while the queue is full
    ///
    /// # Warning
    /// Never call from the context thread: it is the only consumer, so a full
    /// queue would never drain.
    pub fn post_blocking(&self, pending: PendingDispatch) -> Result<(), QueueError> {
        self.sender.send(pending).map_err(|e| {
            tracing::error!("Failed to queue event (blocking): {}", e);
            QueueError::Disconnected
        })
    }
}

/// Bounded queue feeding one context's dispatcher
#[derive(Debug)]
pub struct DispatchQueue {
    sender: QueueSender,
    receiver: Receiver<PendingDispatch>,
    capacity: usize,
}

impl DispatchQueue {
    /// Create a queue holding at most `capacity` pending events
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        Self {
            sender: QueueSender { sender, capacity },
            receiver,
            capacity,
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.dispatch_queue_capacity)
    }

    /// Handle for producer threads
    pub fn sender(&self) -> QueueSender {
        self.sender.clone()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check how many events are currently queued
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Dispatch queued events on the context thread
    ///
    /// Processes at most `capacity` events per call so producers cannot keep
    /// the context thread busy forever.
    #[tracing::instrument(skip_all)]
    pub fn drain(&self, ctx: &mut ScriptContext, dispatcher: &EventDispatcher) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::new();

        while let Ok(pending) = self.receiver.try_recv() {
            let outcome = match pending {
                PendingDispatch::Event(event) => dispatcher.dispatch_event(ctx, event),
                PendingDispatch::IntersectionChange {
                    event,
                    intersection_ratio,
                } => dispatcher.dispatch_intersection_change(ctx, event, intersection_ratio),
                PendingDispatch::Custom { event, detail } => {
                    dispatcher.dispatch_custom(ctx, event, detail)
                }
            };
            outcomes.push(outcome);

            if outcomes.len() >= self.capacity {
                break;
            }
        }

        outcomes
    }
}

impl Default for DispatchQueue {
    fn default() -> Self {
        Self::from_config(&BridgeConfig::default())
    }
}
