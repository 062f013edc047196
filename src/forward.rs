//! Worker-to-master log forwarding
//!
//! Workers never open shared file handles. They render a line (or an
//! object-mode field map) and hand it to the master over the process's
//! control channel as a tagged message; the master validates the tag,
//! resolves the destination appender by name, and re-dispatches. Delivery
//! is best-effort, at-most-once: send failures are swallowed at the point
//! of send and never raise into a logging call.

use crate::core::error::{LoggerError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What travels with a forwarded record: a fully rendered line, or the
/// object-mode field map for the master to render with its own layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForwardPayload {
    Line(String),
    Fields(BTreeMap<String, String>),
}

/// Tagged envelope, distinguishable from other control-channel traffic by
/// its discriminant field. Validated on receipt before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForwardMessage {
    Log {
        appender: String,
        payload: ForwardPayload,
    },
}

impl ForwardMessage {
    #[must_use]
    pub fn line(appender: impl Into<String>, line: impl Into<String>) -> Self {
        ForwardMessage::Log {
            appender: appender.into(),
            payload: ForwardPayload::Line(line.into()),
        }
    }

    #[must_use]
    pub fn fields(appender: impl Into<String>, fields: BTreeMap<String, String>) -> Self {
        ForwardMessage::Log {
            appender: appender.into(),
            payload: ForwardPayload::Fields(fields),
        }
    }

    /// Serialize for an IPC hop.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Validate and decode a message received from an IPC hop. Anything
    /// that does not carry the expected tag fails here, before dispatch.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Message-passing bridge from a worker to the master.
pub trait Transport: Send + Sync {
    fn send(&self, message: &ForwardMessage) -> Result<()>;
}

/// In-process transport over a crossbeam channel: the wiring used between
/// a worker-role registry and the master listener in the same process,
/// and the seam to adapt an external IPC mechanism to.
pub struct ChannelTransport {
    tx: Sender<ForwardMessage>,
}

impl Transport for ChannelTransport {
    fn send(&self, message: &ForwardMessage) -> Result<()> {
        self.tx
            .send(message.clone())
            .map_err(|_| LoggerError::ChannelClosed)
    }
}

/// Create a connected transport/receiver pair.
#[must_use]
pub fn channel() -> (ChannelTransport, Receiver<ForwardMessage>) {
    let (tx, rx) = unbounded();
    (ChannelTransport { tx }, rx)
}
