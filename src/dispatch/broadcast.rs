//! Broadcast channel.
//!
//! Publishes the receipt text as a generic "print" message for any companion
//! print app listening on the device. The text is stored under two keys
//! (`text` and `PRINT_TEXT` by default) because receivers disagree on the
//! name. Fire-and-forget: nothing is acknowledged.
//!
//! The stock [`UdpBroadcaster`] sends the message as one JSON datagram:
//!
//! ```text
//! {"action":"android.intent.action.PRINT","extras":{"PRINT_TEXT":"…","text":"…"}}
//! ```

use std::collections::BTreeMap;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::Channel;
use crate::error::BoletaError;
use crate::receipt::ReceiptJob;

/// A system-wide message: an action name plus string extras.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Broadcast {
    pub action: String,
    pub extras: BTreeMap<String, String>,
}

/// Emits broadcasts. Implementations must not wait for receivers.
pub trait Broadcaster: Send + Sync {
    fn send(&self, broadcast: &Broadcast) -> Result<(), BoletaError>;
}

/// Sends each broadcast as a JSON datagram to a (usually broadcast) address.
#[derive(Debug, Clone)]
pub struct UdpBroadcaster {
    target: SocketAddr,
}

impl UdpBroadcaster {
    pub fn new(target: SocketAddr) -> Self {
        Self { target }
    }
}

impl Broadcaster for UdpBroadcaster {
    fn send(&self, broadcast: &Broadcast) -> Result<(), BoletaError> {
        let payload = serde_json::to_vec(broadcast)
            .map_err(|e| BoletaError::Transport(format!("Failed to encode broadcast: {}", e)))?;

        let bind_addr: SocketAddr = if self.target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.set_broadcast(true)?;
        let sent = socket.send_to(&payload, self.target)?;

        if sent != payload.len() {
            return Err(BoletaError::Transport(format!(
                "Broadcast truncated: sent {} of {} bytes",
                sent,
                payload.len()
            )));
        }

        debug!(target = %self.target, bytes = sent, "broadcast sent");
        Ok(())
    }
}

/// Channel 1: publish the raw text for companion print apps.
pub struct BroadcastChannel {
    action: String,
    keys: Vec<String>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl BroadcastChannel {
    pub fn new(action: String, keys: Vec<String>, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            action,
            keys,
            broadcaster,
        }
    }

    /// Build the message for a job, the text under every configured key.
    pub fn broadcast_for(&self, job: &ReceiptJob) -> Broadcast {
        Broadcast {
            action: self.action.clone(),
            extras: self
                .keys
                .iter()
                .map(|key| (key.clone(), job.text().to_string()))
                .collect(),
        }
    }
}

impl Channel for BroadcastChannel {
    fn name(&self) -> &'static str {
        "broadcast"
    }

    fn attempt(&self, job: &ReceiptJob) -> Result<(), BoletaError> {
        self.broadcaster.send(&self.broadcast_for(job))
    }
}
