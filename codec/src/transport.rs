//! Interfaces to the transport that carries encoded packets.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Opaque identity of a connected peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PeerId(u64);

impl PeerId {
    /// The server, as seen from a client.
    pub const SERVER: Self = Self(0);

    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for PeerId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer#{}", self.0)
    }
}

/// Where an outgoing packet should go.
///
/// Peer selection for [`Destination::AllWatching`] belongs to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    /// One connected client.
    Peer(PeerId),
    /// An explicit set of clients.
    Peers(Vec<PeerId>),
    /// Every client observing the given entity or area.
    AllWatching(u64),
    /// Every connected client.
    Everyone,
    /// The server (client-side sends).
    Server,
}

impl Destination {
    #[must_use]
    pub const fn is_server(&self) -> bool {
        matches!(self, Self::Server)
    }
}

/// Failures reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("peer {peer} is not connected")]
    Disconnected { peer: PeerId },

    #[error("channel '{channel}' is not open")]
    ChannelClosed { channel: String },

    #[error("{0}")]
    Other(String),
}

/// Delivers encoded frames. The transport owns framing and peer selection.
pub trait Transport {
    fn send(
        &self,
        channel: &str,
        destination: &Destination,
        bytes: &[u8],
    ) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(
        &self,
        channel: &str,
        destination: &Destination,
        bytes: &[u8],
    ) -> Result<(), TransportError> {
        (**self).send(channel, destination, bytes)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(
        &self,
        channel: &str,
        destination: &Destination,
        bytes: &[u8],
    ) -> Result<(), TransportError> {
        (**self).send(channel, destination, bytes)
    }
}
