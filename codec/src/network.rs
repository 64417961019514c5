//! Named channels, send-side authorization and receive dispatch.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use schema::{SchemaRegistry, Side};
use tracing::{debug, warn};

use crate::error::{CodecError, CodecResult};
use crate::{
    decode, encode, CodecLimits, DecodedMessage, Destination, PeerId, PendingMessage, Transport,
};

/// Callback invoked for each received packet.
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(PeerId, &DecodedMessage<Handler>) + Send + Sync>);

impl Handler {
    pub fn new(
        callback: impl Fn(PeerId, &DecodedMessage<Handler>) + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(callback))
    }

    /// A handler that ignores every packet.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|_, _| {})
    }

    pub fn call(&self, peer: PeerId, message: &DecodedMessage<Handler>) {
        (self.0)(peer, message);
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// A channel registry whose schemas carry [`Handler`]s.
pub type Channel = SchemaRegistry<Handler>;

/// Immutable set of channels, keyed by registry name.
///
/// Registries are handed in explicitly through [`NetworkBuilder`]; nothing
/// registers itself globally.
#[derive(Debug, Clone)]
pub struct Network {
    channels: BTreeMap<String, Arc<Channel>>,
    limits: CodecLimits,
}

impl Network {
    #[must_use]
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::default()
    }

    pub fn channel(&self, name: &str) -> CodecResult<&Arc<Channel>> {
        self.channels
            .get(name)
            .ok_or_else(|| CodecError::UnknownChannel {
                channel: name.to_string(),
            })
    }

    /// Channel names in sorted order.
    pub fn channels(&self) -> impl Iterator<Item = &str> + '_ {
        self.channels.keys().map(String::as_str)
    }

    #[must_use]
    pub const fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    /// Starts a message on the only channel.
    pub fn message(&self, packet: &str) -> CodecResult<PendingMessage<Handler>> {
        let mut channels = self.channels.values();
        match (channels.next(), channels.next()) {
            (Some(channel), None) => PendingMessage::new(Arc::clone(channel)).packet(packet),
            (None, _) => Err(CodecError::InvalidState {
                reason: "network has no channels",
            }),
            (Some(_), Some(_)) => Err(CodecError::InvalidState {
                reason: "network has several channels; pick one with message_on",
            }),
        }
    }

    /// Starts a message on a named channel.
    pub fn message_on(&self, channel: &str, packet: &str) -> CodecResult<PendingMessage<Handler>> {
        PendingMessage::new(Arc::clone(self.channel(channel)?)).packet(packet)
    }

    /// Encodes `message` and hands it to `transport`.
    ///
    /// Server-handled packets may only travel to [`Destination::Server`];
    /// client-handled packets may travel anywhere else. The message must have
    /// been started from one of this network's own channels.
    pub fn send(
        &self,
        message: &PendingMessage<Handler>,
        destination: &Destination,
        transport: &impl Transport,
    ) -> CodecResult<()> {
        let Some(schema) = message.schema() else {
            return Err(CodecError::InvalidState {
                reason: "no packet selected",
            });
        };
        let allowed = match schema.side() {
            Side::Server => destination.is_server(),
            Side::Client => !destination.is_server(),
        };
        if !allowed {
            let actual = if destination.is_server() {
                Side::Server
            } else {
                Side::Client
            };
            return Err(CodecError::WrongSide {
                packet: schema.id().to_string(),
                expected: schema.side(),
                actual,
            });
        }

        let channel = message.registry().name();
        if !Arc::ptr_eq(message.registry(), self.channel(channel)?) {
            return Err(CodecError::ForeignChannel {
                channel: channel.to_string(),
            });
        }
        let bytes = encode(message, &self.limits)?;
        debug!(
            channel,
            packet = schema.id(),
            ?destination,
            bytes = bytes.len(),
            "sending packet"
        );
        transport.send(channel, destination, &bytes)?;
        Ok(())
    }

    /// Decodes a frame received on `side` from `peer` and runs its handler.
    ///
    /// Rejected frames are logged and returned as errors; the handler does
    /// not run.
    pub fn receive(
        &self,
        channel: &str,
        side: Side,
        peer: PeerId,
        bytes: &[u8],
    ) -> CodecResult<DecodedMessage<Handler>> {
        let registry = self.channel(channel)?;
        let message = decode(registry, side, bytes, &self.limits).map_err(|err| {
            warn!(channel, %peer, error = %err, "rejected packet");
            err
        })?;
        debug!(channel, %peer, packet = message.packet(), "dispatching packet");
        message.schema().handler().call(peer, &message);
        Ok(message)
    }
}

/// Collects channels for a [`Network`].
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    channels: BTreeMap<String, Arc<Channel>>,
    limits: CodecLimits,
}

impl NetworkBuilder {
    /// Adds a channel under its registry name.
    pub fn channel(mut self, registry: Channel) -> CodecResult<Self> {
        let name = registry.name().to_string();
        if self.channels.contains_key(&name) {
            return Err(CodecError::DuplicateChannel { channel: name });
        }
        self.channels.insert(name, Arc::new(registry));
        Ok(self)
    }

    #[must_use]
    pub fn limits(mut self, limits: CodecLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn build(self) -> Network {
        debug!(
            channels = self.channels.len(),
            packets = self.channels.values().map(|c| c.len()).sum::<usize>(),
            "built network"
        );
        Network {
            channels: self.channels,
            limits: self.limits,
        }
    }
}
