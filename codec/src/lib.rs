//! Packet encoding, decoding and dispatch for wirepack.
//!
//! This is the main codec crate. It ties bitstream and schema together to
//! turn named field values into frames and back.
//!
//! # Features
//!
//! - Fluent, type-checked [`PendingMessage`] builders
//! - Bit-exact [`encode`] and strict [`decode`]
//! - Category-checked [`DecodedMessage`] getters
//! - Multi-channel [`Network`] with send-side authorization and handler dispatch
//!
//! # Design Principles
//!
//! - **All or nothing** - Encode yields a complete frame or an error; decode likewise.
//! - **Schema-driven** - The discriminator is the only thing a frame says about itself.
//! - **Transport-agnostic** - Framing and peer selection live behind [`Transport`].
//!
//! # Example
//!
//! ```
//! use codec::{decode, encode, CodecLimits, PendingMessage};
//! use schema::{FieldType, RegistryBuilder, Side};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(
//!     RegistryBuilder::new("game")
//!         .packet("move")
//!         .with(FieldType::VarSInt, "dx")?
//!         .with(FieldType::Bool, "sprint")?
//!         .bound_to(Side::Server)?
//!         .handled_by(())?
//!         .build(),
//! );
//!
//! let message = PendingMessage::new(Arc::clone(&registry))
//!     .packet("move")?
//!     .with_int("dx", -3)?
//!     .with_bool("sprint", true)?;
//! let bytes = encode(&message, &CodecLimits::default())?;
//! assert_eq!(bytes, [0, 0b1, 5]);
//!
//! let decoded = decode(&registry, Side::Server, &bytes, &CodecLimits::default())?;
//! assert_eq!(decoded.get_int("dx")?, -3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod decode;
mod decoded;
mod encode;
mod error;
mod limits;
mod network;
mod pending;
mod transport;

pub use decode::decode;
pub use decoded::DecodedMessage;
pub use encode::{encode, encode_into};
pub use error::{CodecError, CodecResult};
pub use limits::CodecLimits;
pub use network::{Channel, Handler, Network, NetworkBuilder};
pub use pending::PendingMessage;
pub use transport::{Destination, PeerId, Transport, TransportError};
