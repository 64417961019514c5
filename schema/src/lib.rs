//! Packet schema model for the wirepack codec.
//!
//! This crate defines what a packet looks like on the wire:
//! - The closed field type table with per-type encodings and categories
//! - Packet schemas, frozen from a builder
//! - Schema registries that assign one-byte discriminators
//! - Deterministic registry fingerprints
//!
//! # Design Principles
//!
//! - **Typestate freezing** - Builders mutate, schemas never do.
//! - **Caller-controlled order** - Discriminators follow registration order.
//! - **Eager validation** - Each builder call reports its own misuse.
//!
//! # Example
//!
//! ```
//! use schema::{FieldType, RegistryBuilder, Side};
//!
//! let registry = RegistryBuilder::new("game")
//!     .packet("move")
//!     .with(FieldType::F32, "x")?
//!     .with(FieldType::Bool, "sprint")?
//!     .bound_to(Side::Server)?
//!     .handled_by(())?
//!     .build();
//!
//! assert_eq!(registry.discriminator("move"), Some(0));
//! assert_eq!(registry.get("move")?.minimum_size(), 6);
//! # Ok::<(), schema::SchemaError>(())
//! ```

mod error;
mod field;
mod hash;
mod limits;
mod registry;
mod schema;
mod side;
mod value;

pub use document::{Document, Tag, TagKind, TagList};
pub use error::{SchemaError, SchemaResult, ValueError};
pub use field::{Category, Field, FieldType};
pub use hash::registry_hash;
pub use limits::FieldLimits;
pub use registry::{PacketBuilder, RegistryBuilder, SchemaRegistry, MAX_SCHEMAS};
pub use schema::{PacketSchema, SchemaBuilder};
pub use side::Side;
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = FieldType::ALL;
        let _ = Category::Integer;
        let _ = Side::Server;
        let _ = FieldLimits::default();
        let _ = Value::from(1);
        let _ = Document::new();
        let _ = TagKind::Compound;
        let _: SchemaBuilder<()> = SchemaBuilder::new("p");
        let registry: SchemaRegistry<()> = RegistryBuilder::new("r").build();
        let _ = registry_hash(&registry);
        assert_eq!(MAX_SCHEMAS, 256);
    }

    #[test]
    fn registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SchemaRegistry<()>>();
        assert_send_sync::<PacketSchema<()>>();
    }
}
