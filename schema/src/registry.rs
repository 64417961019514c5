//! Schema registries (channels) and discriminator assignment.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{SchemaError, SchemaResult};
use crate::{FieldType, PacketSchema, SchemaBuilder, Side};

/// A one-byte discriminator addresses at most this many schemas.
pub const MAX_SCHEMAS: usize = 256;

/// An immutable set of packet schemas sharing one discriminator space.
///
/// Discriminators are assigned in registration order. Both peers must
/// register the same schemas in the same order; nothing on the wire
/// describes the mapping.
pub struct SchemaRegistry<H> {
    name: String,
    schemas: Vec<Arc<PacketSchema<H>>>,
    by_id: HashMap<String, u8>,
}

impl<H> SchemaRegistry<H> {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> RegistryBuilder<H> {
        RegistryBuilder::new(name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Looks up a schema by identifier.
    pub fn get(&self, id: &str) -> SchemaResult<&Arc<PacketSchema<H>>> {
        self.by_id
            .get(id)
            .map(|&disc| &self.schemas[usize::from(disc)])
            .ok_or_else(|| SchemaError::UnknownSchema {
                registry: self.name.clone(),
                packet: id.to_string(),
            })
    }

    #[must_use]
    pub fn discriminator(&self, id: &str) -> Option<u8> {
        self.by_id.get(id).copied()
    }

    #[must_use]
    pub fn by_discriminator(&self, discriminator: u8) -> Option<&Arc<PacketSchema<H>>> {
        self.schemas.get(usize::from(discriminator))
    }

    /// Schemas with their discriminators, in registration order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Arc<PacketSchema<H>>)> + '_ {
        // Registration caps the length at MAX_SCHEMAS, so every index fits a u8.
        self.schemas
            .iter()
            .enumerate()
            .map(|(index, schema)| (index as u8, schema))
    }
}

impl<H> Clone for SchemaRegistry<H> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            schemas: self.schemas.clone(),
            by_id: self.by_id.clone(),
        }
    }
}

impl<H> fmt::Debug for SchemaRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("name", &self.name)
            .field("schemas", &self.schemas)
            .finish()
    }
}

/// Accumulates frozen schemas, assigning discriminators as they arrive.
pub struct RegistryBuilder<H> {
    name: String,
    schemas: Vec<Arc<PacketSchema<H>>>,
    by_id: HashMap<String, u8>,
}

impl<H> RegistryBuilder<H> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schemas: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Starts declaring a packet that registers itself on `handled_by`.
    #[must_use]
    pub fn packet(self, id: impl Into<String>) -> PacketBuilder<H> {
        PacketBuilder {
            registry: self,
            schema: SchemaBuilder::new(id),
        }
    }

    /// Registers a frozen schema under the next discriminator.
    pub fn register(mut self, schema: PacketSchema<H>) -> SchemaResult<Self> {
        if self.by_id.contains_key(schema.id()) {
            return Err(SchemaError::DuplicatePacket {
                registry: self.name,
                packet: schema.id().to_string(),
            });
        }
        let Ok(disc) = u8::try_from(self.schemas.len()) else {
            return Err(SchemaError::RegistryOverflow {
                registry: self.name,
                limit: MAX_SCHEMAS,
            });
        };
        self.by_id.insert(schema.id().to_string(), disc);
        self.schemas.push(Arc::new(schema));
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    #[must_use]
    pub fn build(self) -> SchemaRegistry<H> {
        SchemaRegistry {
            name: self.name,
            schemas: self.schemas,
            by_id: self.by_id,
        }
    }
}

impl<H> fmt::Debug for RegistryBuilder<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("name", &self.name)
            .field("schemas", &self.schemas)
            .finish()
    }
}

/// A [`SchemaBuilder`] that hands its schema back to the registry builder.
pub struct PacketBuilder<H> {
    registry: RegistryBuilder<H>,
    schema: SchemaBuilder<H>,
}

impl<H> PacketBuilder<H> {
    pub fn with(mut self, field_type: FieldType, name: impl Into<String>) -> SchemaResult<Self> {
        self.schema = self.schema.with(field_type, name)?;
        Ok(self)
    }

    pub fn bound_to(mut self, side: Side) -> SchemaResult<Self> {
        self.schema = self.schema.bound_to(side)?;
        Ok(self)
    }

    /// Freezes the packet and registers it.
    pub fn handled_by(self, handler: H) -> SchemaResult<RegistryBuilder<H>> {
        let schema = self.schema.handled_by(handler)?;
        self.registry.register(schema)
    }
}

impl<H> fmt::Debug for PacketBuilder<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketBuilder")
            .field("registry", &self.registry.name)
            .field("schema", &self.schema)
            .finish()
    }
}
