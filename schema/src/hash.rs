//! Registry fingerprints.

use blake3::Hasher;

use crate::{SchemaRegistry, Side};

/// Computes a deterministic fingerprint of a registry's wire contract.
///
/// Covers the registry name, discriminator order, and each packet's side
/// and field list. Handlers do not contribute. Two registries that encode
/// compatibly hash equal.
#[must_use]
pub fn registry_hash<H>(registry: &SchemaRegistry<H>) -> u64 {
    let mut hasher = Hasher::new();
    write_str(&mut hasher, registry.name());
    write_len(&mut hasher, registry.len());

    for (disc, schema) in registry.iter() {
        hasher.update(&[disc]);
        write_str(&mut hasher, schema.id());
        hasher.update(&[side_tag(schema.side())]);
        write_len(&mut hasher, schema.fields().len());
        for field in schema.fields() {
            write_str(&mut hasher, &field.name);
            hasher.update(&[field.field_type.tag()]);
        }
    }

    let hash = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(head)
}

const fn side_tag(side: Side) -> u8 {
    match side {
        Side::Client => 0,
        Side::Server => 1,
    }
}

fn write_len(hasher: &mut Hasher, len: usize) {
    hasher.update(&(len as u64).to_le_bytes());
}

fn write_str(hasher: &mut Hasher, value: &str) {
    write_len(hasher, value.len());
    hasher.update(value.as_bytes());
}
