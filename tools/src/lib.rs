//! Introspection and debugging tools for the wirepack codec.
//!
//! This crate provides utilities for understanding captured packets:
//!
//! - Load channel registries from a JSON manifest
//! - Print packet layouts and registry fingerprints
//! - Decode captured frames into structured JSON
//! - Summarise frames that fail to decode
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

use std::fmt::Write as _;

use anyhow::{bail, Context, Result};
use codec::{decode, Channel, CodecLimits, Handler, Network};
use schema::{registry_hash, Document, FieldType, RegistryBuilder, Side, Tag, Value};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};

/// Channel registries described as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub channels: Vec<ChannelManifest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelManifest {
    pub name: String,
    pub packets: Vec<PacketManifest>,
}

/// One packet; order within the channel fixes its discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketManifest {
    pub id: String,
    pub side: Side,
    #[serde(default)]
    pub fields: Vec<FieldManifest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldManifest {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl Manifest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parse manifest json")
    }

    /// Builds a network whose handlers ignore every packet.
    pub fn to_network(&self, limits: CodecLimits) -> Result<Network> {
        let mut builder = Network::builder().limits(limits);
        for channel in &self.channels {
            builder = builder.channel(channel.to_registry()?)?;
        }
        Ok(builder.build())
    }
}

impl ChannelManifest {
    pub fn to_registry(&self) -> Result<Channel> {
        let mut registry = RegistryBuilder::new(self.name.clone());
        for packet in &self.packets {
            let mut builder = registry.packet(packet.id.clone());
            for field in &packet.fields {
                builder = builder.with(field.field_type, field.name.clone())?;
            }
            registry = builder.bound_to(packet.side)?.handled_by(Handler::noop())?;
        }
        Ok(registry.build())
    }
}

/// Layout of one packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketLayout {
    pub discriminator: u8,
    pub id: String,
    pub side: Side,
    pub minimum_size: usize,
    pub bitfield_bytes: usize,
    pub fields: Vec<FieldManifest>,
}

/// Layout and fingerprint of one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelLayout {
    pub name: String,
    pub fingerprint: u64,
    pub packets: Vec<PacketLayout>,
}

pub fn channel_layouts(network: &Network) -> Result<Vec<ChannelLayout>> {
    let mut layouts = Vec::new();
    for name in network.channels() {
        let registry = network.channel(name)?;
        let packets = registry
            .iter()
            .map(|(discriminator, schema)| PacketLayout {
                discriminator,
                id: schema.id().to_string(),
                side: schema.side(),
                minimum_size: schema.minimum_size(),
                bitfield_bytes: schema.bitfield_len(),
                fields: schema
                    .fields()
                    .iter()
                    .map(|field| FieldManifest {
                        name: field.name.clone(),
                        field_type: field.field_type,
                    })
                    .collect(),
            })
            .collect();
        layouts.push(ChannelLayout {
            name: name.to_string(),
            fingerprint: registry_hash(registry),
            packets,
        });
    }
    Ok(layouts)
}

#[must_use]
pub fn format_layouts(layouts: &[ChannelLayout]) -> String {
    let mut out = String::new();
    for channel in layouts {
        let _ = writeln!(
            out,
            "channel {} (fingerprint 0x{:016x})",
            channel.name, channel.fingerprint
        );
        for packet in &channel.packets {
            let _ = writeln!(
                out,
                "  [{:>3}] {} -> {} (min {} bytes, bitfield {} bytes)",
                packet.discriminator,
                packet.id,
                packet.side,
                packet.minimum_size,
                packet.bitfield_bytes
            );
            for field in &packet.fields {
                let _ = writeln!(out, "        {}: {}", field.name, field.field_type);
            }
        }
    }
    out
}

/// One decoded field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub value: JsonValue,
}

/// A decoded frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedOutput {
    pub channel: String,
    pub packet: String,
    pub discriminator: u8,
    pub bytes: usize,
    pub fields: Vec<DecodedField>,
}

/// Picks `channel`, or the only channel when none is given.
pub fn resolve_channel<'a>(network: &'a Network, channel: Option<&'a str>) -> Result<&'a str> {
    if let Some(channel) = channel {
        network.channel(channel)?;
        return Ok(channel);
    }
    let mut names = network.channels();
    match (names.next(), names.next()) {
        (Some(name), None) => Ok(name),
        (None, _) => bail!("manifest defines no channels"),
        (Some(_), Some(_)) => bail!("manifest defines several channels; pass --channel"),
    }
}

/// Decodes `bytes` as received on `side`, without running handlers.
pub fn decode_packet_json(
    bytes: &[u8],
    network: &Network,
    channel: Option<&str>,
    side: Side,
) -> Result<DecodedOutput> {
    let channel = resolve_channel(network, channel)?;
    let registry = network.channel(channel)?;
    let message = decode(registry, side, bytes, network.limits())
        .with_context(|| format!("decode packet on channel '{channel}'"))?;
    let fields = message
        .schema()
        .fields()
        .iter()
        .zip(message.iter())
        .map(|(field, (_, value))| DecodedField {
            name: field.name.clone(),
            field_type: field.field_type,
            value: value_to_json(value),
        })
        .collect();
    Ok(DecodedOutput {
        channel: channel.to_string(),
        packet: message.packet().to_string(),
        discriminator: message.discriminator(),
        bytes: bytes.len(),
        fields,
    })
}

#[must_use]
pub fn format_decode_pretty(output: &DecodedOutput) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}/{} (discriminator {}, {} bytes)",
        output.channel, output.packet, output.discriminator, output.bytes
    );
    for field in &output.fields {
        let _ = writeln!(out, "  {} ({}): {}", field.name, field.field_type, field.value);
    }
    out
}

/// Summary of one frame, decodable or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectReport {
    pub bytes: usize,
    pub discriminator: Option<u8>,
    pub packet: Option<String>,
    pub minimum_size: Option<usize>,
    pub bitfield_bytes: Option<usize>,
    pub error: Option<String>,
}

pub fn inspect_packet(
    bytes: &[u8],
    network: &Network,
    channel: Option<&str>,
    side: Side,
) -> Result<InspectReport> {
    let channel = resolve_channel(network, channel)?;
    let registry = network.channel(channel)?;
    let discriminator = bytes.first().copied();
    let schema = discriminator.and_then(|disc| registry.by_discriminator(disc));
    let error = decode(registry, side, bytes, network.limits())
        .err()
        .map(|err| err.to_string());
    Ok(InspectReport {
        bytes: bytes.len(),
        discriminator,
        packet: schema.map(|schema| schema.id().to_string()),
        minimum_size: schema.map(|schema| schema.minimum_size()),
        bitfield_bytes: schema.map(|schema| schema.bitfield_len()),
        error,
    })
}

#[must_use]
pub fn format_inspect_report(report: &InspectReport) -> String {
    let mut out = String::new();
    let discriminator = report
        .discriminator
        .map_or_else(|| "n/a".to_string(), |disc| disc.to_string());
    let packet = report.packet.as_deref().unwrap_or("unknown");
    let _ = writeln!(
        out,
        "packet: {packet} discriminator: {discriminator} size: {} bytes",
        report.bytes
    );
    if let (Some(minimum), Some(bitfield)) = (report.minimum_size, report.bitfield_bytes) {
        let _ = writeln!(out, "minimum size: {minimum} bytes bitfield: {bitfield} bytes");
    }
    match &report.error {
        Some(error) => {
            let _ = writeln!(out, "status: rejected ({error})");
        }
        None => {
            let _ = writeln!(out, "status: ok");
        }
    }
    out
}

#[must_use]
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Integer(v) => JsonValue::from(*v),
        Value::Floating(v) => float_json(*v),
        Value::Boolean(v) => JsonValue::Bool(*v),
        Value::Text(v) => JsonValue::String(v.clone()),
        Value::Bytes(v) => JsonValue::from(v.clone()),
        Value::Blob(document) => document_to_json(document),
    }
}

fn document_to_json(document: &Document) -> JsonValue {
    let map: Map<String, JsonValue> = document
        .iter()
        .map(|(name, tag)| (name.to_string(), tag_to_json(tag)))
        .collect();
    JsonValue::Object(map)
}

fn tag_to_json(tag: &Tag) -> JsonValue {
    match tag {
        Tag::Byte(v) => JsonValue::from(*v),
        Tag::Short(v) => JsonValue::from(*v),
        Tag::Int(v) => JsonValue::from(*v),
        Tag::Long(v) => JsonValue::from(*v),
        Tag::Float(v) => float_json(f64::from(*v)),
        Tag::Double(v) => float_json(*v),
        Tag::ByteArray(v) => JsonValue::from(v.clone()),
        Tag::String(v) => JsonValue::String(v.clone()),
        Tag::List(list) => JsonValue::Array(list.iter().map(tag_to_json).collect()),
        Tag::Compound(document) => document_to_json(document),
        Tag::IntArray(v) => JsonValue::from(v.clone()),
        Tag::LongArray(v) => JsonValue::from(v.clone()),
    }
}

/// JSON has no NaN or infinities; those print as strings.
fn float_json(value: f64) -> JsonValue {
    Number::from_f64(value).map_or_else(|| JsonValue::String(value.to_string()), JsonValue::Number)
}
