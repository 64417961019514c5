#![no_main]

use codec::{decode, CodecLimits};
use libfuzzer_sys::fuzz_target;
use schema::{FieldType, RegistryBuilder, SchemaRegistry, Side};

fn registry() -> SchemaRegistry<()> {
    let mut packet = RegistryBuilder::new("fuzz").packet("every");
    for field_type in FieldType::ALL {
        packet = packet.with(field_type, field_type.name()).unwrap();
    }
    packet
        .bound_to(Side::Server)
        .unwrap()
        .handled_by(())
        .unwrap()
        .packet("flags")
        .with(FieldType::Bool, "a")
        .unwrap()
        .with(FieldType::Bool, "b")
        .unwrap()
        .with(FieldType::Text, "c")
        .unwrap()
        .bound_to(Side::Server)
        .unwrap()
        .handled_by(())
        .unwrap()
        .packet("reply")
        .with(FieldType::Document, "d")
        .unwrap()
        .bound_to(Side::Client)
        .unwrap()
        .handled_by(())
        .unwrap()
        .build()
}

fuzz_target!(|data: &[u8]| {
    let registry = registry();
    let limits = CodecLimits::for_testing();
    for side in [Side::Server, Side::Client] {
        if let Ok(message) = decode(&registry, side, data, &limits) {
            assert_eq!(message.schema().side(), side);
            assert_eq!(message.iter().count(), message.schema().fields().len());
        }
    }
});
