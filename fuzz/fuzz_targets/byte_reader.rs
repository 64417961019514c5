#![no_main]

use bitstream::{read_packed_bools, ByteReader};
use document::decode_document;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = ByteReader::new(data);
    let mut idx = 0usize;

    // Input bytes pick the next operation; the reader consumes the same input.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 8;
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_u8();
            }
            1 => {
                let _ = reader.read_i24();
            }
            2 => {
                let _ = reader.read_f64();
            }
            3 => {
                let _ = reader.read_varu32();
            }
            4 => {
                let _ = reader.read_vars32();
            }
            5 => {
                let _ = reader.read_str(64);
            }
            6 => {
                let count = usize::from(data[idx - 1] % 24);
                let _ = read_packed_bools(&mut reader, count);
            }
            _ => {
                let _ = decode_document(&mut reader, 16);
            }
        }
    }
});
