//! Fuzz target for DEFLATE/zlib compression.
//!
//! Compresses arbitrary input at an arbitrary level and checks that the
//! result is a well-formed zlib stream that inflates back to the input.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

/// Structured input for DEFLATE fuzzing.
#[derive(Arbitrary, Debug)]
struct DeflateInput {
    /// Compression level (0-9)
    level: u8,
    /// Raw data to compress
    data: Vec<u8>,
}

fuzz_target!(|input: DeflateInput| {
    // Limit input size to avoid OOM
    if input.data.len() > 1024 * 1024 {
        return;
    }

    let level = input.level % 10;
    let compressed = flato::deflate_zlib(&input.data, level).unwrap();

    // Check zlib header (CMF, FLG)
    assert!(compressed.len() >= 6, "Compressed data too short");
    let cmf = compressed[0];
    let flg = compressed[1];
    assert_eq!(cmf & 0x0F, 8, "Invalid compression method");
    assert_eq!((cmf as u16 * 256 + flg as u16) % 31, 0, "Invalid header checksum");

    // The stream must inflate back to the input
    let decoded = miniz_oxide::inflate::decompress_to_vec_zlib(&compressed)
        .expect("emitted stream does not inflate");
    assert_eq!(decoded, input.data);
});
