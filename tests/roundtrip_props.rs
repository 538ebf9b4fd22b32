//! Property tests: whatever the engine emits, an independent inflater must
//! reverse exactly, at every level and strategy.

use flato::{adler32, deflate, deflate_zlib, Deflater, Strategy};
use proptest::prelude::*;

fn inflate(data: &[u8]) -> Vec<u8> {
    miniz_oxide::inflate::decompress_to_vec(data).expect("inflate failed")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn roundtrip_arbitrary_bytes(
        data in proptest::collection::vec(any::<u8>(), 0..4096),
        level in 0u8..=9,
    ) {
        let out = deflate(&data, level).unwrap();
        prop_assert_eq!(inflate(&out), data);
    }

    #[test]
    fn roundtrip_low_entropy(
        data in proptest::collection::vec(0u8..4, 0..8192),
        level in 1u8..=9,
    ) {
        let out = deflate(&data, level).unwrap();
        prop_assert_eq!(inflate(&out), data);
    }

    #[test]
    fn roundtrip_zlib_wrapper(
        data in proptest::collection::vec(any::<u8>(), 0..2048),
        level in 0u8..=9,
    ) {
        let out = deflate_zlib(&data, level).unwrap();
        let decoded = miniz_oxide::inflate::decompress_to_vec_zlib(&out)
            .expect("zlib inflate failed");
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn engine_adler_matches_reference(
        data in proptest::collection::vec(any::<u8>(), 0..4096),
    ) {
        let mut deflater = Deflater::new(6).unwrap();
        let mut out = Vec::new();
        deflater.set_input(&data, 0, data.len()).unwrap();
        let mut chunk = [0u8; 4096];
        loop {
            let more = deflater.deflate(true, true);
            loop {
                let n = deflater.flush_output(&mut chunk);
                if n == 0 {
                    break;
                }
                out.extend_from_slice(&chunk[..n]);
            }
            if !more {
                break;
            }
        }
        prop_assert_eq!(deflater.adler(), adler32(&data));
        prop_assert_eq!(inflate(&out), data);
    }

    #[test]
    fn roundtrip_filtered_strategy(
        data in proptest::collection::vec(0u8..16, 0..4096),
        level in 4u8..=9,
    ) {
        let mut deflater = Deflater::with_strategy(level, Strategy::Filtered).unwrap();
        let mut out = Vec::new();
        deflater.set_input(&data, 0, data.len()).unwrap();
        let mut chunk = [0u8; 4096];
        loop {
            let more = deflater.deflate(true, true);
            loop {
                let n = deflater.flush_output(&mut chunk);
                if n == 0 {
                    break;
                }
                out.extend_from_slice(&chunk[..n]);
            }
            if !more {
                break;
            }
        }
        prop_assert_eq!(inflate(&out), data);
    }
}
