//! The compression engine: checksumming, match finding, Huffman coding and
//! the DEFLATE driver that ties them together.

pub mod adler32;
pub mod deflate;
pub mod huffman;
pub mod lz77;

pub use adler32::adler32;
pub use deflate::{
    deflate, deflate_with_stats, deflate_zlib, DeflateStats, Deflater, Strategy,
};
