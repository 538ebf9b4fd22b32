//! # flato
//!
//! A minimal-dependency DEFLATE compression engine (RFC 1951) with a
//! zlib-style streaming API.
//!
//! The compressor feeds input through a 32 KiB sliding window with a
//! three-byte hash index and emits bit-packed blocks mixing literal bytes
//! with (length, distance) back-references, choosing per block between
//! stored, static-Huffman and dynamic-Huffman representations. An Adler-32
//! checksum tracks the uncompressed stream for zlib (RFC 1950) wrappers.
//!
//! ## Features
//!
//! - **Zero runtime dependencies**
//! - Streaming [`Deflater`] with levels 0-9, preset dictionaries, and
//!   mid-stream level changes
//! - One-shot [`deflate`] and [`deflate_zlib`] helpers
//!
//! ## Example
//!
//! ```rust
//! use flato::{deflate, deflate_zlib};
//!
//! let raw = deflate(b"hello hello hello", 6).unwrap();
//! assert!(raw.len() < 17);
//!
//! let zlib = deflate_zlib(b"hello hello hello", 6).unwrap();
//! assert_eq!(zlib[0], 0x78); // CMF: deflate, 32 KiB window
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bits;
pub mod compress;
pub mod error;

pub use compress::adler32::adler32;
pub use compress::deflate::{
    deflate, deflate_with_stats, deflate_zlib, DeflateStats, Deflater, Strategy,
};
pub use error::{Error, Result};
