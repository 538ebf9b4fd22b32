//! Canonical text-compression corpora (Calgary and Canterbury).
//!
//! Fixtures are fetched once into `tests/fixtures/text_corpus/` and reused.
//! Every file is pinned to its published corpus size; the SHA-256 of the
//! first size-verified download is recorded next to the fixture, and later
//! runs verify the cached bytes against that digest before using them.
//!
//! Primary source: the University of Canterbury corpus collection
//! (<https://corpus.canterbury.ac.nz/>), which serves tarballs only; the
//! individual files are fetched from a raw GitHub mirror of the same data.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use reqwest::blocking::Client;
use sha2::{Digest, Sha256};

const MIRROR: &str = "https://raw.githubusercontent.com/pfalcon/canterbury-corpus/master";

const FIXTURES_DIR: &str = "tests/fixtures/text_corpus";

/// Calgary corpus text files.
/// Format: (filename, mirror path, published size in bytes)
pub const CALGARY: &[(&str, &str, usize)] = &[
    ("book1", "calgary/book1", 768_771),
    ("book2", "calgary/book2", 610_856),
    ("bib", "calgary/bib", 111_261),
];

/// Canterbury corpus text files.
pub const CANTERBURY: &[(&str, &str, usize)] = &[
    ("alice29.txt", "canterbury/alice29.txt", 152_089),
    ("asyoulik.txt", "canterbury/asyoulik.txt", 125_179),
    ("plrabn12.txt", "canterbury/plrabn12.txt", 481_861),
];

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Fetch one corpus file to the fixtures directory with size and checksum
/// verification.
fn fetch_file(
    fixtures_dir: &Path,
    name: &str,
    path: &str,
    size: usize,
    client: &Client,
) -> Result<Vec<u8>, String> {
    fs::create_dir_all(fixtures_dir).map_err(|e| e.to_string())?;

    let dest = fixtures_dir.join(name);
    let digest_file = fixtures_dir.join(format!("{name}.sha256"));

    if dest.exists() {
        // Verify the cached file against its recorded digest
        let existing = fs::read(&dest).map_err(|e| e.to_string())?;
        let recorded = fs::read_to_string(&digest_file).unwrap_or_default();
        if existing.len() == size && sha256_hex(&existing) == recorded.trim() {
            return Ok(existing);
        }
        // Re-download on size or checksum mismatch
    }

    let url = format!("{MIRROR}/{path}");
    let resp = client.get(&url).send().map_err(|e| e.to_string())?;
    let resp = resp.error_for_status().map_err(|e| e.to_string())?;
    let bytes = resp.bytes().map_err(|e| e.to_string())?.to_vec();

    // Integrity check against the published corpus size
    if bytes.len() != size {
        return Err(format!(
            "size mismatch for {name}: expected {size} bytes, got {}",
            bytes.len()
        ));
    }

    fs::write(&dest, &bytes).map_err(|e| e.to_string())?;
    fs::write(&digest_file, sha256_hex(&bytes)).map_err(|e| e.to_string())?;
    Ok(bytes)
}

fn corpus_client() -> Result<Client, String> {
    Client::builder()
        .user_agent("flato-test/0.1")
        .build()
        .map_err(|e| e.to_string())
}

/// Read Calgary book1, fetching it on first use.
pub fn read_calgary_book1() -> Result<Vec<u8>, String> {
    let client = corpus_client()?;
    let (name, path, size) = CALGARY[0];
    fetch_file(Path::new(FIXTURES_DIR), name, path, size, &client)
}

/// Read the full pinned text corpus (Calgary plus Canterbury), fetching any
/// missing files.
pub fn read_text_corpus() -> Result<Vec<(String, Vec<u8>)>, String> {
    let client = corpus_client()?;
    let mut cases = Vec::new();
    for &(name, path, size) in CALGARY.iter().chain(CANTERBURY) {
        let data = fetch_file(Path::new(FIXTURES_DIR), name, path, size, &client)?;
        cases.push((name.to_string(), data));
    }
    Ok(cases)
}
