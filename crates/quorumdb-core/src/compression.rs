//! Gzip handling for query payloads.
//!
//! Clients may ship query text gzip-compressed; the executor sniffs the two
//! magic bytes and inflates before parsing. A payload that claims to be gzip
//! but does not inflate is an invalid request, not a syntax error, since the
//! query text itself was never seen.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use quorumdb_commons::{QueryError, QueryResult};
use std::io::{Read, Write};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// True when the payload starts with the gzip magic bytes.
pub fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[..2] == GZIP_MAGIC
}

/// Inflates a gzip payload.
pub fn decompress(data: &[u8]) -> QueryResult<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| QueryError::invalid_request(format!("corrupt gzip payload: {}", e)))?;
    Ok(out)
}

/// Deflates a payload with default compression.
pub fn compress(data: &[u8]) -> QueryResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| QueryError::invalid_request(format!("gzip compression failed: {}", e)))
}
