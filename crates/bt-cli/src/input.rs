//! Reading activity logs from disk.
//!
//! Xcode stores `.xcactivitylog` files gzip-compressed; logs that were
//! already unpacked are read as they are.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Reads a log file and returns its decompressed text.
pub fn read_log_text(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read activity log");
    decode_log(&bytes).with_context(|| format!("failed to decode {}", path.display()))
}

/// Decompresses gzip input; anything else must already be UTF-8 text.
pub fn decode_log(bytes: &[u8]) -> Result<String> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut text = String::new();
        GzDecoder::new(bytes)
            .read_to_string(&mut text)
            .context("invalid gzip stream")?;
        return Ok(text);
    }
    String::from_utf8(bytes.to_vec()).context("activity log is not UTF-8 text")
}
