//! On-disk encoding of cache entries.
//!
//! An entry file is a 4-byte little-endian header length, a bincode-encoded
//! [`EntryHeader`], and the bincode-encoded artifact. The fingerprint lives in
//! the header so a reader can decide staleness without decoding the payload.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strata_common::{ContentChecksum, Fingerprint};

use crate::error::CacheError;

/// Magic bytes identifying a strata cache entry.
pub const ENTRY_MAGIC: [u8; 4] = *b"STRA";

/// Current entry format version. Increment on breaking changes to
/// the header or payload format.
pub const ENTRY_FORMAT_VERSION: u32 = 1;

/// Header prepended to every cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryHeader {
    /// Magic bytes: must be `b"STRA"`.
    pub magic: [u8; 4],

    /// Entry format version.
    pub format_version: u32,

    /// Staleness fingerprint computed when the entry was written.
    pub fingerprint: Fingerprint,

    /// Checksum of the payload bytes.
    pub checksum: ContentChecksum,
}

/// Encodes `artifact` into a complete entry file image.
pub fn encode_entry<A: Serialize + ?Sized>(
    fingerprint: Fingerprint,
    artifact: &A,
) -> Result<Vec<u8>, CacheError> {
    let payload = bincode::serde::encode_to_vec(artifact, bincode::config::standard())
        .map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;

    let header = EntryHeader {
        magic: ENTRY_MAGIC,
        format_version: ENTRY_FORMAT_VERSION,
        fingerprint,
        checksum: ContentChecksum::from_bytes(&payload),
    };
    let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
        .map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;

    let header_len = header_bytes.len() as u32;
    let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
    output.extend_from_slice(&header_len.to_le_bytes());
    output.extend_from_slice(&header_bytes);
    output.extend_from_slice(&payload);
    Ok(output)
}

/// Splits an entry image into its validated header and the raw payload.
///
/// Checks length framing, magic bytes and format version. The payload
/// checksum is verified later by [`decode_payload`].
pub fn decode_header<'a>(
    raw: &'a [u8],
    path: &Path,
) -> Result<(EntryHeader, &'a [u8]), CacheError> {
    let invalid = |reason: &str| CacheError::InvalidHeader {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let len_bytes: [u8; 4] = raw
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| invalid("file shorter than header length prefix"))?;
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    let header_end = 4usize
        .checked_add(header_len)
        .filter(|end| *end <= raw.len())
        .ok_or_else(|| invalid("header length exceeds file size"))?;

    let (header, _): (EntryHeader, usize) =
        bincode::serde::decode_from_slice(&raw[4..header_end], bincode::config::standard())
            .map_err(|e| invalid(&e.to_string()))?;

    if header.magic != ENTRY_MAGIC {
        return Err(invalid("missing magic bytes"));
    }
    if header.format_version != ENTRY_FORMAT_VERSION {
        return Err(CacheError::VersionMismatch {
            path: path.to_path_buf(),
            expected: ENTRY_FORMAT_VERSION,
            actual: header.format_version,
        });
    }

    Ok((header, &raw[header_end..]))
}

/// Verifies the payload checksum and decodes the artifact.
pub fn decode_payload<A: DeserializeOwned>(
    header: &EntryHeader,
    payload: &[u8],
    path: &Path,
) -> Result<A, CacheError> {
    let actual = ContentChecksum::from_bytes(payload);
    if actual != header.checksum {
        return Err(CacheError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: header.checksum.to_string(),
            actual: actual.to_string(),
        });
    }

    let (artifact, _): (A, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard()).map_err(|e| {
            CacheError::Serialization {
                reason: e.to_string(),
            }
        })?;
    Ok(artifact)
}
