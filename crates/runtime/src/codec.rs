//! Binary codec for save files.
//!
//! # Frame Format
//!
//! ```text
//! [4 bytes  magic "GSAV"]
//! [32 bytes SHA-256 of payload]
//! [payload: bincode serialized SaveFile]
//! ```
//!
//! The payload is the nested identity → kind → capsule map. Every map in it is
//! ordered, so equal save files always encode to identical bytes. Capsules are
//! opaque here beyond "named fields"; no schema is registered with the codec.
//!
//! The digest lets [`decode`] tell a truncated or damaged file apart from a
//! valid one instead of handing half-read entities to the restore pass.

use save_core::SaveFile;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Leading bytes of every encoded save file.
pub const MAGIC: [u8; 4] = *b"GSAV";

const DIGEST_LEN: usize = 32;
const HEADER_LEN: usize = MAGIC.len() + DIGEST_LEN;

/// Errors raised while encoding or decoding a save frame.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode save file: {0}")]
    Encode(String),

    #[error("save data truncated: {len} bytes is shorter than the 36 byte header")]
    Truncated { len: usize },

    #[error("save data does not start with the expected magic bytes")]
    BadMagic,

    #[error("save data digest mismatch: header {expected}, payload {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("save payload is malformed: {0}")]
    Payload(String),
}

impl CodecError {
    /// True for every failure that means the bytes on disk are unusable.
    pub fn is_corruption(&self) -> bool {
        !matches!(self, Self::Encode(_))
    }
}

/// Serializes a save file into a self-checking frame.
pub fn encode(file: &SaveFile) -> Result<Vec<u8>, CodecError> {
    let payload = bincode::serialize(file).map_err(|e| CodecError::Encode(e.to_string()))?;
    let digest = Sha256::digest(&payload);

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&digest);
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Parses a frame produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<SaveFile, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::Truncated { len: bytes.len() });
    }

    let (magic, rest) = bytes.split_at(MAGIC.len());
    if magic != MAGIC {
        return Err(CodecError::BadMagic);
    }

    let (expected, payload) = rest.split_at(DIGEST_LEN);
    let actual = Sha256::digest(payload);
    if expected != actual.as_slice() {
        return Err(CodecError::DigestMismatch {
            expected: hex::encode(expected),
            actual: hex::encode(actual),
        });
    }

    bincode::deserialize(payload).map_err(|e| CodecError::Payload(e.to_string()))
}

/// Hex digest of an encoded frame's payload, for logs and tooling.
pub fn payload_digest(bytes: &[u8]) -> Option<String> {
    bytes
        .get(MAGIC.len()..HEADER_LEN)
        .map(hex::encode)
}
