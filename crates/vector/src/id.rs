//! Record identifiers.
//!
//! The default scheme is `<unix millis><4-digit suffix>` where the suffix is a
//! hash of a fresh UUID modulo 10000. Two calls in the same millisecond can
//! collide; callers needing global uniqueness use [`IdScheme::Uuid`].

use bioblock_common::IdScheme;
use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generate a record identifier
pub fn generate_id(scheme: IdScheme) -> String {
    match scheme {
        IdScheme::Timestamp => timestamp_id(Utc::now().timestamp_millis(), random_suffix()),
        IdScheme::Uuid => Uuid::new_v4().to_string(),
    }
}

fn timestamp_id(millis: i64, suffix: u16) -> String {
    format!("{}{:04}", millis, suffix)
}

fn random_suffix() -> u16 {
    let digest = Sha256::digest(Uuid::new_v4().to_string().as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    (u64::from_le_bytes(bytes) % 10_000) as u16
}
