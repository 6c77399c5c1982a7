//! Download payload integrity verification.
//!
//! The catalog reports an optional integrity digest per bundle version in
//! the form `<algorithm>:<hex>`, e.g. `sha256:9f86d0…`. After a download
//! completes, the digest is recomputed over the received bytes and
//! compared. What happens when the server reports no digest is governed by
//! [`IntegrityPolicy`].

use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;

/// How to treat bundles without integrity metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrityPolicy {
    /// Fail when the catalog reports no integrity digest.
    Strict,
    /// Verify when a digest is present, skip otherwise.
    #[default]
    IfPresent,
    /// Never verify.
    Off,
}

/// Errors from integrity verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// Policy is strict and the server reported no digest.
    #[error("the catalog reported no integrity digest for this bundle")]
    Missing,

    /// The digest string is not `<algorithm>:<hex>`.
    #[error("malformed integrity digest: {0:?}")]
    Malformed(String),

    /// The digest names an algorithm this tool does not compute.
    #[error("unsupported integrity algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The recomputed digest does not match the reported one.
    #[error("integrity mismatch: expected {expected}, computed {computed}")]
    Mismatch { expected: String, computed: String },
}

/// Verify a payload against the catalog-reported digest under a policy.
pub fn verify(
    policy: IntegrityPolicy,
    integrity: Option<&str>,
    payload: &[u8],
) -> Result<(), IntegrityError> {
    match (policy, integrity) {
        (IntegrityPolicy::Off, _) => Ok(()),
        (IntegrityPolicy::Strict, None) => Err(IntegrityError::Missing),
        (IntegrityPolicy::IfPresent, None) => Ok(()),
        (_, Some(digest)) => check_digest(digest, payload),
    }
}

fn check_digest(digest: &str, payload: &[u8]) -> Result<(), IntegrityError> {
    let (algorithm, expected) = digest
        .split_once(':')
        .ok_or_else(|| IntegrityError::Malformed(digest.to_string()))?;
    if expected.is_empty() {
        return Err(IntegrityError::Malformed(digest.to_string()));
    }
    let computed = match algorithm {
        "sha256" => hex_digest(Sha256::digest(payload).as_slice()),
        "sha512" => hex_digest(Sha512::digest(payload).as_slice()),
        other => return Err(IntegrityError::UnsupportedAlgorithm(other.to_string())),
    };
    if computed == expected.to_lowercase() {
        Ok(())
    } else {
        Err(IntegrityError::Mismatch {
            expected: expected.to_lowercase(),
            computed,
        })
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
