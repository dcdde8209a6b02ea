//! Deterministic content hashing for scene parameter sets.
//!
//! The digest walks [`ParamPath::ALL`] in canonical order, so two parameter
//! sets with identical path->value mappings hash identically no matter how
//! they were constructed. The hash is the identity key for cached artifacts.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::params::ParamPath;
use crate::storyboard::SceneParameters;

/// SHA-256 digest of one scene's parameter set, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamHash(String);

impl ParamHash {
    /// The hex digest string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParamHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash a scene's parameter set.
///
/// Pure and deterministic: equal mappings produce equal digests, and any
/// differing value produces a different digest. Each value is framed with
/// its byte length, keeping the encoding prefix-free: free-text values can
/// contain any bytes (newlines included) without two distinct mappings
/// colliding on the same digest.
pub fn hash_params(params: &SceneParameters) -> ParamHash {
    let mut hasher = Sha256::new();
    for path in ParamPath::ALL {
        let value = path.get(params).canonical();
        hasher.update(path.as_str().as_bytes());
        hasher.update(b"=");
        hasher.update((value.len() as u64).to_le_bytes());
        hasher.update(value.as_bytes());
    }
    ParamHash(hex::encode(hasher.finalize()))
}

/// Paths whose values differ between two parameter sets.
pub fn diff(old: &SceneParameters, new: &SceneParameters) -> Vec<ParamPath> {
    ParamPath::ALL
        .into_iter()
        .filter(|path| path.get(old) != path.get(new))
        .collect()
}
