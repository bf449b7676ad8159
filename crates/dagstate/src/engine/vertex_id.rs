//! Vertex ID derivation.

use serde::Deserialize;
use sha2::{Digest, Sha256};

/// How a vertex name maps to the key of its status record.
///
/// Every strategy is a pure function of the name, so the same name always
/// yields the same ID for the lifetime of an execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexIdStrategy {
    /// The ID is the name itself. Two vertices with the same name collide.
    #[default]
    Identity,
    /// First 16 hex characters of the SHA-256 of the name.
    Sha256,
}

impl VertexIdStrategy {
    pub fn vertex_id(&self, vertex_name: &str) -> String {
        match self {
            Self::Identity => vertex_name.to_string(),
            Self::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(vertex_name.as_bytes());
                let result = hasher.finalize();
                hex::encode(&result[..8])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        assert_eq!(VertexIdStrategy::Identity.vertex_id("bwa-mem"), "bwa-mem");
        assert_eq!(VertexIdStrategy::default().vertex_id(""), "");
    }

    #[test]
    fn test_sha256_is_stable() {
        let id = VertexIdStrategy::Sha256.vertex_id("abc");
        // sha256("abc") = ba7816bf8f01cfea...
        assert_eq!(id, "ba7816bf8f01cfea");
        assert_eq!(VertexIdStrategy::Sha256.vertex_id("abc"), id);
        assert_ne!(VertexIdStrategy::Sha256.vertex_id("abd"), id);
    }
}
