use serde::{Deserialize, Serialize};

/// Authentication material for one outgoing request. Never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub access_id: String,
    /// Base64 HMAC-SHA256 digest of the canonical string.
    pub signature: String,
    pub nonce: String,
    /// Unix seconds, dated into the future.
    pub timestamp: String,
}

/// A signature for the confirm-token endpoint together with the open-auth
/// token it returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureWithOpenAuth {
    pub access_id: String,
    pub signature: String,
    pub nonce: String,
    pub timestamp: String,
    pub open_auth: String,
}

impl SignatureWithOpenAuth {
    pub fn new(signature: Signature, open_auth: String) -> Self {
        Self {
            access_id: signature.access_id,
            signature: signature.signature,
            nonce: signature.nonce,
            timestamp: signature.timestamp,
            open_auth,
        }
    }
}
