use serde::{Deserialize, Serialize};

/// JWT payload used for authentication: the user's id and an expiry epoch.
/// Signed, not encrypted; self-contained, so there is no server-side
/// session store and no pre-expiry revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,   // user ID
    pub exp: usize, // expires at (unix timestamp)
}
