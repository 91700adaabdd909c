use serde::{Deserialize, Serialize};

/// JWT claims carried by customer access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Customer id, stringified.
    pub sub: String,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

/// The authenticated principal every workflow operation acts on behalf of.
/// Produced by the bearer-token extractor; handlers never touch the token
/// transport themselves.
#[derive(Debug, Clone)]
pub struct AuthenticatedCustomer {
    pub customer_id: i64,
    pub email: String,
}
