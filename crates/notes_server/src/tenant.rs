//! Bearer-token tenant verification.
//!
//! A token is the hex encoding of 8 random tenant bytes followed by
//! HMAC-SHA256(secret, tenant bytes). The tenant id is the hex of the 8 bytes.

use crate::{error::HttpError, AppState};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Raw tenant id length in bytes.
pub const TENANT_ID_LEN: usize = 8;

/// Checks tenant tokens against the server's signing secret.
#[derive(Clone)]
pub struct TenantVerifier {
    secret: Vec<u8>,
}

impl TenantVerifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Return the tenant id carried by `token` if its signature checks out.
    pub fn verify(&self, token: &str) -> Option<String> {
        let bytes = hex::decode(token.trim()).ok()?;
        if bytes.len() <= TENANT_ID_LEN {
            return None;
        }
        let (tenant, signature) = bytes.split_at(TENANT_ID_LEN);

        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(tenant);
        mac.verify_slice(signature).ok()?;
        Some(hex::encode(tenant))
    }
}

/// Tenant id extracted from a verified `Authorization: Bearer` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant(pub String);

#[axum::async_trait]
impl FromRequestParts<AppState> for Tenant {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| HttpError::unauthorized("Missing bearer token"))?;

        state
            .tenants
            .verify(token)
            .map(Tenant)
            .ok_or_else(|| HttpError::bad_request("Invalid tenant supplied"))
    }
}
