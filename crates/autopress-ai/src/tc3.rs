//! TC3-HMAC-SHA256 request signing
//!
//! The image API authenticates with the TC3 scheme: a canonical request is
//! hashed, folded into a string-to-sign with the credential scope, and
//! signed with a key derived by chaining HMAC over date, service and the
//! literal `tc3_request`. Only the `content-type` and `host` headers are
//! signed.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

const ALGORITHM: &str = "TC3-HMAC-SHA256";
const SIGNED_HEADERS: &str = "content-type;host";
const CONTENT_TYPE: &str = "application/json; charset=utf-8";

type HmacSha256 = Hmac<Sha256>;

/// Credentials and endpoint identity for one signing domain
#[derive(Debug, Clone)]
pub struct Tc3Signer {
    secret_id: String,
    secret_key: String,
    service: String,
    host: String,
}

/// The computed signature material for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Value for the `Authorization` header
    pub authorization: String,
    /// Unix timestamp the signature was computed for (`X-TC-Timestamp`)
    pub timestamp: i64,
}

impl Tc3Signer {
    pub fn new(
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
        service: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
            service: service.into(),
            host: host.into(),
        }
    }

    /// Sign a POST body at the given instant.
    ///
    /// Deterministic in `now`, which keeps the derivation testable against
    /// fixed vectors.
    pub fn sign(&self, body: &str, now: DateTime<Utc>) -> SignedRequest {
        let timestamp = now.timestamp();
        let date = now.format("%Y-%m-%d").to_string();

        let hashed_body = sha256_hex(body.as_bytes());
        let canonical_request = format!(
            "POST\n/\n\ncontent-type:{}\nhost:{}\n\n{}\n{}",
            CONTENT_TYPE, self.host, SIGNED_HEADERS, hashed_body
        );

        let credential_scope = format!("{}/{}/tc3_request", date, self.service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            timestamp,
            credential_scope,
            sha256_hex(canonical_request.as_bytes())
        );

        let secret_date = hmac_sha256(format!("TC3{}", self.secret_key).as_bytes(), date.as_bytes());
        let secret_service = hmac_sha256(&secret_date, self.service.as_bytes());
        let secret_signing = hmac_sha256(&secret_service, b"tc3_request");
        let signature = hex::encode(hmac_sha256(&secret_signing, string_to_sign.as_bytes()));

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.secret_id, credential_scope, SIGNED_HEADERS, signature
        );

        SignedRequest {
            authorization,
            timestamp,
        }
    }

    /// Content type the signature commits to
    pub fn content_type() -> &'static str {
        CONTENT_TYPE
    }
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
