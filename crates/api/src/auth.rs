//! Request authentication.
//!
//! Two independent mechanisms, mirroring how WordPress protects these
//! surfaces:
//!
//! - an optional static API token (`Authorization: Token <key>`) guarding
//!   the read endpoints;
//! - WordPress session verification for the newsletter endpoint: the
//!   caller presents a user id and a raw session token, which is hashed
//!   and looked up in the user's `session_tokens` metadata blob.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use hareline_core::phpserde;
use hareline_core::store::RawMetaRow;

use crate::error::AppError;

/// Check the static API token. A server without a configured token
/// accepts every request.
pub fn api_token_valid(headers: &HeaderMap, expected: Option<&str>) -> Result<(), AppError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::TokenValidationFailed)?;

    if presented == format!("Token {expected}") {
        Ok(())
    } else {
        Err(AppError::TokenValidationFailed)
    }
}

/// Verify a raw WordPress session token against the user's
/// `session_tokens` metadata.
///
/// WordPress stores sessions keyed by a hash of the raw token: SHA-256
/// on current installs, SHA-1 on older ones, so both are tried. The
/// matching session must carry an integer `expiration` timestamp in the
/// future.
pub fn verify_session_token(
    user_meta: &[RawMetaRow],
    user_id: i64,
    token: &str,
    now: i64,
) -> Result<(), AppError> {
    let session_tokens = user_meta
        .iter()
        .find(|row| row.key == "session_tokens")
        .map(|row| row.value.as_str())
        .ok_or_else(|| {
            tracing::debug!(user_id, "No session_tokens metadata found");
            AppError::CredentialsInvalid
        })?;

    let sessions = phpserde::decode(session_tokens).map_err(|e| {
        tracing::debug!(user_id, error = %e, "PHP deserialization of session_tokens failed");
        AppError::CredentialsInvalid
    })?;

    let sha256_key = format!("{:x}", Sha256::digest(token.as_bytes()));
    let sha1_key = format!("{:x}", Sha1::digest(token.as_bytes()));

    let session = sessions
        .get(&sha256_key)
        .or_else(|| sessions.get(&sha1_key))
        .ok_or_else(|| {
            tracing::debug!(user_id, "No session data found for presented token");
            AppError::CredentialsInvalid
        })?;

    let expiration = session
        .get("expiration")
        .and_then(phpserde::PhpValue::as_int)
        .ok_or_else(|| {
            tracing::debug!(user_id, "Session expiration is not an integer");
            AppError::CredentialsInvalid
        })?;

    if expiration < now {
        tracing::debug!(user_id, expiration, "Session already expired");
        return Err(AppError::CredentialsInvalid);
    }

    Ok(())
}
