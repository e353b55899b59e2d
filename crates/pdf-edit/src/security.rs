//! Password protection and removal.
//!
//! All cryptography lives in lopdf; this module only validates input and
//! drives the library's encryption state machine.

use lopdf::encryption::{EncryptionState, EncryptionVersion, Permissions};

use crate::io::{load_document, save_document};
use crate::types::{EditError, Result};

/// Encrypt a document with `password` (used as both user and owner
/// password) with RC4 128-bit and full permissions.
pub fn protect_document(bytes: &[u8], password: &str) -> Result<Vec<u8>> {
    if password.is_empty() {
        return Err(EditError::InvalidInput(
            "password must not be empty".to_string(),
        ));
    }

    let mut doc = load_document(bytes)?;
    let state = EncryptionState::try_from(EncryptionVersion::V2 {
        document: &doc,
        owner_password: password,
        user_password: password,
        key_length: 128,
        permissions: Permissions::all(),
    })
    .map_err(|err| EditError::Encryption(err.to_string()))?;

    doc.encrypt(&state)
        .map_err(|err| EditError::Encryption(err.to_string()))?;
    save_document(doc)
}

/// Decrypt a password-protected document so it saves as plain PDF. A
/// wrong password surfaces as an encryption error from the library; an
/// unencrypted input passes through unchanged.
pub fn unlock_document(bytes: &[u8], password: &str) -> Result<Vec<u8>> {
    if password.is_empty() {
        return Err(EditError::InvalidInput(
            "password must not be empty".to_string(),
        ));
    }

    let mut doc = load_document(bytes)?;
    if !doc.is_encrypted() {
        log::debug!("unlock requested for unencrypted document, passing through");
        return save_document(doc);
    }

    doc.decrypt(password)
        .map_err(|err| EditError::Encryption(format!("failed to unlock: {err}")))?;
    doc.trailer.remove(b"Encrypt");
    save_document(doc)
}
