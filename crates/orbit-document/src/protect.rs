// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Visual-lock protection.
//
// This is NOT cryptographic protection. A protected document is an image-only
// rebuild of the original plus a password digest in /Info; engines that
// honour the record refuse to open it without the password. Any other reader
// shows the pages.

use lopdf::{Document, Object};
use orbit_core::{EngineError, ProtectionIntent, RenderSettings, Result};
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};

use crate::pdf::handle::DocumentHandle;
use crate::pdf::objects::{resolve_dict, text_string};
use crate::raster::backend::PageRasterizer;
use crate::raster::pipeline::{RebuildOptions, rasterize_and_rebuild, rebuild};

pub const LOCK_KEY: &str = "OrbitVisualLock";
pub const OWNER_LOCK_KEY: &str = "OrbitVisualLockOwner";
pub const PERMISSIONS_KEY: &str = "OrbitVisualLockPermissions";

const LOCK_SALT: &str = "orbit-visual-lock:";

/// Where password protection is applied to an image-only document.
pub trait ProtectionBackend {
    /// Protect an already rasterized document in place.
    fn protect(&self, image_only: &mut DocumentHandle, intent: &ProtectionIntent) -> Result<()>;

    /// Check `password` against a loaded document. Unprotected documents
    /// always pass.
    fn verify(&self, document: &Document, password: Option<&str>) -> Result<()>;
}

/// Password-gated display via a digest record in the document information
/// dictionary.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisualLock;

impl ProtectionBackend for VisualLock {
    fn protect(&self, image_only: &mut DocumentHandle, intent: &ProtectionIntent) -> Result<()> {
        if intent.user_password.is_empty() {
            return Err(EngineError::InvalidArgument(
                "a non-empty password is required to protect a document".to_string(),
            ));
        }
        let owner = if intent.owner_password.is_empty() {
            &intent.user_password
        } else {
            &intent.owner_password
        };
        let permissions: Vec<&str> = intent.permissions.iter().map(|p| p.keyword()).collect();

        let info = image_only.info_dict_mut()?;
        info.set(LOCK_KEY, text_string(&lock_digest(&intent.user_password)));
        info.set(OWNER_LOCK_KEY, text_string(&lock_digest(owner)));
        info.set(PERMISSIONS_KEY, text_string(&permissions.join(" ")));
        Ok(())
    }

    fn verify(&self, document: &Document, password: Option<&str>) -> Result<()> {
        check_lock(document, password)
    }
}

/// Hex SHA-256 of the salted password.
pub fn lock_digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(LOCK_SALT.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn info_string(document: &Document, key: &str) -> Option<String> {
    let info = document
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| resolve_dict(document, obj))?;
    match info.get(key.as_bytes()).ok()? {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

/// Gate on a visual-lock record: no record passes; a record without a
/// password, or with one matching neither digest, is `Encrypted`.
pub fn check_lock(document: &Document, password: Option<&str>) -> Result<()> {
    let Some(user_digest) = info_string(document, LOCK_KEY) else {
        return Ok(());
    };
    let Some(password) = password else {
        return Err(EngineError::Encrypted(
            "document is visual-locked; a password is required".to_string(),
        ));
    };
    let digest = lock_digest(password);
    let owner_digest = info_string(document, OWNER_LOCK_KEY);
    if digest == user_digest || owner_digest.as_deref() == Some(digest.as_str()) {
        Ok(())
    } else {
        warn!("Visual-lock password mismatch");
        Err(EngineError::Encrypted("incorrect password".to_string()))
    }
}

/// Rasterize the document and lock the image-only result with `backend`.
#[instrument(skip_all, fields(bytes_len = data.len()))]
pub fn protect(
    rasterizer: &dyn PageRasterizer,
    backend: &dyn ProtectionBackend,
    data: &[u8],
    intent: &ProtectionIntent,
    settings: RenderSettings,
) -> Result<Vec<u8>> {
    if intent.user_password.is_empty() {
        return Err(EngineError::InvalidArgument(
            "a non-empty password is required to protect a document".to_string(),
        ));
    }
    let mut rebuilt = rebuild(
        rasterizer,
        data,
        &RebuildOptions {
            settings,
            ..Default::default()
        },
    )?;
    backend.protect(&mut rebuilt.handle, intent)?;
    info!(pages = rebuilt.rendered, "Document protected");
    rebuilt.handle.save()
}

/// Open with `password` and rasterize into a copy with no lock.
#[instrument(skip_all, fields(bytes_len = data.len()))]
pub fn unlock(
    rasterizer: &dyn PageRasterizer,
    data: &[u8],
    password: &str,
    settings: RenderSettings,
) -> Result<Vec<u8>> {
    rasterize_and_rebuild(
        rasterizer,
        data,
        &RebuildOptions {
            password: Some(password),
            settings,
            ..Default::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeRasterizer, fixture_pdf};
    use orbit_core::Permission;

    #[test]
    fn digest_is_salted_sha256() {
        let digest = lock_digest("secret");
        assert_eq!(digest.len(), 64);
        assert_ne!(digest, lock_digest("Secret"));
        assert_eq!(digest, lock_digest("secret"));
    }

    #[test]
    fn unlocked_documents_pass_any_password() {
        let doc = Document::load_mem(&fixture_pdf(&["a"])).unwrap();
        assert!(check_lock(&doc, None).is_ok());
        assert!(check_lock(&doc, Some("whatever")).is_ok());
    }

    #[test]
    fn protect_then_gate_on_load() {
        let rasterizer = FakeRasterizer::default();
        let intent = ProtectionIntent {
            user_password: "open".into(),
            owner_password: "admin".into(),
            permissions: vec![Permission::Print],
        };
        let locked = protect(
            &rasterizer,
            &VisualLock,
            &fixture_pdf(&["a", "b"]),
            &intent,
            RenderSettings::new(0.1, 0.8),
        )
        .unwrap();

        assert!(matches!(
            DocumentHandle::load(&locked),
            Err(EngineError::Encrypted(_))
        ));
        let load = |password| {
            DocumentHandle::load_with(
                &locked,
                crate::pdf::handle::LoadOptions {
                    password: Some(password),
                    ..Default::default()
                },
            )
        };
        assert!(matches!(load("wrong"), Err(EngineError::Encrypted(_))));
        assert_eq!(load("open").unwrap().page_count(), 2);
        assert!(load("admin").is_ok());

        let unlocked = unlock(&rasterizer, &locked, "open", RenderSettings::new(0.1, 0.8)).unwrap();
        let reopened = DocumentHandle::load(&unlocked).unwrap();
        assert_eq!(reopened.page_count(), 2);
        assert!(check_lock(reopened.document(), None).is_ok());
    }

    #[test]
    fn empty_password_is_rejected() {
        let result = protect(
            &FakeRasterizer::default(),
            &VisualLock,
            &fixture_pdf(&["a"]),
            &ProtectionIntent::with_password(""),
            RenderSettings::default(),
        );
        assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
    }
}
