//! Filesystem storage for message attachments.
//!
//! Uploads land in one flat content directory under a composite storage
//! name: a sortable UTC timestamp at microsecond granularity, an
//! underscore, then the sanitized original filename. The timestamp prefix
//! keeps same-named uploads from colliding; the name doubles as the
//! `attachmentRef` recorded on the owning message.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tracing::{debug, info};

use crate::error::ServerError;

/// Resolve an untrusted file name against the base directory, refusing
/// anything that would land outside it. Prevents path traversal attacks.
fn resolve_within(base: &Path, name: &str) -> Result<PathBuf, ServerError> {
    // Canonicalize the base; the target may not exist yet so its
    // components are normalized by hand
    let canonical_base = base.canonicalize().unwrap_or_else(|_| base.to_path_buf());
    let mut resolved = canonical_base.clone();
    for component in Path::new(name).components() {
        match component {
            std::path::Component::Normal(c) => resolved.push(c),
            std::path::Component::ParentDir => {
                return Err(ServerError::BadRequest(
                    "Path traversal detected".to_string(),
                ));
            }
            _ => {} // RootDir, CurDir, Prefix: skip
        }
    }
    if !resolved.starts_with(&canonical_base) {
        return Err(ServerError::BadRequest(
            "Path traversal detected".to_string(),
        ));
    }
    Ok(resolved)
}

/// Reduce an uploaded filename to a filesystem-safe form: the last path
/// component only, every character outside `[A-Za-z0-9._-]` replaced with
/// an underscore, leading dots stripped.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let safe: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim_start_matches('.');
    if safe.is_empty() {
        "file".to_string()
    } else {
        safe.to_string()
    }
}

// ---------------------------------------------------------------------------
// ExtensionPolicy
// ---------------------------------------------------------------------------

/// Upload filename filter: the content predicate handed to
/// [`AttachmentStore::store`] by the request handlers.
///
/// With no extension list configured, every file is accepted. With one, a
/// filename passes only if it has an extension on the list; a filename
/// without any extension is rejected.
#[derive(Debug, Clone, Default)]
pub struct ExtensionPolicy {
    allowed: Option<Vec<String>>,
}

impl ExtensionPolicy {
    /// Accept every file type.
    pub fn allow_all() -> Self {
        Self { allowed: None }
    }

    /// Accept only files whose extension (case-insensitive) is listed.
    pub fn restrict_to(extensions: impl IntoIterator<Item = String>) -> Self {
        Self {
            allowed: Some(
                extensions
                    .into_iter()
                    .map(|e| e.to_ascii_lowercase())
                    .collect(),
            ),
        }
    }

    pub fn allows(&self, filename: &str) -> bool {
        let Some(allowed) = &self.allowed else {
            return true;
        };
        match filename.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => {
                allowed.iter().any(|a| a.eq_ignore_ascii_case(ext))
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// AttachmentStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AttachmentStore {
    content_dir: PathBuf,
    max_size: usize,
}

impl AttachmentStore {
    pub async fn new(content_dir: PathBuf, max_size: usize) -> Result<Self, ServerError> {
        fs::create_dir_all(&content_dir).await.map_err(|e| {
            ServerError::AttachmentStorage(format!(
                "Failed to create content directory '{}': {}",
                content_dir.display(),
                e
            ))
        })?;

        info!(path = %content_dir.display(), "Attachment store initialized");

        Ok(Self {
            content_dir,
            max_size,
        })
    }

    /// Store an uploaded payload and return its storage name.
    ///
    /// `allow` is the pluggable content predicate; a `false` verdict is a
    /// client error, not a crash. Collisions on the composite name (two
    /// uploads within the same microsecond) retry with a fresh timestamp
    /// until a free name is found.
    pub async fn store<F>(
        &self,
        original_name: &str,
        data: &[u8],
        allow: F,
    ) -> Result<String, ServerError>
    where
        F: Fn(&str) -> bool,
    {
        if !allow(original_name) {
            return Err(ServerError::AttachmentRejected(original_name.to_string()));
        }
        if data.len() > self.max_size {
            return Err(ServerError::AttachmentTooLarge {
                size: data.len(),
                max: self.max_size,
            });
        }

        let safe = sanitize_filename(original_name);
        let storage_name = loop {
            let stamp = Utc::now().format("%Y%m%d%H%M%S%6f");
            let candidate = format!("{stamp}_{safe}");
            if !self.content_dir.join(&candidate).exists() {
                break candidate;
            }
        };

        let path = resolve_within(&self.content_dir, &storage_name)?;
        fs::write(&path, data).await.map_err(|e| {
            ServerError::AttachmentStorage(format!(
                "Failed to write attachment {}: {}",
                storage_name, e
            ))
        })?;

        debug!(name = %storage_name, size = data.len(), "Stored attachment");
        Ok(storage_name)
    }

    /// Read an attachment back by its storage name.
    ///
    /// Hard contract: the resolved path must stay inside the content
    /// directory. References carrying separators or `..` are rejected
    /// outright, and [`resolve_within`] re-checks the final path.
    pub async fn resolve(&self, storage_ref: &str) -> Result<Vec<u8>, ServerError> {
        if storage_ref.contains('/') || storage_ref.contains('\\') || storage_ref.contains("..") {
            return Err(ServerError::BadRequest(
                "Path traversal detected".to_string(),
            ));
        }

        let path = resolve_within(&self.content_dir, storage_ref)?;
        if !path.is_file() {
            return Err(ServerError::AttachmentNotFound(storage_ref.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            ServerError::AttachmentStorage(format!(
                "Failed to read attachment {}: {}",
                storage_ref, e
            ))
        })?;

        debug!(name = %storage_ref, size = data.len(), "Resolved attachment");
        Ok(data)
    }
}
