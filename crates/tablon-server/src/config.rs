//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Path of the JSON data file holding every channel and message.
    /// Env: `DATA_FILE`
    /// Default: `board.json` under the platform data directory.
    pub data_file: Option<PathBuf>,

    /// Directory where uploaded attachments are stored.
    /// Env: `UPLOAD_DIR`
    /// Default: `uploads` under the platform data directory.
    pub upload_dir: Option<PathBuf>,

    /// Maximum upload size in bytes (200 MiB).
    /// Env: `MAX_UPLOAD_SIZE`
    pub max_upload_size: usize,

    /// Allowed upload file extensions (lowercase, without the dot).
    /// Env: `ALLOWED_EXTENSIONS` (comma-separated, e.g. `png,jpg,pdf`)
    /// Default: unset, meaning every file type is accepted.
    pub allowed_extensions: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8080).into(),
            data_file: None,
            upload_dir: None,
            max_upload_size: 200 * 1024 * 1024, // 200 MiB
            allowed_extensions: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(
                    value = %addr,
                    "Invalid HTTP_ADDR, using default"
                );
            }
        }

        if let Ok(path) = std::env::var("DATA_FILE") {
            config.data_file = Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("UPLOAD_DIR") {
            config.upload_dir = Some(PathBuf::from(path));
        }

        if let Ok(val) = std::env::var("MAX_UPLOAD_SIZE") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_upload_size = n;
            } else {
                tracing::warn!(
                    value = %val,
                    "Invalid MAX_UPLOAD_SIZE, using default"
                );
            }
        }

        if let Ok(val) = std::env::var("ALLOWED_EXTENSIONS") {
            let exts = parse_extensions(&val);
            if exts.is_empty() {
                tracing::warn!("ALLOWED_EXTENSIONS is set but empty, allowing all file types");
            } else {
                config.allowed_extensions = Some(exts);
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

/// Split a comma-separated extension list, lowercased, dots and blanks
/// stripped.
fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.max_upload_size, 200 * 1024 * 1024);
        assert!(config.allowed_extensions.is_none());
        assert!(config.data_file.is_none());
    }

    #[test]
    fn test_parse_extensions() {
        assert_eq!(
            parse_extensions("png, JPG, .pdf"),
            vec!["png", "jpg", "pdf"]
        );
    }

    #[test]
    fn test_parse_extensions_drops_blanks() {
        assert_eq!(parse_extensions(" , ,txt,"), vec!["txt"]);
        assert!(parse_extensions("").is_empty());
    }
}
