//! Image assets referenced by `icon` and `avatar` metadata.
//!
//! Theme images are PNG files living next to the theme file. A metadata
//! value beginning with a path separator is resolved under the theme root
//! instead, which lets several themes share one image directory.

use crate::common::{AssetError, HttpError};
use async_trait::async_trait;
use image::ImageFormat;
use std::path::{Path, PathBuf};

pub const IMAGE_EXTENSION: &str = "png";

/// Client identifier sent with remote fetches; the CDN rejects requests
/// without one.
pub const DEFAULT_USER_AGENT: &str = "Discord-Themer";

/// Resolve an `icon`/`avatar` metadata value to the image file it names.
pub fn resolve_asset_path(themes_root: &Path, theme_file: &Path, value: &str) -> PathBuf {
    let file_name = |base: &str| format!("{base}.{IMAGE_EXTENSION}");

    if value.starts_with(['/', '\\']) {
        return themes_root.join(file_name(value.trim_start_matches(['/', '\\'])));
    }

    match theme_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file_name(value)),
        _ => themes_root.join(file_name(value)),
    }
}

/// Ensure `path` names an existing regular file.
pub fn check_asset(path: &Path) -> Result<(), AssetError> {
    if !path.exists() {
        return Err(AssetError::Missing {
            path: path.to_path_buf(),
        });
    }
    if path.is_dir() {
        return Err(AssetError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Read an image file, refusing files that are not a recognizable image.
pub fn read_image(path: &Path) -> Result<Vec<u8>, AssetError> {
    check_asset(path)?;
    let bytes = std::fs::read(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    image::guess_format(&bytes).map_err(|e| AssetError::Decode {
        origin: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(bytes)
}

/// Downloads a remote image and stores it locally as PNG.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch_png(&self, url: &str, destination: &Path) -> Result<(), AssetError>;
}

/// [`AssetFetcher`] over HTTP with re-encoding through the `image` crate.
#[derive(Debug, Clone)]
pub struct HttpAssetFetcher {
    client: reqwest::Client,
}

impl HttpAssetFetcher {
    pub fn new(user_agent: &str) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| HttpError::ClientCreation {
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| HttpError::RequestFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

        if !response.status().is_success() {
            return Err(HttpError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| HttpError::InvalidResponse {
                expected: "image body".to_string(),
                actual: e.to_string(),
            })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch_png(&self, url: &str, destination: &Path) -> Result<(), AssetError> {
        log::debug!("Fetching {url} into {}", destination.display());
        let bytes = self.fetch_bytes(url).await?;

        let decoded = image::load_from_memory(&bytes).map_err(|e| AssetError::Decode {
            origin: url.to_string(),
            reason: e.to_string(),
        })?;
        decoded
            .save_with_format(destination, ImageFormat::Png)
            .map_err(|e| AssetError::Encode {
                path: destination.to_path_buf(),
                reason: e.to_string(),
            })?;

        log::debug!("PNG conversion done: {}", destination.display());
        Ok(())
    }
}
