use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write asset to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`; total is 0 when
/// the server sends no Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Resolves a named asset (e.g. the overlay label font), downloading it
/// into the user cache on first use. Subsequent runs hit the cache.
pub fn resolve(
    name: &str,
    url: &str,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, AssetResolveError> {
    let cache_dir = asset_cache_dir()?;
    let cached = cache_dir.join(name);
    if cached.exists() {
        return Ok(cached);
    }

    fs::create_dir_all(&cache_dir).map_err(AssetResolveError::CacheDir)?;
    download(url, &cached, progress)?;
    Ok(cached)
}

pub fn asset_cache_dir() -> Result<PathBuf, AssetResolveError> {
    dirs::cache_dir()
        .map(|d| d.join("Rollcall").join("assets"))
        .ok_or(AssetResolveError::NoCacheDir)
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), AssetResolveError> {
    let response = reqwest::blocking::get(url).map_err(|e| AssetResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;
    let total = response.content_length().unwrap_or(0);
    let bytes = response.bytes().map_err(|e| AssetResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;

    // Stage under a .part name so a failed download never leaves a
    // truncated asset at the final path.
    let staging = dest.with_extension("part");
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |e: std::io::Error| AssetResolveError::Write { path, source: e }
    };

    let mut file = fs::File::create(&staging).map_err(write_err(&staging))?;
    let mut written: u64 = 0;
    for chunk in bytes.chunks(512 * 1024) {
        file.write_all(chunk).map_err(write_err(&staging))?;
        written += chunk.len() as u64;
        if let Some(ref cb) = progress {
            cb(written, total);
        }
    }
    file.flush().map_err(write_err(&staging))?;
    drop(file);

    fs::rename(&staging, dest).map_err(write_err(dest))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_dir_is_under_rollcall() {
        let dir = asset_cache_dir().unwrap();
        assert!(dir.to_string_lossy().contains("Rollcall"));
        assert!(dir.to_string_lossy().contains("assets"));
    }

    #[test]
    fn test_download_invalid_url_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("font.ttf");
        let result = download("http://invalid.nonexistent.example.com/font.ttf", &dest, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_failed_download_leaves_no_partial_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("font.ttf");
        let _ = download("http://invalid.nonexistent.example.com/font.ttf", &dest, None);
        assert!(!dest.exists());
        assert!(!dest.with_extension("part").exists());
    }

    #[test]
    fn test_download_from_mock_server_reports_progress() {
        let mut server = mockito::Server::new();
        let body = vec![7u8; 2048];
        let _m = server
            .mock("GET", "/font.ttf")
            .with_status(200)
            .with_body(body.clone())
            .create();

        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("font.ttf");
        let seen = std::sync::Arc::new(std::sync::atomic::AtomicU64::new(0));
        let seen_clone = seen.clone();

        download(
            &format!("{}/font.ttf", server.url()),
            &dest,
            Some(Box::new(move |written, _total| {
                seen_clone.store(written, std::sync::atomic::Ordering::Relaxed);
            })),
        )
        .unwrap();

        assert_eq!(fs::read(&dest).unwrap(), body);
        assert_eq!(seen.load(std::sync::atomic::Ordering::Relaxed), 2048);
    }
}
