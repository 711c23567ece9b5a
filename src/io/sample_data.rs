use crate::types::{BiomassError, BiomassResult};
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Google Drive file id of the bundled Sentinel-2 test images
pub const SAMPLE_ARCHIVE_ID: &str = "1ICvruBHE-x2V2qeYRErmZUsyNrGV-ZjF";

/// File name the archive is stored under while it is being extracted
pub const SAMPLE_ARCHIVE_NAME: &str = "Testimages.zip";

/// Downloader for the bundled sample images
pub struct SampleDataFetcher {
    url: String,
    timeout_secs: u64,
}

impl SampleDataFetcher {
    /// Fetcher for the default Google Drive archive
    pub fn new() -> Self {
        Self::with_url(format!(
            "https://drive.google.com/uc?export=download&confirm=t&id={}",
            SAMPLE_ARCHIVE_ID
        ))
    }

    /// Fetcher for an arbitrary archive URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: 300,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download the archive into `dest_dir`, extract it there and remove the
    /// archive afterwards. Returns the directory the images were extracted to.
    pub fn fetch_and_extract<P: AsRef<Path>>(&self, dest_dir: P) -> BiomassResult<PathBuf> {
        let dest_dir = dest_dir.as_ref();
        let archive_path = dest_dir.join(SAMPLE_ARCHIVE_NAME);

        log::info!("Downloading the images...");
        self.download(&archive_path)?;

        log::info!("Extracting the images...");
        let count = extract_and_remove(&archive_path, dest_dir)?;

        log::info!("Images extracted successfully! ({} entries)", count);
        Ok(dest_dir.to_path_buf())
    }

    fn download(&self, output_path: &Path) -> BiomassResult<()> {
        log::debug!("Fetching sample archive from: {}", self.url);

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .user_agent(concat!("biomass/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BiomassError::Download(format!("Failed to create HTTP client: {}", e)))?;

        let response = client
            .get(&self.url)
            .send()
            .map_err(|e| BiomassError::Download(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(BiomassError::Download(format!(
                "HTTP {} {}: {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or(""),
                self.url
            )));
        }

        let content = response
            .bytes()
            .map_err(|e| BiomassError::Download(format!("Failed to read response body: {}", e)))?;

        if !is_zip_content(&content) {
            return Err(BiomassError::Download(format!(
                "Response from {} is not a ZIP archive ({} bytes), likely an error page",
                self.url,
                content.len()
            )));
        }

        log::debug!("Downloaded {} bytes", content.len());
        std::fs::write(output_path, &content)?;
        Ok(())
    }
}

impl Default for SampleDataFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Check ZIP magic bytes
fn is_zip_content(content: &[u8]) -> bool {
    content.len() >= 4 && content[0..4] == [0x50, 0x4B, 0x03, 0x04]
}

/// Extract every entry of a ZIP archive into `dest_dir`, returning the number
/// of entries written
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(archive_path: P, dest_dir: Q) -> BiomassResult<usize> {
    let file = File::open(archive_path.as_ref())?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| BiomassError::Download(format!("Failed to open ZIP archive: {}", e)))?;

    let count = archive.len();
    archive
        .extract(dest_dir.as_ref())
        .map_err(|e| BiomassError::Download(format!("Failed to extract ZIP archive: {}", e)))?;

    log::debug!("Extracted {} entries into {}", count, dest_dir.as_ref().display());
    Ok(count)
}

/// Extract a downloaded archive into `dest_dir` and delete the archive,
/// whether or not extraction succeeded
pub fn extract_and_remove<P: AsRef<Path>, Q: AsRef<Path>>(archive_path: P, dest_dir: Q) -> BiomassResult<usize> {
    let archive_path = archive_path.as_ref();
    let extracted = extract_archive(archive_path, dest_dir);

    if let Err(e) = std::fs::remove_file(archive_path) {
        log::warn!("Could not remove {}: {}", archive_path.display(), e);
    }
    extracted
}
