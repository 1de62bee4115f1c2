use base64::{engine::general_purpose::STANDARD, Engine};
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};

/// Per-file size limit for product images
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
/// Maximum number of uploaded files per product request
pub const MAX_IMAGES_PER_REQUEST: usize = 5;
/// URL prefix under which stored images are served
pub const PUBLIC_PREFIX: &str = "uploads";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Only image files are allowed!")]
    NotAnImage,
    #[error("Image exceeds the {} MB limit", MAX_IMAGE_BYTES / (1024 * 1024))]
    TooLarge,
    #[error("Too many files: at most {} images per request", MAX_IMAGES_PER_REQUEST)]
    TooManyFiles,
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),
    #[error("Failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// An image file part received from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Writes product images to a local directory and hands back their public references.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        ImageStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<unix millis>-<random>` followed by `ext`
    pub fn unique_name(ext: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        format!("{}-{}{}", millis, suffix, ext)
    }

    /// Extension (with dot) of an uploaded filename, or empty.
    pub fn extension_of(file_name: &str) -> String {
        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default()
    }

    fn extension_for_mime(mime: &str) -> String {
        match mime.strip_prefix("image/").unwrap_or("") {
            "jpeg" | "jpg" => ".jpg".to_string(),
            "svg+xml" => ".svg".to_string(),
            "" => String::new(),
            other => format!(".{}", other),
        }
    }

    async fn write(&self, ext: &str, bytes: &[u8]) -> Result<String, UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let name = Self::unique_name(ext);
        let path = self.dir.join(&name);
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            error!("Failed to write image {}: {}", path.display(), e);
            UploadError::Io(e)
        })?;
        debug!("Stored image {} ({} bytes)", path.display(), bytes.len());
        Ok(format!("{}/{}", PUBLIC_PREFIX, name))
    }

    #[instrument(skip(self, image), fields(content_type = %image.content_type, size = image.bytes.len()))]
    pub async fn save_upload(&self, image: &UploadedImage) -> Result<String, UploadError> {
        if !image.content_type.starts_with("image/") {
            return Err(UploadError::NotAnImage);
        }
        if image.bytes.len() > MAX_IMAGE_BYTES {
            return Err(UploadError::TooLarge);
        }
        let ext = image
            .file_name
            .as_deref()
            .map(Self::extension_of)
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| Self::extension_for_mime(&image.content_type));
        self.write(&ext, &image.bytes).await
    }

    /// Decodes a `data:image/<type>;base64,<payload>` string and stores it.
    #[instrument(skip(self, data_url))]
    pub async fn save_data_url(&self, data_url: &str) -> Result<String, UploadError> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| UploadError::InvalidDataUrl("missing data: prefix".to_string()))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| UploadError::InvalidDataUrl("missing payload".to_string()))?;
        let mime = meta
            .strip_suffix(";base64")
            .ok_or_else(|| UploadError::InvalidDataUrl("only base64 payloads are supported".to_string()))?;
        if !mime.starts_with("image/") {
            return Err(UploadError::NotAnImage);
        }
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| UploadError::InvalidDataUrl(e.to_string()))?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(UploadError::TooLarge);
        }
        self.write(&Self::extension_for_mime(mime), &bytes).await
    }

    /// Stores every uploaded file and every data URL, keeps plain URLs as given,
    /// and drops duplicates while preserving first-seen order.
    pub async fn resolve_images(&self, uploads: &[UploadedImage], refs: &[String]) -> Result<Vec<String>, UploadError> {
        if uploads.len() > MAX_IMAGES_PER_REQUEST {
            return Err(UploadError::TooManyFiles);
        }
        let mut images = Vec::with_capacity(uploads.len() + refs.len());
        for upload in uploads {
            images.push(self.save_upload(upload).await?);
        }
        for reference in refs {
            let reference = reference.trim();
            if reference.is_empty() {
                continue;
            }
            if reference.starts_with("data:") {
                images.push(self.save_data_url(reference).await?);
            } else {
                images.push(reference.to_string());
            }
        }
        let images = dedup_preserving_order(images);
        info!("Resolved {} product images", images.len());
        Ok(images)
    }
}

pub fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|i| seen.insert(i.clone())).collect()
}
