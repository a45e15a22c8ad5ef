//! Image upload storage.
//!
//! Files land in `{upload_dir}/{destination}/{millis}-{slug}{ext}` and are
//! served back under `/uploads`.

use std::io::ErrorKind;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use village_portal_core::media::resolve_image_url;

/// URL prefix the upload directory is mounted at.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Extensions accepted without an `image/*` content type.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];

/// Upload errors.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("not an image: {0}")]
    NotAnImage(String),
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Upload target folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// `pengurus`: roster portraits.
    Roster,
    /// `kegiatan`: activity photos.
    Activity,
    /// `hero`: homepage banner.
    Hero,
}

impl Destination {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Roster => "pengurus",
            Self::Activity => "kegiatan",
            Self::Hero => "hero",
        }
    }

    /// Parse a path segment; unknown names are `None`.
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "pengurus" => Some(Self::Roster),
            "kegiatan" => Some(Self::Activity),
            "hero" => Some(Self::Hero),
            _ => None,
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a stored image can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    /// Path relative to the server root, e.g. `/uploads/hero/1700000000000-banner.jpg`.
    pub image_path: String,
    /// `image_path` prefixed with the public base URL when one is configured.
    pub image_url: String,
}

/// An uploaded file as received from the multipart body.
#[derive(Debug)]
pub struct IncomingImage<'a> {
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub bytes: &'a [u8],
}

/// Writes uploads below a root directory.
#[derive(Debug, Clone, Copy)]
pub struct UploadService<'a> {
    root: &'a Path,
    public_base_url: Option<&'a str>,
}

impl<'a> UploadService<'a> {
    #[must_use]
    pub const fn new(root: &'a Path, public_base_url: Option<&'a str>) -> Self {
        Self {
            root,
            public_base_url,
        }
    }

    /// Store an image under `destination`.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::NotAnImage` if neither the content type nor the
    /// extension identifies an image, `UploadError::Io` if writing fails.
    #[tracing::instrument(skip(self, image), fields(destination = %destination, size = image.bytes.len()))]
    pub async fn save(
        &self,
        destination: Destination,
        image: IncomingImage<'_>,
    ) -> Result<StoredImage, UploadError> {
        let original = image.file_name.unwrap_or_default();
        let extension = image_extension(original, image.content_type)
            .ok_or_else(|| UploadError::NotAnImage(original.to_owned()))?;

        let dir = self.root.join(destination.as_str());
        tokio::fs::create_dir_all(&dir).await?;

        let slug = slugify(file_stem(original));
        let mut millis = Utc::now().timestamp_millis();
        let (file_name, mut file) = loop {
            let candidate = stored_file_name(millis, &slug, &extension);
            match create_new(&dir.join(&candidate)).await {
                Ok(file) => break (candidate, file),
                // Same name within the same millisecond
                Err(e) if e.kind() == ErrorKind::AlreadyExists => millis += 1,
                Err(e) => return Err(e.into()),
            }
        };
        let path = dir.join(&file_name);
        write_or_remove(&mut file, &path, image.bytes).await?;

        let image_path = format!("{PUBLIC_PREFIX}/{destination}/{file_name}");
        tracing::info!(path = %image_path, "Stored upload");

        Ok(StoredImage {
            image_url: resolve_image_url(self.public_base_url, &image_path),
            image_path,
        })
    }
}

async fn create_new(path: &Path) -> std::io::Result<tokio::fs::File> {
    tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
}

/// Write `bytes` to a freshly created file, deleting it if the write fails
/// so no truncated image is left behind.
async fn write_or_remove<W>(file: &mut W, path: &Path, bytes: &[u8]) -> std::io::Result<()>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    let written = match file.write_all(bytes).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %cleanup, "Failed to remove partial upload");
        }
        return Err(e);
    }
    Ok(())
}

/// `{millis}-{slug}{ext}`.
#[must_use]
pub fn stored_file_name(millis: i64, slug: &str, extension: &str) -> String {
    format!("{millis}-{slug}{extension}")
}

/// Lowercase ASCII alphanumeric runs joined by `-`, or `image` when nothing
/// survives.
#[must_use]
pub fn slugify(name: &str) -> String {
    let slug = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "image".to_owned()
    } else {
        slug
    }
}

fn file_stem(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(base)
}

/// Extension (with dot, lowercased) to store the file under, or `None` when
/// the upload is not an image.
fn image_extension(file_name: &str, content_type: Option<&str>) -> Option<String> {
    let from_name = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    if let Some(ext) = from_name
        .as_deref()
        .filter(|ext| IMAGE_EXTENSIONS.contains(ext))
    {
        return Some(format!(".{ext}"));
    }

    let subtype = content_type?
        .split(';')
        .next()?
        .trim()
        .to_ascii_lowercase()
        .strip_prefix("image/")?
        .to_owned();

    let ext = match subtype.as_str() {
        "jpeg" | "pjpeg" => "jpg".to_owned(),
        "svg+xml" => "svg".to_owned(),
        other => other.chars().filter(char::is_ascii_alphanumeric).collect(),
    };
    if ext.is_empty() {
        return None;
    }
    Some(format!(".{ext}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_segments() {
        for dest in [Destination::Roster, Destination::Activity, Destination::Hero] {
            assert_eq!(Destination::from_segment(dest.as_str()), Some(dest));
        }
        assert_eq!(Destination::from_segment("dokumen"), None);
        assert_eq!(Destination::from_segment("Hero"), None);
    }

    #[tokio::test]
    async fn test_failed_write_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1700000000000-foto.png");
        std::fs::write(&path, b"").unwrap();

        // Opened read-only, so the write fails.
        let mut file = tokio::fs::File::open(&path).await.unwrap();
        let result = write_or_remove(&mut file, &path, &[0x89, b'P', b'N', b'G']).await;

        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Foto Kades (2024)"), "foto-kades-2024");
        assert_eq!(slugify("--balai__desa--"), "balai-desa");
        assert_eq!(slugify("ßüñ"), "image");
        assert_eq!(slugify(""), "image");
    }

    #[test]
    fn test_file_stem_strips_directories() {
        assert_eq!(file_stem("C:\\Users\\rt\\Kerja Bakti.JPG"), "Kerja Bakti");
        assert_eq!(file_stem("../../etc/passwd"), "passwd");
        assert_eq!(file_stem("noext"), "noext");
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("a.JPG", None).as_deref(), Some(".jpg"));
        assert_eq!(image_extension("a.webp", Some("application/octet-stream")).as_deref(), Some(".webp"));
        assert_eq!(image_extension("blob", Some("image/jpeg")).as_deref(), Some(".jpg"));
        assert_eq!(image_extension("logo", Some("image/svg+xml")).as_deref(), Some(".svg"));
        assert_eq!(image_extension("scan.tiff", Some("image/tiff")).as_deref(), Some(".tiff"));
        assert_eq!(image_extension("payload.exe", Some("image/png")).as_deref(), Some(".png"));
        assert_eq!(image_extension("notes.txt", Some("text/plain")), None);
        assert_eq!(image_extension("run.exe", None), None);
    }

    #[test]
    fn test_stored_file_name() {
        assert_eq!(
            stored_file_name(1_700_000_000_000, "balai-desa", ".png"),
            "1700000000000-balai-desa.png"
        );
    }

    #[tokio::test]
    async fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = UploadService::new(dir.path(), Some("https://desa.example"));

        let stored = service
            .save(
                Destination::Hero,
                IncomingImage {
                    file_name: Some("Banner Utama.PNG"),
                    content_type: Some("image/png"),
                    bytes: b"\x89PNG",
                },
            )
            .await
            .unwrap();

        assert!(stored.image_path.starts_with("/uploads/hero/"));
        assert!(stored.image_path.ends_with("-banner-utama.png"));
        assert_eq!(
            stored.image_url,
            format!("https://desa.example{}", stored.image_path)
        );

        let file_name = stored.image_path.rsplit('/').next().unwrap();
        let on_disk = std::fs::read(dir.path().join("hero").join(file_name)).unwrap();
        assert_eq!(on_disk, b"\x89PNG");
    }

    #[tokio::test]
    async fn test_same_name_twice_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let service = UploadService::new(dir.path(), None);
        let image = || IncomingImage {
            file_name: Some("foto.jpg"),
            content_type: None,
            bytes: b"jpg",
        };

        let first = service.save(Destination::Roster, image()).await.unwrap();
        let second = service.save(Destination::Roster, image()).await.unwrap();

        assert_ne!(first.image_path, second.image_path);
        assert_eq!(first.image_url, first.image_path);
        assert_eq!(std::fs::read_dir(dir.path().join("pengurus")).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let service = UploadService::new(dir.path(), None);

        let err = service
            .save(
                Destination::Activity,
                IncomingImage {
                    file_name: Some("laporan.pdf"),
                    content_type: Some("application/pdf"),
                    bytes: b"%PDF",
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::NotAnImage(_)));
        assert!(!dir.path().join("kegiatan").exists());
    }
}
