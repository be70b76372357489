//! Named binary blobs with a media type.
//!
//! An [`Asset`] is what the compressor consumes and produces. Input assets
//! are usually file backed: [`Asset::open`] only stats the file, and the
//! bytes are read when the asset is compressed. Output assets always hold
//! their bytes in memory.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Media type of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaType {
    Jpeg,
    Png,
    Gif,
    WebP,
    Tiff,
    Bmp,
    Other(String),
}

impl MediaType {
    pub fn as_mime(&self) -> &str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Gif => "image/gif",
            MediaType::WebP => "image/webp",
            MediaType::Tiff => "image/tiff",
            MediaType::Bmp => "image/bmp",
            MediaType::Other(mime) => mime,
        }
    }

    pub fn from_mime(mime: &str) -> Self {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => MediaType::Jpeg,
            "image/png" => MediaType::Png,
            "image/gif" => MediaType::Gif,
            "image/webp" => MediaType::WebP,
            "image/tiff" => MediaType::Tiff,
            "image/bmp" | "image/x-ms-bmp" => MediaType::Bmp,
            other => MediaType::Other(other.to_string()),
        }
    }

    /// Guess from a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" | "jfif" => MediaType::Jpeg,
            "png" => MediaType::Png,
            "gif" => MediaType::Gif,
            "webp" => MediaType::WebP,
            "tif" | "tiff" => MediaType::Tiff,
            "bmp" => MediaType::Bmp,
            _ => MediaType::Other("application/octet-stream".to_string()),
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or_else(|| MediaType::Other("application/octet-stream".to_string()))
    }

    pub fn is_image(&self) -> bool {
        !matches!(self, MediaType::Other(_))
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_mime())
    }
}

#[derive(Debug, Clone)]
enum Body {
    Memory(Arc<[u8]>),
    File { path: PathBuf, len: u64 },
}

/// A named binary blob with a media type and modification time.
#[derive(Debug, Clone)]
pub struct Asset {
    name: String,
    media_type: MediaType,
    modified: SystemTime,
    body: Body,
}

impl Asset {
    /// Wrap in-memory bytes. The modification time is now.
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: MediaType,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type,
            modified: SystemTime::now(),
            body: Body::Memory(bytes.into()),
        }
    }

    /// Describe a file on disk without reading its contents.
    ///
    /// The name is the file name, the media type is guessed from the
    /// extension, and the modification time comes from the file metadata.
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            media_type: MediaType::from_path(path),
            modified: metadata.modified().unwrap_or_else(|_| SystemTime::now()),
            body: Body::File {
                path: path.to_path_buf(),
                len: metadata.len(),
            },
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// Byte length: exact for in-memory assets, as of [`Asset::open`] for files.
    pub fn len(&self) -> u64 {
        match &self.body {
            Body::Memory(bytes) => bytes.len() as u64,
            Body::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Backing file, for file-backed assets.
    pub fn path(&self) -> Option<&Path> {
        match &self.body {
            Body::Memory(_) => None,
            Body::File { path, .. } => Some(path),
        }
    }

    /// In-memory contents, for in-memory assets.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.body {
            Body::Memory(bytes) => Some(bytes.as_ref()),
            Body::File { .. } => None,
        }
    }

    /// Load the full contents. In-memory assets share their buffer.
    pub async fn read(&self) -> std::io::Result<Arc<[u8]>> {
        match &self.body {
            Body::Memory(bytes) => Ok(Arc::clone(bytes)),
            Body::File { path, .. } => Ok(tokio::fs::read(path).await?.into()),
        }
    }

    /// Write the contents to `path`, creating or truncating it.
    pub async fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let bytes = self.read().await?;
        tokio::fs::write(path, &bytes[..]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn media_type_from_extension() {
        assert_eq!(MediaType::from_extension("JPG"), MediaType::Jpeg);
        assert_eq!(MediaType::from_extension("jpeg"), MediaType::Jpeg);
        assert_eq!(MediaType::from_extension("png"), MediaType::Png);
        assert_eq!(MediaType::from_extension("TIF"), MediaType::Tiff);
        assert_eq!(
            MediaType::from_extension("txt"),
            MediaType::Other("application/octet-stream".into())
        );
    }

    #[test]
    fn media_type_mime_roundtrip() {
        for mt in [
            MediaType::Jpeg,
            MediaType::Png,
            MediaType::Gif,
            MediaType::WebP,
            MediaType::Tiff,
            MediaType::Bmp,
        ] {
            assert_eq!(MediaType::from_mime(mt.as_mime()), mt);
        }
    }

    #[test]
    fn media_type_from_mime_aliases() {
        assert_eq!(MediaType::from_mime("image/jpg"), MediaType::Jpeg);
        assert_eq!(MediaType::from_mime(" IMAGE/PNG "), MediaType::Png);
        assert_eq!(
            MediaType::from_mime("image/heic"),
            MediaType::Other("image/heic".into())
        );
    }

    #[test]
    fn media_type_without_extension_is_octet_stream() {
        let mt = MediaType::from_path(Path::new("/photos/catch"));
        assert!(!mt.is_image());
        assert_eq!(mt.to_string(), "application/octet-stream");
    }

    #[tokio::test]
    async fn in_memory_asset_reads_shared_buffer() {
        let asset = Asset::from_bytes("pike.png", MediaType::Png, vec![1u8, 2, 3]);
        assert_eq!(asset.name(), "pike.png");
        assert_eq!(asset.len(), 3);
        assert!(asset.path().is_none());

        let bytes = asset.read().await.unwrap();
        assert_eq!(&bytes[..], &[1, 2, 3]);
    }

    #[tokio::test]
    async fn open_describes_file_without_reading() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Perch.JPG");
        std::fs::write(&path, b"not really a jpeg").unwrap();

        let asset = Asset::open(&path).await.unwrap();
        assert_eq!(asset.name(), "Perch.JPG");
        assert_eq!(asset.media_type(), &MediaType::Jpeg);
        assert_eq!(asset.len(), 17);
        assert!(asset.bytes().is_none());
        assert_eq!(asset.path(), Some(path.as_path()));

        let bytes = asset.read().await.unwrap();
        assert_eq!(&bytes[..], b"not really a jpeg");
    }

    #[tokio::test]
    async fn open_missing_file_errors() {
        let result = Asset::open("/nonexistent/trout.jpg").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn open_directory_errors() {
        let tmp = TempDir::new().unwrap();
        let err = Asset::open(tmp.path()).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn read_fails_after_file_removed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gone.png");
        std::fs::write(&path, b"x").unwrap();
        let asset = Asset::open(&path).await.unwrap();

        std::fs::remove_file(&path).unwrap();
        assert!(asset.read().await.is_err());
    }

    #[tokio::test]
    async fn save_writes_contents() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out.bin");
        let asset = Asset::from_bytes("x", MediaType::Jpeg, vec![9u8; 16]);

        asset.save(&out).await.unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), vec![9u8; 16]);
    }
}
