use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType};
use uuid::Uuid;

use super::{DecodedImage, JPEG_QUALITY, MediaError, MediaResult, THUMBNAIL_MAX_EDGE, is_remote};

/// Result of storing an attachment on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAttachment {
    /// Path handle of the stored JPEG
    pub path: String,
    /// Length of the encoded JPEG in bytes
    pub size_bytes: u64,
    pub thumbnail_path: Option<String>,
}

/// Local directory holding the images users send.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Re-encode `bytes` as JPEG and write them under the attachment directory,
    /// together with a small thumbnail.
    pub fn save_image(&self, bytes: &[u8], file_name: Option<&str>) -> MediaResult<StoredAttachment> {
        let image = image::load_from_memory(bytes).map_err(MediaError::Encode)?;
        let encoded = encode_jpeg(&image)?;

        // Only the last component is kept so a name can't leave the directory
        let file_name = file_name
            .and_then(|name| Path::new(name).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.jpg", Uuid::new_v4()));
        let path = self.root.join(&file_name);
        self.write(&path, &encoded)?;
        log::info!(
            "Image saved to {} ({} bytes)",
            path.display(),
            encoded.len()
        );

        let thumbnail_path = match self.write_thumbnail(&image, &path) {
            Ok(thumb) => Some(thumb.to_string_lossy().into_owned()),
            Err(err) => {
                log::warn!("Skipping thumbnail for {}: {err}", path.display());
                None
            }
        };

        Ok(StoredAttachment {
            path: path.to_string_lossy().into_owned(),
            size_bytes: encoded.len() as u64,
            thumbnail_path,
        })
    }

    /// Read a picked image file and store it under a fresh name.
    pub fn import_file(&self, source: &Path) -> MediaResult<StoredAttachment> {
        let bytes = fs::read(source).map_err(|err| {
            log::warn!("Failed to read {}: {err}", source.display());
            MediaError::Unavailable {
                handle: source.to_string_lossy().into_owned(),
            }
        })?;
        self.save_image(&bytes, None)
    }

    /// Decode a local attachment, trying in turn the path as given, the same
    /// file name inside the attachment directory, and finally sniffing the raw
    /// bytes regardless of extension.
    pub fn load_local(&self, handle: &str) -> MediaResult<DecodedImage> {
        if is_remote(handle) {
            return Err(MediaError::Unavailable {
                handle: handle.to_string(),
            });
        }

        let direct = Path::new(handle);
        if let Ok(image) = image::open(direct) {
            log::debug!("Loaded image from direct path {handle}");
            return Ok(image.into());
        }

        if let Some(resolved) = self.resolve_by_file_name(handle) {
            if let Ok(image) = image::open(&resolved) {
                log::debug!("Loaded image from attachment dir {}", resolved.display());
                return Ok(image.into());
            }
        }

        if let Ok(bytes) = fs::read(direct) {
            if let Ok(image) = image::load_from_memory(&bytes) {
                log::debug!("Loaded image by sniffing raw bytes of {handle}");
                return Ok(image.into());
            }
        }

        log::warn!(
            "Failed to load image from {handle} (exists: {})",
            direct.exists()
        );
        Err(MediaError::Unavailable {
            handle: handle.to_string(),
        })
    }

    /// Whether a local handle points at an existing file. Always false for URLs.
    pub fn exists(&self, handle: &str) -> bool {
        self.locate(handle).is_some()
    }

    /// Size on disk of a local attachment. `None` for URLs and missing files.
    pub fn file_size(&self, handle: &str) -> Option<u64> {
        let path = self.locate(handle)?;
        fs::metadata(path).ok().map(|meta| meta.len())
    }

    fn locate(&self, handle: &str) -> Option<PathBuf> {
        if is_remote(handle) {
            return None;
        }
        let direct = PathBuf::from(handle);
        if direct.is_file() {
            return Some(direct);
        }
        self.resolve_by_file_name(handle)
            .filter(|resolved| resolved.is_file())
    }

    fn resolve_by_file_name(&self, handle: &str) -> Option<PathBuf> {
        Path::new(handle)
            .file_name()
            .map(|name| self.root.join(name))
    }

    fn write_thumbnail(&self, image: &DynamicImage, original: &Path) -> MediaResult<PathBuf> {
        let stem = original
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let path = self.root.join(format!("{stem}_thumb.jpg"));

        let thumbnail = image.thumbnail(THUMBNAIL_MAX_EDGE, THUMBNAIL_MAX_EDGE);
        self.write(&path, &encode_jpeg(&thumbnail)?)?;
        Ok(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> MediaResult<()> {
        fs::create_dir_all(&self.root)
            .and_then(|_| fs::write(path, bytes))
            .map_err(|source| MediaError::Write {
                path: path.to_path_buf(),
                source,
            })
    }
}

fn encode_jpeg(image: &DynamicImage) -> MediaResult<Vec<u8>> {
    // JPEG has no alpha channel
    let rgb = image.to_rgb8();
    let mut encoded = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY);
    encoder
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(MediaError::Encode)?;
    Ok(encoded)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;
    use tempfile::TempDir;

    /// PNG bytes of a small gradient, standing in for a picked photo.
    pub(crate) fn test_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x * 16) as u8, (y * 16) as u8, 128, 255])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn save_reports_encoded_size() {
        let tmp = TempDir::new().unwrap();
        let store = AttachmentStore::new(tmp.path().join("attachments"));

        let stored = store
            .save_image(&test_png_bytes(8, 8), Some("photo.jpg"))
            .unwrap();

        let on_disk = fs::read(&stored.path).unwrap();
        assert_eq!(stored.size_bytes, on_disk.len() as u64);
        assert!(stored.path.ends_with("photo.jpg"));
        assert_eq!(
            image::guess_format(&on_disk).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn save_keeps_supplied_names_inside_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("attachments");
        let store = AttachmentStore::new(&root);

        let escaped = store
            .save_image(&test_png_bytes(4, 4), Some("../escape.jpg"))
            .unwrap();
        assert_eq!(Path::new(&escaped.path), root.join("escape.jpg"));
        assert!(!tmp.path().join("escape.jpg").exists());

        let absolute = store
            .save_image(&test_png_bytes(4, 4), Some("/tmp/elsewhere/abs.jpg"))
            .unwrap();
        assert_eq!(Path::new(&absolute.path), root.join("abs.jpg"));

        let parent_only = store.save_image(&test_png_bytes(4, 4), Some("..")).unwrap();
        assert_eq!(Path::new(&parent_only.path).parent(), Some(root.as_path()));
        assert!(parent_only.path.ends_with(".jpg"));
    }

    #[test]
    fn save_generates_name_and_thumbnail() {
        let tmp = TempDir::new().unwrap();
        let store = AttachmentStore::new(tmp.path());

        let stored = store.save_image(&test_png_bytes(400, 100), None).unwrap();
        assert!(stored.path.ends_with(".jpg"));

        let thumb_path = stored.thumbnail_path.expect("thumbnail written");
        assert!(thumb_path.ends_with("_thumb.jpg"));
        let thumb = image::open(&thumb_path).unwrap();
        assert_eq!(thumb.width(), THUMBNAIL_MAX_EDGE);
        assert!(thumb.height() <= THUMBNAIL_MAX_EDGE);
    }

    #[test]
    fn save_rejects_non_image_bytes() {
        let tmp = TempDir::new().unwrap();
        let store = AttachmentStore::new(tmp.path());

        let err = store.save_image(b"definitely not an image", None).unwrap_err();
        assert!(matches!(err, MediaError::Encode(_)));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn save_reports_unwritable_directory() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("not_a_dir");
        fs::write(&blocker, b"file in the way").unwrap();
        let store = AttachmentStore::new(&blocker);

        let err = store.save_image(&test_png_bytes(4, 4), None).unwrap_err();
        assert!(matches!(err, MediaError::Write { .. }));
    }

    #[test]
    fn import_copies_picked_file_as_jpeg() {
        let tmp = TempDir::new().unwrap();
        let picked = tmp.path().join("picked.png");
        fs::write(&picked, test_png_bytes(12, 9)).unwrap();
        let store = AttachmentStore::new(tmp.path().join("attachments"));

        let stored = store.import_file(&picked).unwrap();
        assert!(stored.path.ends_with(".jpg"));
        assert_eq!(store.file_size(&stored.path), Some(stored.size_bytes));

        let missing = store.import_file(&tmp.path().join("gone.png")).unwrap_err();
        assert!(matches!(missing, MediaError::Unavailable { .. }));
    }

    #[test]
    fn loads_from_direct_path() {
        let tmp = TempDir::new().unwrap();
        let store = AttachmentStore::new(tmp.path());
        let stored = store.save_image(&test_png_bytes(6, 3), None).unwrap();

        let decoded = store.load_local(&stored.path).unwrap();
        assert_eq!((decoded.width, decoded.height), (6, 3));
    }

    #[test]
    fn falls_back_to_attachment_dir_by_file_name() {
        let tmp = TempDir::new().unwrap();
        let store = AttachmentStore::new(tmp.path());
        store
            .save_image(&test_png_bytes(5, 5), Some("moved.jpg"))
            .unwrap();

        // Handle recorded under a directory that no longer exists
        let stale = "/old/container/Documents/moved.jpg";
        let decoded = store.load_local(stale).unwrap();
        assert_eq!((decoded.width, decoded.height), (5, 5));
        assert!(store.exists(stale));
        assert!(store.file_size(stale).unwrap() > 0);
    }

    #[test]
    fn decodes_file_without_extension() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("blob");
        fs::write(&path, test_png_bytes(2, 7)).unwrap();
        let store = AttachmentStore::new(tmp.path().join("elsewhere"));

        let decoded = store.load_local(path.to_str().unwrap()).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 7));
    }

    #[test]
    fn missing_or_remote_handles_are_unavailable() {
        let tmp = TempDir::new().unwrap();
        let store = AttachmentStore::new(tmp.path());

        for handle in ["/nope/missing.jpg", "https://example.com/a.jpg"] {
            let err = store.load_local(handle).unwrap_err();
            assert!(matches!(err, MediaError::Unavailable { .. }), "{handle}");
            assert!(!store.exists(handle));
            assert_eq!(store.file_size(handle), None);
        }
    }
}
