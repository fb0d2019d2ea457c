use std::{fs, path::Path};

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::protocol::is_image_mime;

/// A file the user picked, held in memory until a newer pick replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk and tags it with the MIME type guessed from
    /// its extension.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read selected file '{}'", path.display()))?;
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, mime_type, bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// `image/*` by prefix, and parseable as a MIME type so the multipart
    /// part can carry it.
    pub fn is_image(&self) -> bool {
        is_image_mime(&self.mime_type)
            && self
                .mime_type
                .parse::<mime_guess::Mime>()
                .is_ok_and(|mime| mime.type_() == mime_guess::mime::IMAGE)
    }
}

/// `data:` URI rendering of a [`SelectedFile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview(String);

impl Preview {
    pub fn from_file(file: &SelectedFile) -> Self {
        Self(format!(
            "data:{};base64,{}",
            file.mime_type(),
            STANDARD.encode(file.bytes())
        ))
    }

    pub fn data_uri(&self) -> &str {
        &self.0
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.0.strip_prefix("data:")?.split_once(";base64,").map(|(mime, _)| mime)
    }

    /// Raw image bytes carried by the URI.
    pub fn decode_payload(&self) -> Option<Vec<u8>> {
        let (_, payload) = self.0.split_once(";base64,")?;
        STANDARD.decode(payload).ok()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    #[test]
    fn preview_is_a_base64_data_uri_of_the_file() {
        let file = SelectedFile::new("cat.png", "image/png", b"\x89PNG-bytes".to_vec());
        let preview = Preview::from_file(&file);
        assert!(preview.data_uri().starts_with("data:image/png;base64,"));
        assert_eq!(preview.mime_type(), Some("image/png"));
        assert_eq!(preview.decode_payload().as_deref(), Some(&b"\x89PNG-bytes"[..]));
    }

    #[test]
    fn from_path_guesses_mime_from_extension() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = env::temp_dir().join(format!("face_search_selection_{suffix}"));
        fs::create_dir_all(&dir).expect("temp dir");

        let image_path = dir.join("cat.png");
        fs::write(&image_path, b"png").expect("write png");
        let pdf_path = dir.join("notes.pdf");
        fs::write(&pdf_path, b"%PDF").expect("write pdf");

        let image = SelectedFile::from_path(&image_path).expect("read png");
        assert_eq!(image.file_name(), "cat.png");
        assert_eq!(image.mime_type(), "image/png");
        assert!(image.is_image());
        assert_eq!(image.size_bytes(), 3);

        let pdf = SelectedFile::from_path(&pdf_path).expect("read pdf");
        assert_eq!(pdf.mime_type(), "application/pdf");
        assert!(!pdf.is_image());

        fs::remove_dir_all(dir).expect("cleanup");
    }

    #[test]
    fn unparseable_image_mime_is_not_an_image() {
        assert!(SelectedFile::new("x.png", "image/svg+xml", b"<svg/>".to_vec()).is_image());
        assert!(!SelectedFile::new("x.png", "image/", b"png".to_vec()).is_image());
    }

    #[test]
    fn from_path_reports_missing_file() {
        let err = SelectedFile::from_path(Path::new("/nonexistent/cat.png")).unwrap_err();
        assert!(err.to_string().contains("failed to read selected file"));
    }
}
