use axum::body::Bytes;
use std::fmt;

/// A `file` part as received, before validation.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
        }
    }

    pub fn format(self) -> image::ImageFormat {
        match self {
            ImageKind::Png => image::ImageFormat::Png,
            ImageKind::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// Extraction strategy for an upload, chosen from the stored filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image(ImageKind),
    Pdf,
    PlainText,
    Unsupported,
}

impl FileKind {
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_ascii_lowercase();
        // A bare "png" has no suffix left once sanitized
        let Some((stem, ext)) = lower.rsplit_once('.') else {
            return FileKind::Unsupported;
        };
        if stem.is_empty() {
            return FileKind::Unsupported;
        }

        match ext {
            "png" => FileKind::Image(ImageKind::Png),
            "jpg" | "jpeg" => FileKind::Image(ImageKind::Jpeg),
            "pdf" => FileKind::Pdf,
            "txt" => FileKind::PlainText,
            _ => FileKind::Unsupported,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileKind::Image(_) => "image",
            FileKind::Pdf => "pdf",
            FileKind::PlainText => "text",
            FileKind::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_suffix_case_insensitively() {
        assert_eq!(FileKind::from_filename("cat.PNG"), FileKind::Image(ImageKind::Png));
        assert_eq!(FileKind::from_filename("cat.jpg"), FileKind::Image(ImageKind::Jpeg));
        assert_eq!(FileKind::from_filename("cat.JpEg"), FileKind::Image(ImageKind::Jpeg));
        assert_eq!(FileKind::from_filename("report.pdf"), FileKind::Pdf);
        assert_eq!(FileKind::from_filename("notes.Txt"), FileKind::PlainText);
    }

    #[test]
    fn unknown_or_missing_suffix_is_unsupported() {
        assert_eq!(FileKind::from_filename("archive.zip"), FileKind::Unsupported);
        assert_eq!(FileKind::from_filename("png"), FileKind::Unsupported);
        assert_eq!(FileKind::from_filename(".pdf"), FileKind::Unsupported);
        assert_eq!(FileKind::from_filename(""), FileKind::Unsupported);
    }

    #[test]
    fn image_kinds_carry_mime_types() {
        assert_eq!(ImageKind::Png.mime_type(), "image/png");
        assert_eq!(ImageKind::Jpeg.mime_type(), "image/jpeg");
    }
}
