//! Extension-based object classification.

use std::borrow::Cow;

use gravitys3_core::{Category, NO_EXTENSION};

/// Categories with extension tables, in lookup precedence order.
const LOOKUP_ORDER: [Category; 11] = [
    Category::RawVideo,
    Category::Video,
    Category::RawPhoto,
    Category::ImageHigh,
    Category::Image,
    Category::Audio,
    Category::Project,
    Category::Sidecar,
    Category::Doc,
    Category::Code,
    Category::Archive,
];

/// Map a file extension to its category.
///
/// Matching is case-insensitive. The [`NO_EXTENSION`] sentinel maps to
/// [`Category::NoExtension`]; anything unrecognized maps to [`Category::Other`].
pub fn classify(extension: &str) -> Category {
    if extension.eq_ignore_ascii_case(NO_EXTENSION) {
        return Category::NoExtension;
    }
    LOOKUP_ORDER
        .into_iter()
        .find(|category| {
            category
                .extensions()
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        })
        .unwrap_or(Category::Other)
}

/// Extract the lower-cased extension of a key's final path segment.
///
/// Returns [`NO_EXTENSION`] when the final segment contains no `.`. A
/// trailing `.` yields the empty extension.
pub fn extension_of(key: &str) -> Cow<'_, str> {
    let file_name = key.rsplit('/').next().unwrap_or_default();
    match file_name.rsplit_once('.') {
        Some((_, ext)) if ext.chars().any(char::is_uppercase) => Cow::Owned(ext.to_lowercase()),
        Some((_, ext)) => Cow::Borrowed(ext),
        None => Cow::Borrowed(NO_EXTENSION),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(classify("braw"), Category::RawVideo);
        assert_eq!(classify("mov"), Category::Video);
        assert_eq!(classify("tiff"), Category::ImageHigh);
        assert_eq!(classify("jpeg"), Category::Image);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("JPG"), classify("jpg"));
        assert_eq!(classify("R3D"), Category::RawVideo);
        assert_eq!(classify("TiFf"), Category::ImageHigh);
        assert_eq!(classify("Ä"), Category::Other);
    }

    #[test]
    fn test_sentinel_and_fallback() {
        assert_eq!(classify(NO_EXTENSION), Category::NoExtension);
        assert_eq!(classify("_NONE"), Category::NoExtension);
        assert_eq!(classify("exe"), Category::Other);
        assert_eq!(classify(""), Category::Other);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a/b/clip.MP4"), "mp4");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("dir.v2/README"), NO_EXTENSION);
        assert_eq!(extension_of("folder/"), NO_EXTENSION);
        assert_eq!(extension_of("weird."), "");
        assert_eq!(extension_of("a/.env"), "env");
    }

    #[test]
    fn test_extension_of_borrows_lowercase() {
        assert!(matches!(extension_of("x/y.wav"), Cow::Borrowed(_)));
        assert!(matches!(extension_of("x/y.WAV"), Cow::Owned(_)));
    }
}
