//! Semantic file categories.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

/// Extension sentinel used when the final key segment has no `.`.
pub const NO_EXTENSION: &str = "_none";

/// Semantic label assigned to an object from its extension.
///
/// Variants are declared in lookup precedence order: raw footage is matched
/// before general video, high bit-depth stills before compressed images.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    RawVideo,
    Video,
    RawPhoto,
    ImageHigh,
    Image,
    Audio,
    Project,
    Sidecar,
    Doc,
    Code,
    Archive,
    /// Objects whose name has no extension at all.
    #[serde(rename = "_none")]
    #[strum(serialize = "_none")]
    NoExtension,
    /// Catch-all for unrecognized extensions.
    Other,
}

impl Category {
    /// The fixed, lower-case extension set for this category.
    ///
    /// `NoExtension` and `Other` have no table entries; they are reached
    /// through the sentinel and the fallback respectively.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::RawVideo => &["braw", "r3d"],
            Self::Video => &["mov", "mxf", "mp4", "m4v", "avi", "mkv", "prores"],
            Self::RawPhoto => &["arw", "cr2", "cr3", "nef", "raf", "dng", "gpr"],
            Self::ImageHigh => &["tif", "tiff", "exr", "dpx"],
            Self::Image => &["jpg", "jpeg", "png", "hif", "heic", "webp"],
            Self::Audio => &["wav", "aif", "aiff", "mp3", "flac", "caf", "m4a"],
            Self::Project => &["prproj", "aep", "drp"],
            Self::Sidecar => &["xmp", "xml", "cfa", "pek", "srt", "vtt", "luts", "cube"],
            Self::Doc => &["pdf", "doc", "docx", "xlsx", "csv", "txt", "md"],
            Self::Code => &["js", "ts", "tsx", "py", "mjs", "map", "json"],
            Self::Archive => &["zip", "rar", "7z", "tar", "gz"],
            Self::NoExtension | Self::Other => &[],
        }
    }

    /// Stable label used in reports.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
