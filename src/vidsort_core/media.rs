use std::path::Path;

/// Video file extensions (lowercase). Files with these extensions are the
/// primary candidates of a group.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "ts", "m4v", "webm",
];

/// Subtitle file extensions (lowercase).
pub const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "sub", "ass", "ssa", "idx", "vtt"];

/// Archive file extensions (lowercase). Archives only ever move together with
/// a matched primary, never on their own.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz", "bz2"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Video,
    Subtitle,
    Archive,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Video => "video",
            FileKind::Subtitle => "subtitle",
            FileKind::Archive => "archive",
        }
    }

    /// True for the non-video kinds that ride along with a primary.
    pub fn is_sidecar(&self) -> bool {
        matches!(self, FileKind::Subtitle | FileKind::Archive)
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Detect the file kind from the extension, case-insensitive.
/// Returns `None` for anything that is neither video nor sidecar.
pub fn detect_file_kind(path: &Path) -> Option<FileKind> {
    let ext = path.extension().and_then(|e| e.to_str())?.to_lowercase();

    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        return Some(FileKind::Video);
    }
    if SUBTITLE_EXTENSIONS.contains(&ext.as_str()) {
        return Some(FileKind::Subtitle);
    }
    if ARCHIVE_EXTENSIONS.contains(&ext.as_str()) {
        return Some(FileKind::Archive);
    }

    None
}
