use crate::vidsort_core::media::{FileKind, detect_file_kind};
use crate::vidsort_core::parser::{MediaItem, normalize_stem};
use std::path::{Path, PathBuf};

/// Trailing tags commonly appended to subtitle stems (language codes plus the
/// `forced`/`sdh` variants).
const LANGUAGE_TAGS: &[&str] = &[
    "en", "eng", "english", "fr", "fre", "fra", "french", "es", "spa", "spanish", "de", "ger",
    "deu", "german", "it", "ita", "pt", "por", "ru", "rus", "ja", "jpn", "ko", "kor", "zh", "chi",
    "nl", "dut", "pl", "pol", "tr", "tur", "ar", "ara", "fa", "per", "hi", "hin", "sv", "swe",
    "no", "nor", "da", "dan", "fi", "fin", "cs", "cze", "el", "gre", "he", "heb", "forced", "sdh",
];

/// A non-video file riding along with a primary.
#[derive(Debug, Clone)]
pub struct SidecarFile {
    pub source_path: PathBuf,
    pub kind: FileKind,
    /// Trailing language tag detected on the stem, e.g. "en" in "movie.en.srt".
    pub language_tag: Option<String>,
}

/// A primary video file plus the sidecars that share its stem. Built per scan
/// and discarded after the batch completes.
#[derive(Debug, Clone)]
pub struct FileGroup {
    pub primary: MediaItem,
    pub associates: Vec<SidecarFile>,
}

/// Output of one grouping pass: groups in primary-discovery order, and the
/// residual files that belong to no group (unparseable videos, unmatched
/// sidecars, unknown extensions).
#[derive(Debug, Default)]
pub struct Grouped {
    pub groups: Vec<FileGroup>,
    pub residual: Vec<PathBuf>,
}

/// Split a trailing language tag off a stem, if the last dot-separated token
/// is a known tag. "movie.en" -> ("movie", Some("en")).
pub fn split_language_tag(stem: &str) -> (&str, Option<&str>) {
    if let Some((base, last)) = stem.rsplit_once('.') {
        if LANGUAGE_TAGS.contains(&last.to_lowercase().as_str()) {
            return (base, Some(last));
        }
    }
    (stem, None)
}

/// Associate every sidecar file with at most one primary video file.
///
/// A sidecar matches a primary when its normalized stem (optionally minus a
/// trailing language tag) equals, or is a whole-word prefix of, the primary's
/// normalized stem. The tag is only stripped when the untagged stem fails to
/// match anything, so an ambiguous tag never detaches a sidecar from its
/// exact-name primary. Ties go to the primary sharing the longest common
/// normalized-stem prefix, then to the lexicographically smallest path.
pub fn group_entries(entries: &[PathBuf]) -> Grouped {
    let mut grouped = Grouped::default();
    let mut sidecars: Vec<(PathBuf, FileKind)> = Vec::new();

    for path in entries {
        match detect_file_kind(path) {
            Some(FileKind::Video) => match MediaItem::from_path(path) {
                Some(item) => grouped.groups.push(FileGroup {
                    primary: item,
                    associates: Vec::new(),
                }),
                None => grouped.residual.push(path.clone()),
            },
            Some(kind) => sidecars.push((path.clone(), kind)),
            None => grouped.residual.push(path.clone()),
        }
    }

    // Normalized primary stems, parallel to grouped.groups.
    let primary_stems: Vec<String> = grouped
        .groups
        .iter()
        .map(|g| stem_of(&g.primary.source_path))
        .collect();

    for (path, kind) in sidecars {
        let full_stem = stem_of(&path);
        let raw_stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let (base, tag) = split_language_tag(raw_stem);
        let base_stem = normalize_stem(base);

        // Exact/prefix match on the full stem first; only fall back to the
        // tag-stripped stem when that finds nothing.
        let chosen = best_match(&full_stem, &primary_stems, &grouped.groups)
            .map(|idx| (idx, None))
            .or_else(|| {
                tag.and_then(|t| {
                    best_match(&base_stem, &primary_stems, &grouped.groups)
                        .map(|idx| (idx, Some(t.to_string())))
                })
            });

        match chosen {
            Some((idx, language_tag)) => grouped.groups[idx].associates.push(SidecarFile {
                source_path: path,
                kind,
                language_tag,
            }),
            None => grouped.residual.push(path),
        }
    }

    grouped
}

fn stem_of(path: &Path) -> String {
    normalize_stem(
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default(),
    )
}

/// Pick the best-matching primary for a normalized sidecar stem, or `None`.
fn best_match(sidecar_stem: &str, primary_stems: &[String], groups: &[FileGroup]) -> Option<usize> {
    if sidecar_stem.is_empty() {
        return None;
    }

    let mut best: Option<usize> = None;
    for (idx, primary_stem) in primary_stems.iter().enumerate() {
        if !stem_prefix_matches(sidecar_stem, primary_stem) {
            continue;
        }
        best = match best {
            None => Some(idx),
            Some(current) => {
                let cur_len = common_prefix_len(sidecar_stem, &primary_stems[current]);
                let new_len = common_prefix_len(sidecar_stem, primary_stem);
                if new_len > cur_len
                    || (new_len == cur_len
                        && groups[idx].primary.source_path < groups[current].primary.source_path)
                {
                    Some(idx)
                } else {
                    Some(current)
                }
            }
        };
    }
    best
}

/// True when the sidecar stem equals the primary stem or is a prefix of it
/// ending on a word boundary.
fn stem_prefix_matches(sidecar_stem: &str, primary_stem: &str) -> bool {
    if sidecar_stem == primary_stem {
        return true;
    }
    primary_stem.starts_with(sidecar_stem)
        && primary_stem[sidecar_stem.len()..].starts_with(' ')
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from(format!("/in/{n}"))).collect()
    }

    #[test]
    fn test_split_language_tag() {
        assert_eq!(split_language_tag("movie.en"), ("movie", Some("en")));
        assert_eq!(split_language_tag("movie.EN"), ("movie", Some("EN")));
        assert_eq!(split_language_tag("movie.final"), ("movie.final", None));
        assert_eq!(split_language_tag("movie"), ("movie", None));
    }

    #[test]
    fn test_group_exact_stem() {
        let grouped = group_entries(&paths(&[
            "Movie.Title.2023.1080p.mkv",
            "Movie.Title.2023.1080p.srt",
        ]));
        assert_eq!(grouped.groups.len(), 1);
        assert_eq!(grouped.groups[0].associates.len(), 1);
        assert!(grouped.residual.is_empty());
    }

    #[test]
    fn test_group_language_tagged_subtitle() {
        let grouped = group_entries(&paths(&[
            "Movie.Title.2023.mkv",
            "Movie.Title.2023.en.srt",
        ]));
        assert_eq!(grouped.groups[0].associates.len(), 1);
        assert_eq!(
            grouped.groups[0].associates[0].language_tag.as_deref(),
            Some("en")
        );
    }

    #[test]
    fn test_group_prefix_match() {
        // Shorter sidecar name, same release prefix.
        let grouped = group_entries(&paths(&[
            "Movie.Title.2023.1080p.WEB-DL.mkv",
            "Movie.Title.srt",
        ]));
        assert_eq!(grouped.groups[0].associates.len(), 1);
    }

    #[test]
    fn test_prefix_requires_word_boundary() {
        let grouped = group_entries(&paths(&["Movie.Titles.2023.mkv", "Movie.Title.srt"]));
        assert!(grouped.groups[0].associates.is_empty());
        assert_eq!(grouped.residual, paths(&["Movie.Title.srt"]));
    }

    #[test]
    fn test_sidecar_attaches_to_single_primary() {
        // Both primaries share the sidecar's prefix; the longer common prefix
        // wins and the sidecar lands in exactly one group.
        let grouped = group_entries(&paths(&[
            "Show.Name.S01E01.mkv",
            "Show.Name.S01E02.mkv",
            "Show.Name.S01E01.srt",
        ]));
        let attached: usize = grouped.groups.iter().map(|g| g.associates.len()).sum();
        assert_eq!(attached, 1);
        assert_eq!(grouped.groups[0].associates.len(), 1);
    }

    #[test]
    fn test_tie_breaks_lexicographic() {
        let grouped = group_entries(&paths(&[
            "Show.B.S01E01.mkv",
            "Show.A.S01E01.mkv",
            "Show.srt",
        ]));
        // Equal common prefix "show " for both primaries.
        let holder = grouped
            .groups
            .iter()
            .find(|g| !g.associates.is_empty())
            .unwrap();
        assert!(holder.primary.source_path.to_string_lossy().contains("Show.A"));
    }

    #[test]
    fn test_unmatched_and_unknown_are_residual() {
        let grouped = group_entries(&paths(&[
            "Movie.Title.2023.mkv",
            "Unrelated.Thing.srt",
            "notes.txt",
            "1080p.mkv",
        ]));
        assert_eq!(grouped.groups.len(), 1);
        assert_eq!(grouped.residual.len(), 3);
    }

    #[test]
    fn test_ambiguous_tag_stays_conservative() {
        // "de" is a language tag, but the full stem matches a primary exactly;
        // the tag must not be stripped in that case.
        let grouped = group_entries(&paths(&["Ode.to.de.mkv", "Ode.to.de.srt"]));
        assert_eq!(grouped.groups[0].associates.len(), 1);
        assert_eq!(grouped.groups[0].associates[0].language_tag, None);
    }
}
