use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// Series marker: S01E03, s1e1, S01.E03, S01 E03.
static SERIES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bS(\d{1,2})[. ]?E(\d{1,2})(?:\b|_)").unwrap());

/// Candidate 4-digit year tokens. Plausibility (range, digit boundaries) is
/// checked separately so the pattern itself stays simple.
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:19|20)\d{2}").unwrap());

/// Bracketed groups: release-group noise like [YTS], (Extended), {1080p}.
static BRACKET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[(\[{][^)\]}]*[)\]}]").unwrap());

/// Separator runs used between words in release names.
static SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[._]+|\s*-\s+|\s+-\s*").unwrap());

static MULTI_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Release-tag stoplist: resolution, codec, source, flag, audio, and known
/// release-group tokens, matched as whole words wherever they occur.
static RELEASE_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)\b(?:
            2160p|1080p|960p|720p|576p|480p|4k|uhd|10bit|8bit|hdr10\+?|hdr
            |hevc|x265|x264|h[. ]?26[45]|av1|xvid|divx
            |web[-_. ]?dl|web[-_. ]?rip|web[-_. ]?hd|brrip|blu[-_. ]?ray|bdrip|hdrip|hdtv|dvdrip|cam|ts|tc
            |proper|repack|limited|unrated|remastered|extended|internal
            |subbed|softsub|hardsub|hsub|dubbed|multi
            |aac|ac3|dd5[. ]?1|ddp5[. ]?1|dts|truehd|atmos|\d{1,2}ch
            |yts|etrg|rarbg|digimoviez|30nama
        )\b",
    )
    .unwrap()
});

/// Connector words kept lowercase by title-casing unless they lead the title.
const TITLE_STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "nor", "of", "in", "on", "at", "to", "for", "by",
];

/// Semantic metadata parsed out of one filename. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub source_path: PathBuf,
    pub clean_title: String,
    pub year: Option<i32>,
    pub is_series: bool,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub extension: String,
}

impl MediaItem {
    /// Parse a file path into a `MediaItem`. Returns `None` only when no
    /// title-bearing text remains after stripping; malformed names never
    /// error, they are simply unrecognized.
    pub fn from_path(path: &Path) -> Option<MediaItem> {
        let stem = path.file_stem()?.to_str()?;
        let extension = path.extension()?.to_str()?.to_string();

        let parsed = parse_stem(stem)?;

        Some(MediaItem {
            source_path: path.to_path_buf(),
            clean_title: parsed.clean_title,
            year: parsed.year,
            is_series: parsed.is_series,
            season: parsed.season,
            episode: parsed.episode,
            extension,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStem {
    pub clean_title: String,
    pub year: Option<i32>,
    pub is_series: bool,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

/// Parse a filename stem (extension already stripped) into classification
/// metadata. Series detection runs first; failing that, a plausible year
/// splits title from trailing release noise.
pub fn parse_stem(stem: &str) -> Option<ParsedStem> {
    if let Some(caps) = SERIES_RE.captures(stem) {
        let season: u32 = caps.get(1)?.as_str().parse().ok()?;
        let episode: u32 = caps.get(2)?.as_str().parse().ok()?;

        let before = &stem[..caps.get(0)?.start()];
        let raw_title = if before.trim_matches(['.', '_', '-', ' ']).is_empty() {
            // Marker-first names like "S01E01.Show.Name": drop the marker and
            // take what remains as the title.
            SERIES_RE.replace(stem, " ").into_owned()
        } else {
            before.to_string()
        };

        let clean_title = clean_title(&raw_title);
        if clean_title.is_empty() {
            return None;
        }

        return Some(ParsedStem {
            clean_title,
            year: None,
            is_series: true,
            season: Some(season),
            episode: Some(episode),
        });
    }

    let (raw_title, year) = match find_year(stem) {
        Some((start, _end, year)) => {
            let before = stem[..start].trim_matches(['(', '[', '{']);
            if before.trim_matches(['.', '_', '-', ' ']).is_empty() {
                // Year-first names like "2023.Movie.Name": drop the year.
                let rest = YEAR_RE.replace(stem, " ").into_owned();
                (rest, Some(year))
            } else {
                (before.to_string(), Some(year))
            }
        }
        None => (stem.to_string(), None),
    };

    let clean_title = clean_title(&raw_title);
    if clean_title.is_empty() {
        return None;
    }

    Some(ParsedStem {
        clean_title,
        year,
        is_series: false,
        season: None,
        episode: None,
    })
}

/// Find the first plausible year token: 4 digits in [1900, current year + 1],
/// not adjacent to other digits. Returns (start, end, year).
pub fn find_year(text: &str) -> Option<(usize, usize, i32)> {
    let max_year = OffsetDateTime::now_utc().year() + 1;
    let bytes = text.as_bytes();

    for m in YEAR_RE.find_iter(text) {
        let before_ok = m.start() == 0 || !bytes[m.start() - 1].is_ascii_digit();
        let after_ok = m.end() == bytes.len() || !bytes[m.end()].is_ascii_digit();
        if !before_ok || !after_ok {
            continue;
        }
        let year: i32 = m.as_str().parse().ok()?;
        if (1900..=max_year).contains(&year) {
            return Some((m.start(), m.end(), year));
        }
    }

    None
}

/// Normalize a raw title fragment: drop bracketed noise, turn separators into
/// spaces, strip release tags, collapse whitespace, then title-case.
pub fn clean_title(raw: &str) -> String {
    let s = BRACKET_RE.replace_all(raw, " ");
    let s = SEPARATOR_RE.replace_all(&s, " ");
    let s = RELEASE_TAG_RE.replace_all(&s, " ");
    let s = MULTI_SPACE_RE.replace_all(&s, " ");
    title_case(s.trim())
}

/// Lowercased, separator-normalized form of a stem, used for sidecar
/// association.
pub fn normalize_stem(stem: &str) -> String {
    let s = SEPARATOR_RE.replace_all(stem, " ");
    let s = MULTI_SPACE_RE.replace_all(&s, " ");
    s.trim().to_lowercase()
}

/// Title-case a normalized string. Hyphen-separated segments are capitalized
/// independently; connector words stay lowercase unless they open the title.
/// Idempotent.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && TITLE_STOP_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                lower
                    .split('-')
                    .map(capitalize)
                    .collect::<Vec<_>>()
                    .join("-")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_series_standard() {
        let parsed = parse_stem("Show.Name.S02E05.720p.WEB-DL.x264-GROUP").unwrap();
        assert!(parsed.is_series);
        assert_eq!(parsed.season, Some(2));
        assert_eq!(parsed.episode, Some(5));
        assert_eq!(parsed.clean_title, "Show Name");
    }

    #[test]
    fn test_parse_series_lowercase_unpadded() {
        let parsed = parse_stem("show name s1e3").unwrap();
        assert!(parsed.is_series);
        assert_eq!(parsed.season, Some(1));
        assert_eq!(parsed.episode, Some(3));
        assert_eq!(parsed.clean_title, "Show Name");
    }

    #[test]
    fn test_parse_series_dotted_marker() {
        let parsed = parse_stem("Show.Name.S01.E03.1080p").unwrap();
        assert!(parsed.is_series);
        assert_eq!(parsed.season, Some(1));
        assert_eq!(parsed.episode, Some(3));
    }

    #[test]
    fn test_parse_series_marker_first() {
        let parsed = parse_stem("S01E01.Show.Name").unwrap();
        assert!(parsed.is_series);
        assert_eq!(parsed.clean_title, "Show Name");
    }

    #[test]
    fn test_parse_series_junk_stripped_from_title() {
        let parsed = parse_stem("The.Expanse.1080p.S03E06.WEBRip").unwrap();
        assert!(parsed.is_series);
        assert_eq!(parsed.clean_title, "The Expanse");
    }

    #[test]
    fn test_parse_movie_with_year() {
        let parsed = parse_stem("Movie.Title.2023.1080p.WEB-DL.x265-GROUP").unwrap();
        assert!(!parsed.is_series);
        assert_eq!(parsed.year, Some(2023));
        assert_eq!(parsed.clean_title, "Movie Title");
    }

    #[test]
    fn test_parse_movie_parenthesized_year() {
        let parsed = parse_stem("Movie Title (1999) [1080p] [YTS]").unwrap();
        assert_eq!(parsed.year, Some(1999));
        assert_eq!(parsed.clean_title, "Movie Title");
    }

    #[test]
    fn test_parse_movie_year_first() {
        let parsed = parse_stem("2023.Movie.Name").unwrap();
        assert_eq!(parsed.year, Some(2023));
        assert_eq!(parsed.clean_title, "Movie Name");
    }

    #[test]
    fn test_parse_movie_no_year() {
        let parsed = parse_stem("some_home_video").unwrap();
        assert!(!parsed.is_series);
        assert_eq!(parsed.year, None);
        assert_eq!(parsed.clean_title, "Some Home Video");
    }

    #[test]
    fn test_parse_future_year_is_not_plausible() {
        // 2049 is beyond current year + 1, so 2017 is the release year and
        // the in-title 2049 survives.
        let parsed = parse_stem("Blade.Runner.2049.2017.2160p").unwrap();
        assert_eq!(parsed.year, Some(2017));
        assert_eq!(parsed.clean_title, "Blade Runner 2049");
    }

    #[test]
    fn test_year_rejects_out_of_range() {
        assert!(find_year("Movie.1899.Title").is_none());
        assert!(find_year("resolution.2160p").is_none());
        // Adjacent digits disqualify the token.
        assert!(find_year("x20233").is_none());
    }

    #[test]
    fn test_year_accepts_bracketed() {
        let (_, _, year) = find_year("Title.(2005).rest").unwrap();
        assert_eq!(year, 2005);
    }

    #[test]
    fn test_unrecognized_when_nothing_remains() {
        assert!(parse_stem("1080p.x264").is_none());
        assert!(parse_stem("").is_none());
    }

    #[test]
    fn test_clean_title_strips_release_tags() {
        assert_eq!(clean_title("My.Movie.1080p.BluRay.x264"), "My Movie");
        assert_eq!(clean_title("My Movie [1080p] (WEBRip)"), "My Movie");
        assert_eq!(clean_title("Quiet_Place_HDR_2ch"), "Quiet Place");
    }

    #[test]
    fn test_title_case_basics() {
        assert_eq!(title_case("the lord of the rings"), "The Lord of the Rings");
        assert_eq!(title_case("war and peace"), "War and Peace");
    }

    #[test]
    fn test_title_case_hyphens() {
        assert_eq!(title_case("my-folder"), "My-Folder");
        assert_eq!(title_case("spider-man far from home"), "Spider-Man Far From Home");
    }

    #[test]
    fn test_title_case_idempotent() {
        for s in ["the quick brown fox", "My-Folder", "A Tale of Two Cities", ""] {
            assert_eq!(title_case(&title_case(s)), title_case(s));
        }
    }

    #[test]
    fn test_normalize_stem() {
        assert_eq!(normalize_stem("Movie.Title_2023 - Extra"), "movie title 2023 extra");
        assert_eq!(normalize_stem("word-inside"), "word-inside");
    }

    #[test]
    fn test_media_item_from_path() {
        let item = MediaItem::from_path(Path::new("/in/Show.Name.S02E05.720p.mkv")).unwrap();
        assert!(item.is_series);
        assert_eq!(item.extension, "mkv");
        assert_eq!(item.clean_title, "Show Name");
        assert_eq!(item.source_path, Path::new("/in/Show.Name.S02E05.720p.mkv"));
    }

    #[test]
    fn test_media_item_unrecognized() {
        assert!(MediaItem::from_path(Path::new("/in/1080p.mkv")).is_none());
        assert!(MediaItem::from_path(Path::new("/in/noext")).is_none());
    }
}
