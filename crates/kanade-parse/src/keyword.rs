use phf::phf_map;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::elements::{ElementCategory, Elements};

/// Per-keyword behavior switches.
#[derive(Debug, Clone, Copy)]
pub struct KeywordOptions {
    /// Whether a match promotes the token to `Identifier`. Unidentifiable
    /// keywords stay eligible for inclusion in multi-token elements such as
    /// the title (e.g. "Tokyo ESP").
    pub identifiable: bool,
    /// Whether the keyword may be inserted by the generic keyword pass.
    pub searchable: bool,
    /// Whether the keyword is trusted on its own (e.g. the bare episode
    /// prefix "E" is not).
    pub valid: bool,
}

const DEFAULT: KeywordOptions = KeywordOptions {
    identifiable: true,
    searchable: true,
    valid: true,
};
const INVALID: KeywordOptions = KeywordOptions {
    identifiable: true,
    searchable: true,
    valid: false,
};
const UNIDENTIFIABLE: KeywordOptions = KeywordOptions {
    identifiable: false,
    searchable: true,
    valid: true,
};
const UNIDENTIFIABLE_INVALID: KeywordOptions = KeywordOptions {
    identifiable: false,
    searchable: true,
    valid: false,
};
const UNIDENTIFIABLE_UNSEARCHABLE: KeywordOptions = KeywordOptions {
    identifiable: false,
    searchable: false,
    valid: true,
};

/// A keyword table entry.
#[derive(Debug, Clone, Copy)]
pub struct Keyword {
    pub category: ElementCategory,
    pub options: KeywordOptions,
}

const fn kw(category: ElementCategory, options: KeywordOptions) -> Keyword {
    Keyword { category, options }
}

/// Compile-time keyword table. Keys are normalized (NFKD, no combining
/// marks, uppercase); look up with [`normalize`].
static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    // Season prefixes
    "S" => kw(ElementCategory::AnimeSeasonPrefix, UNIDENTIFIABLE),
    "SAISON" => kw(ElementCategory::AnimeSeasonPrefix, UNIDENTIFIABLE),
    "SEASON" => kw(ElementCategory::AnimeSeasonPrefix, UNIDENTIFIABLE),

    // Anime types
    "GEKIJOUBAN" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE),
    "MOVIE" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE),
    "OAD" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE),
    "OAV" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE),
    "ONA" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE),
    "OVA" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE),
    "SPECIAL" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE),
    "SPECIALS" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE),
    "TV" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE),
    // e.g. "Yumeiro Patissiere SP Professional"
    "SP" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE_UNSEARCHABLE),
    "ED" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE_INVALID),
    "ENDING" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE_INVALID),
    "NCED" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE_INVALID),
    "NCOP" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE_INVALID),
    "OP" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE_INVALID),
    "OPENING" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE_INVALID),
    "PREVIEW" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE_INVALID),
    "PV" => kw(ElementCategory::AnimeType, UNIDENTIFIABLE_INVALID),

    // Audio terms: channels
    "2.0CH" => kw(ElementCategory::AudioTerm, DEFAULT),
    "2CH" => kw(ElementCategory::AudioTerm, DEFAULT),
    "5.1" => kw(ElementCategory::AudioTerm, DEFAULT),
    "5.1CH" => kw(ElementCategory::AudioTerm, DEFAULT),
    "DTS" => kw(ElementCategory::AudioTerm, DEFAULT),
    "DTS-ES" => kw(ElementCategory::AudioTerm, DEFAULT),
    "DTS5.1" => kw(ElementCategory::AudioTerm, DEFAULT),
    "TRUEHD5.1" => kw(ElementCategory::AudioTerm, DEFAULT),
    // Audio terms: codecs
    "AAC" => kw(ElementCategory::AudioTerm, DEFAULT),
    "AACX2" => kw(ElementCategory::AudioTerm, DEFAULT),
    "AACX3" => kw(ElementCategory::AudioTerm, DEFAULT),
    "AACX4" => kw(ElementCategory::AudioTerm, DEFAULT),
    "AC3" => kw(ElementCategory::AudioTerm, DEFAULT),
    "EAC3" => kw(ElementCategory::AudioTerm, DEFAULT),
    "E-AC-3" => kw(ElementCategory::AudioTerm, DEFAULT),
    "FLAC" => kw(ElementCategory::AudioTerm, DEFAULT),
    "FLACX2" => kw(ElementCategory::AudioTerm, DEFAULT),
    "FLACX3" => kw(ElementCategory::AudioTerm, DEFAULT),
    "FLACX4" => kw(ElementCategory::AudioTerm, DEFAULT),
    "LOSSLESS" => kw(ElementCategory::AudioTerm, DEFAULT),
    "MP3" => kw(ElementCategory::AudioTerm, DEFAULT),
    "OGG" => kw(ElementCategory::AudioTerm, DEFAULT),
    "VORBIS" => kw(ElementCategory::AudioTerm, DEFAULT),
    // Audio terms: language
    "DUALAUDIO" => kw(ElementCategory::AudioTerm, DEFAULT),
    "DUAL AUDIO" => kw(ElementCategory::AudioTerm, DEFAULT),
    "DUAL-AUDIO" => kw(ElementCategory::AudioTerm, DEFAULT),
    "MULTIAUDIO" => kw(ElementCategory::AudioTerm, DEFAULT),
    "MULTI AUDIO" => kw(ElementCategory::AudioTerm, DEFAULT),
    "MULTI-AUDIO" => kw(ElementCategory::AudioTerm, DEFAULT),

    // Device compatibility
    "IPAD3" => kw(ElementCategory::DeviceCompatibility, DEFAULT),
    "IPHONE5" => kw(ElementCategory::DeviceCompatibility, DEFAULT),
    "IPOD" => kw(ElementCategory::DeviceCompatibility, DEFAULT),
    "PS3" => kw(ElementCategory::DeviceCompatibility, DEFAULT),
    "XBOX" => kw(ElementCategory::DeviceCompatibility, DEFAULT),
    "XBOX360" => kw(ElementCategory::DeviceCompatibility, DEFAULT),
    // e.g. "Kaiji Android"
    "ANDROID" => kw(ElementCategory::DeviceCompatibility, UNIDENTIFIABLE),

    // Episode prefixes
    "EP" => kw(ElementCategory::EpisodePrefix, DEFAULT),
    "EP." => kw(ElementCategory::EpisodePrefix, DEFAULT),
    "EPS" => kw(ElementCategory::EpisodePrefix, DEFAULT),
    "EPS." => kw(ElementCategory::EpisodePrefix, DEFAULT),
    "EPISODE" => kw(ElementCategory::EpisodePrefix, DEFAULT),
    "EPISODE." => kw(ElementCategory::EpisodePrefix, DEFAULT),
    "EPISODES" => kw(ElementCategory::EpisodePrefix, DEFAULT),
    "CAPITULO" => kw(ElementCategory::EpisodePrefix, DEFAULT),
    "EPISODIO" => kw(ElementCategory::EpisodePrefix, DEFAULT),
    "FOLGE" => kw(ElementCategory::EpisodePrefix, DEFAULT),
    // Single-letter episode keywords are not trusted on their own.
    "E" => kw(ElementCategory::EpisodePrefix, INVALID),
    "第" => kw(ElementCategory::EpisodePrefix, INVALID),

    // Languages
    "ENG" => kw(ElementCategory::Language, DEFAULT),
    "ENGLISH" => kw(ElementCategory::Language, DEFAULT),
    "ESPANOL" => kw(ElementCategory::Language, DEFAULT),
    "JAP" => kw(ElementCategory::Language, DEFAULT),
    "PT-BR" => kw(ElementCategory::Language, DEFAULT),
    "SPANISH" => kw(ElementCategory::Language, DEFAULT),
    "VOSTFR" => kw(ElementCategory::Language, DEFAULT),
    // e.g. "Tokyo ESP", "Bokura ga Ita"
    "ESP" => kw(ElementCategory::Language, UNIDENTIFIABLE),
    "ITA" => kw(ElementCategory::Language, UNIDENTIFIABLE),

    // Other
    "REMASTER" => kw(ElementCategory::Other, DEFAULT),
    "REMASTERED" => kw(ElementCategory::Other, DEFAULT),
    "UNCENSORED" => kw(ElementCategory::Other, DEFAULT),
    "UNCUT" => kw(ElementCategory::Other, DEFAULT),
    "TS" => kw(ElementCategory::Other, DEFAULT),
    "VFR" => kw(ElementCategory::Other, DEFAULT),
    "WIDESCREEN" => kw(ElementCategory::Other, DEFAULT),
    "WS" => kw(ElementCategory::Other, DEFAULT),

    // Release groups
    "THORA" => kw(ElementCategory::ReleaseGroup, DEFAULT),

    // Release information
    "BATCH" => kw(ElementCategory::ReleaseInformation, DEFAULT),
    "COMPLETE" => kw(ElementCategory::ReleaseInformation, DEFAULT),
    "PATCH" => kw(ElementCategory::ReleaseInformation, DEFAULT),
    "REMUX" => kw(ElementCategory::ReleaseInformation, DEFAULT),
    // e.g. "The End of Evangelion", "Final Approach"
    "END" => kw(ElementCategory::ReleaseInformation, UNIDENTIFIABLE),
    "FINAL" => kw(ElementCategory::ReleaseInformation, UNIDENTIFIABLE),

    // Release versions
    "V0" => kw(ElementCategory::ReleaseVersion, DEFAULT),
    "V1" => kw(ElementCategory::ReleaseVersion, DEFAULT),
    "V2" => kw(ElementCategory::ReleaseVersion, DEFAULT),
    "V3" => kw(ElementCategory::ReleaseVersion, DEFAULT),
    "V4" => kw(ElementCategory::ReleaseVersion, DEFAULT),

    // Sources
    "BD" => kw(ElementCategory::Source, DEFAULT),
    "BDRIP" => kw(ElementCategory::Source, DEFAULT),
    "BLURAY" => kw(ElementCategory::Source, DEFAULT),
    "BLU-RAY" => kw(ElementCategory::Source, DEFAULT),
    "DVD" => kw(ElementCategory::Source, DEFAULT),
    "DVD5" => kw(ElementCategory::Source, DEFAULT),
    "DVD9" => kw(ElementCategory::Source, DEFAULT),
    "DVD-R2J" => kw(ElementCategory::Source, DEFAULT),
    "DVDRIP" => kw(ElementCategory::Source, DEFAULT),
    "DVD-RIP" => kw(ElementCategory::Source, DEFAULT),
    "R2DVD" => kw(ElementCategory::Source, DEFAULT),
    "R2J" => kw(ElementCategory::Source, DEFAULT),
    "R2JDVD" => kw(ElementCategory::Source, DEFAULT),
    "R2JDVDRIP" => kw(ElementCategory::Source, DEFAULT),
    "HDTV" => kw(ElementCategory::Source, DEFAULT),
    "HDTVRIP" => kw(ElementCategory::Source, DEFAULT),
    "TVRIP" => kw(ElementCategory::Source, DEFAULT),
    "TV-RIP" => kw(ElementCategory::Source, DEFAULT),
    "WEBCAST" => kw(ElementCategory::Source, DEFAULT),
    "WEBRIP" => kw(ElementCategory::Source, DEFAULT),

    // Subtitles
    "ASS" => kw(ElementCategory::Subtitles, DEFAULT),
    "BIG5" => kw(ElementCategory::Subtitles, DEFAULT),
    "DUB" => kw(ElementCategory::Subtitles, DEFAULT),
    "DUBBED" => kw(ElementCategory::Subtitles, DEFAULT),
    "HARDSUB" => kw(ElementCategory::Subtitles, DEFAULT),
    "HARDSUBS" => kw(ElementCategory::Subtitles, DEFAULT),
    "RAW" => kw(ElementCategory::Subtitles, DEFAULT),
    "SOFTSUB" => kw(ElementCategory::Subtitles, DEFAULT),
    "SOFTSUBS" => kw(ElementCategory::Subtitles, DEFAULT),
    "SUB" => kw(ElementCategory::Subtitles, DEFAULT),
    "SUBBED" => kw(ElementCategory::Subtitles, DEFAULT),
    "SUBTITLED" => kw(ElementCategory::Subtitles, DEFAULT),
    "MULTIPLE SUBTITLE" => kw(ElementCategory::Subtitles, DEFAULT),
    "MULTI SUBS" => kw(ElementCategory::Subtitles, DEFAULT),
    "MULTI-SUBS" => kw(ElementCategory::Subtitles, DEFAULT),

    // Video terms: frame rate
    "23.976FPS" => kw(ElementCategory::VideoTerm, DEFAULT),
    "24FPS" => kw(ElementCategory::VideoTerm, DEFAULT),
    "29.97FPS" => kw(ElementCategory::VideoTerm, DEFAULT),
    "30FPS" => kw(ElementCategory::VideoTerm, DEFAULT),
    "60FPS" => kw(ElementCategory::VideoTerm, DEFAULT),
    "120FPS" => kw(ElementCategory::VideoTerm, DEFAULT),
    // Video terms: codecs
    "8BIT" => kw(ElementCategory::VideoTerm, DEFAULT),
    "8-BIT" => kw(ElementCategory::VideoTerm, DEFAULT),
    "10BIT" => kw(ElementCategory::VideoTerm, DEFAULT),
    "10BITS" => kw(ElementCategory::VideoTerm, DEFAULT),
    "10-BIT" => kw(ElementCategory::VideoTerm, DEFAULT),
    "10-BITS" => kw(ElementCategory::VideoTerm, DEFAULT),
    "HI10" => kw(ElementCategory::VideoTerm, DEFAULT),
    "HI10P" => kw(ElementCategory::VideoTerm, DEFAULT),
    "HI444" => kw(ElementCategory::VideoTerm, DEFAULT),
    "HI444P" => kw(ElementCategory::VideoTerm, DEFAULT),
    "HI444PP" => kw(ElementCategory::VideoTerm, DEFAULT),
    "H264" => kw(ElementCategory::VideoTerm, DEFAULT),
    "H265" => kw(ElementCategory::VideoTerm, DEFAULT),
    "H.264" => kw(ElementCategory::VideoTerm, DEFAULT),
    "H.265" => kw(ElementCategory::VideoTerm, DEFAULT),
    "X264" => kw(ElementCategory::VideoTerm, DEFAULT),
    "X265" => kw(ElementCategory::VideoTerm, DEFAULT),
    "X.264" => kw(ElementCategory::VideoTerm, DEFAULT),
    "AVC" => kw(ElementCategory::VideoTerm, DEFAULT),
    "HEVC" => kw(ElementCategory::VideoTerm, DEFAULT),
    "HEVC2" => kw(ElementCategory::VideoTerm, DEFAULT),
    "DIVX" => kw(ElementCategory::VideoTerm, DEFAULT),
    "DIVX5" => kw(ElementCategory::VideoTerm, DEFAULT),
    "DIVX6" => kw(ElementCategory::VideoTerm, DEFAULT),
    "XVID" => kw(ElementCategory::VideoTerm, DEFAULT),
    // Video terms: format
    "AVI" => kw(ElementCategory::VideoTerm, DEFAULT),
    "RMVB" => kw(ElementCategory::VideoTerm, DEFAULT),
    "WMV" => kw(ElementCategory::VideoTerm, DEFAULT),
    "WMV3" => kw(ElementCategory::VideoTerm, DEFAULT),
    "WMV9" => kw(ElementCategory::VideoTerm, DEFAULT),
    // Video terms: quality
    "HQ" => kw(ElementCategory::VideoTerm, DEFAULT),
    "LQ" => kw(ElementCategory::VideoTerm, DEFAULT),
    "HD" => kw(ElementCategory::VideoTerm, DEFAULT),
    "SD" => kw(ElementCategory::VideoTerm, DEFAULT),

    // Volume prefixes
    "VOL" => kw(ElementCategory::VolumePrefix, DEFAULT),
    "VOL." => kw(ElementCategory::VolumePrefix, DEFAULT),
    "VOLUME" => kw(ElementCategory::VolumePrefix, DEFAULT),
};

/// File extensions live in their own container so they never collide with
/// the general table (e.g. "TS" the extension vs. "TS" the source).
static FILE_EXTENSIONS: phf::Map<&'static str, Keyword> = phf_map! {
    "3GP" => kw(ElementCategory::FileExtension, DEFAULT),
    "AVI" => kw(ElementCategory::FileExtension, DEFAULT),
    "DIVX" => kw(ElementCategory::FileExtension, DEFAULT),
    "FLV" => kw(ElementCategory::FileExtension, DEFAULT),
    "M2TS" => kw(ElementCategory::FileExtension, DEFAULT),
    "MKV" => kw(ElementCategory::FileExtension, DEFAULT),
    "MOV" => kw(ElementCategory::FileExtension, DEFAULT),
    "MP4" => kw(ElementCategory::FileExtension, DEFAULT),
    "MPG" => kw(ElementCategory::FileExtension, DEFAULT),
    "OGM" => kw(ElementCategory::FileExtension, DEFAULT),
    "RM" => kw(ElementCategory::FileExtension, DEFAULT),
    "RMVB" => kw(ElementCategory::FileExtension, DEFAULT),
    "TS" => kw(ElementCategory::FileExtension, DEFAULT),
    "WEBM" => kw(ElementCategory::FileExtension, DEFAULT),
    "WMV" => kw(ElementCategory::FileExtension, DEFAULT),
    // Audio, archive and subtitle extensions are recognized but invalid.
    "AAC" => kw(ElementCategory::FileExtension, INVALID),
    "AIFF" => kw(ElementCategory::FileExtension, INVALID),
    "FLAC" => kw(ElementCategory::FileExtension, INVALID),
    "M4A" => kw(ElementCategory::FileExtension, INVALID),
    "MP3" => kw(ElementCategory::FileExtension, INVALID),
    "MKA" => kw(ElementCategory::FileExtension, INVALID),
    "OGG" => kw(ElementCategory::FileExtension, INVALID),
    "WAV" => kw(ElementCategory::FileExtension, INVALID),
    "WMA" => kw(ElementCategory::FileExtension, INVALID),
    "7Z" => kw(ElementCategory::FileExtension, INVALID),
    "RAR" => kw(ElementCategory::FileExtension, INVALID),
    "ZIP" => kw(ElementCategory::FileExtension, INVALID),
    "ASS" => kw(ElementCategory::FileExtension, INVALID),
    "SRT" => kw(ElementCategory::FileExtension, INVALID),
};

/// Normalize text into a lookup key: NFKD-decompose, drop combining marks,
/// uppercase.
pub fn normalize(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_uppercase()
}

/// Look up a normalized key, optionally restricted to one category.
pub fn find(key: &str, category: Option<ElementCategory>) -> Option<&'static Keyword> {
    let table = if category == Some(ElementCategory::FileExtension) {
        &FILE_EXTENSIONS
    } else {
        &KEYWORDS
    };
    let keyword = table.get(key)?;
    if let Some(category) = category {
        if keyword.category != category {
            return None;
        }
    }
    Some(keyword)
}

/// Keywords located by substring search before delimiter splitting, because
/// splitting would tear them apart. Matches are inserted into the store
/// immediately and their spans become pre-identified tokens.
const PEEK_ENTRIES: &[(ElementCategory, &[&str])] = &[
    (ElementCategory::AudioTerm, &["Dual Audio", "Multi Audio"]),
    (
        ElementCategory::VideoTerm,
        &["H264", "H.264", "h264", "h.264"],
    ),
    (
        ElementCategory::VideoResolution,
        &["480p", "720p", "1080p"],
    ),
    (
        ElementCategory::Subtitles,
        &["Multiple Subtitle", "Multi Subs"],
    ),
    (ElementCategory::Source, &["Blu-Ray"]),
];

/// Scan `text` for pre-identified keywords; returns their byte spans sorted
/// by position, inserting each match into `elements`.
pub fn peek(text: &str, elements: &mut Elements) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();

    for (category, keywords) in PEEK_ENTRIES {
        for keyword in *keywords {
            if let Some(begin) = text.find(keyword) {
                elements.insert(*category, *keyword);
                spans.push((begin, begin + keyword.len()));
            }
        }
    }

    spans.sort_unstable();
    spans
}
