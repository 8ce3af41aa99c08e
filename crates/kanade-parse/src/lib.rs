//! Heuristic metadata extraction from anime filenames.
//!
//! Fansub releases encode their metadata in the filename itself, with no
//! agreed-upon format. This crate tokenizes a filename and runs a fixed
//! sequence of heuristic passes over the tokens to recover the anime title,
//! episode number, release group, video resolution and more.
//!
//! ```
//! use kanade_parse::{ElementCategory, ElementValue};
//!
//! let elements =
//!     kanade_parse::parse("[TaoSub] Spy x Family - 25 (1080p) [ABCD1234].mkv").unwrap();
//! assert_eq!(
//!     elements[&ElementCategory::AnimeTitle],
//!     ElementValue::Single("Spy x Family".to_owned())
//! );
//! assert_eq!(
//!     elements[&ElementCategory::EpisodeNumber],
//!     ElementValue::Single("25".to_owned())
//! );
//! assert_eq!(
//!     elements[&ElementCategory::ReleaseGroup],
//!     ElementValue::Single("TaoSub".to_owned())
//! );
//! ```

pub mod elements;
mod keyword;
mod parser;
pub mod token;
mod tokenizer;

use tracing::trace;

pub use crate::elements::{ElementCategory, ElementMap, ElementValue};
use crate::elements::Elements;
use crate::parser::Parser;

/// Parsing options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Characters treated as delimiters during tokenization.
    pub allowed_delimiters: String,
    /// Substrings removed from the filename before tokenization.
    pub ignored_strings: Vec<String>,
    pub parse_episode_number: bool,
    pub parse_episode_title: bool,
    pub parse_file_extension: bool,
    pub parse_release_group: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            allowed_delimiters: " _.&+,|".to_owned(),
            ignored_strings: Vec::new(),
            parse_episode_number: true,
            parse_episode_title: true,
            parse_file_extension: true,
            parse_release_group: true,
        }
    }
}

/// Parse a filename with the default [`Options`].
///
/// Returns `None` when nothing at all could be extracted.
pub fn parse(filename: &str) -> Option<ElementMap> {
    parse_with_options(filename, &Options::default())
}

/// Parse a filename.
pub fn parse_with_options(filename: &str, options: &Options) -> Option<ElementMap> {
    trace!(filename, "parsing");

    let mut elements = Elements::new();
    elements.insert(ElementCategory::FileName, filename);

    let mut working = filename.to_owned();
    if options.parse_file_extension {
        if let Some((name, extension)) = split_extension(&working) {
            let name = name.to_owned();
            let extension = extension.to_owned();
            working = name;
            elements.insert(ElementCategory::FileExtension, extension);
        }
    }

    for ignored in &options.ignored_strings {
        working = working.replace(ignored.as_str(), "");
    }

    if working.is_empty() {
        return None;
    }

    let mut stream = tokenizer::tokenize(&working, options, &mut elements);
    if stream.is_empty() {
        return None;
    }

    let mut parser = Parser::new(options, &mut stream, &mut elements);
    if !parser.parse() {
        return None;
    }

    Some(elements.into_map())
}

/// Split off a recognized media file extension. Anything longer than four
/// characters, non-alphanumeric or not in the extension table stays part of
/// the name.
fn split_extension(filename: &str) -> Option<(&str, &str)> {
    let (name, extension) = filename.rsplit_once('.')?;

    if extension.len() > 4 || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    keyword::find(
        &keyword::normalize(extension),
        Some(ElementCategory::FileExtension),
    )?;

    Some((name, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_split_and_recorded() {
        let elements = parse("[Group] Title - 05 [720p].mkv").unwrap();
        assert_eq!(
            elements[&ElementCategory::FileExtension],
            ElementValue::Single("mkv".to_owned())
        );
        // The file name element keeps the extension.
        assert_eq!(
            elements[&ElementCategory::FileName],
            ElementValue::Single("[Group] Title - 05 [720p].mkv".to_owned())
        );
        assert_eq!(
            elements[&ElementCategory::EpisodeNumber],
            ElementValue::Single("05".to_owned())
        );
    }

    #[test]
    fn test_unknown_extension_stays_in_the_name() {
        let elements = parse("Title - 05.xyz").unwrap();
        assert!(!elements.contains_key(&ElementCategory::FileExtension));
    }

    #[test]
    fn test_extension_parsing_can_be_disabled() {
        let options = Options {
            parse_file_extension: false,
            ..Options::default()
        };
        let elements = parse_with_options("Title - 05.mkv", &options).unwrap();
        assert!(!elements.contains_key(&ElementCategory::FileExtension));
    }

    #[test]
    fn test_ignored_strings_are_removed() {
        let options = Options {
            ignored_strings: vec!["3x3".to_owned()],
            ..Options::default()
        };
        let elements = parse_with_options("3x3 Eyes - 01.mkv", &options).unwrap();
        assert_eq!(
            elements[&ElementCategory::AnimeTitle],
            ElementValue::Single("Eyes".to_owned())
        );
    }

    #[test]
    fn test_empty_filename_yields_nothing() {
        assert!(parse("").is_none());
    }

    #[test]
    fn test_serializes_to_json() {
        let elements = parse("[Group] Title - 05 [720p].mkv").unwrap();
        let json = serde_json::to_value(&elements).unwrap();
        assert_eq!(json["anime_title"], "Title");
        assert_eq!(json["episode_number"], "05");
        assert_eq!(json["video_resolution"], "720p");
        assert_eq!(json["release_group"], "Group");
    }
}
