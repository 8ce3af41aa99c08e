use std::sync::LazyLock;

use regex::Regex;

use crate::elements::{ElementCategory, Elements};
use crate::token::{TokenCategory, TokenFlags, TokenStream};

/// Dash-family characters treated as word separators.
pub const DASHES: &[char] = &[
    '-', '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}',
];

static RE_RESOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3,4}([pP]|[xX×]\d{3,4})$").unwrap());

/// Byte offset of the first ASCII digit, if any.
pub fn find_number_in_string(text: &str) -> Option<usize> {
    text.char_indices()
        .find(|(_, c)| c.is_ascii_digit())
        .map(|(index, _)| index)
}

/// Byte offset of the first non-digit character, if any.
pub fn find_non_number_in_string(text: &str) -> Option<usize> {
    text.char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(index, _)| index)
}

pub fn is_numeric_string(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

pub fn is_hexadecimal_string(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_hexdigit())
}

/// 8-character hexadecimal string, the usual CRC32 shape.
pub fn is_crc32(text: &str) -> bool {
    text.len() == 8 && is_hexadecimal_string(text)
}

pub fn is_dash_character(text: &str) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => DASHES.contains(&c),
        _ => false,
    }
}

/// Map an ordinal word ("2nd", "Second") to its digit.
pub fn get_number_from_ordinal(word: &str) -> Option<&'static str> {
    match word {
        "1st" | "First" => Some("1"),
        "2nd" | "Second" => Some("2"),
        "3rd" | "Third" => Some("3"),
        "4th" | "Fourth" => Some("4"),
        "5th" | "Fifth" => Some("5"),
        "6th" | "Sixth" => Some("6"),
        "7th" | "Seventh" => Some("7"),
        "8th" | "Eighth" => Some("8"),
        "9th" | "Ninth" => Some("9"),
        _ => None,
    }
}

fn is_latin_char(c: char) -> bool {
    c.is_ascii_alphabetic()
        || ('\u{00C0}'..='\u{024F}').contains(&c) // Latin-1 Supplement .. Latin Extended-B
        || ('\u{1E00}'..='\u{1EFF}').contains(&c) // Latin Extended Additional
        || ('\u{2C60}'..='\u{2C7F}').contains(&c) // Latin Extended-C
        || ('\u{A720}'..='\u{A7FF}').contains(&c) // Latin Extended-D
}

/// At least half of the characters are Latin-script.
pub fn is_mostly_latin_string(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let total = text.chars().count();
    let latin = text.chars().filter(|c| is_latin_char(*c)).count();
    latin * 2 >= total
}

/// Resolution shape: "1080p", "1280x720", "1920×1080".
pub fn is_resolution(text: &str) -> bool {
    RE_RESOLUTION.is_match(text)
}

/// A token is isolated when its nearest non-delimiter neighbor on each side
/// is a bracket or absent (stream boundary). Isolated bare numbers like
/// "720" lean towards resolution rather than episode number.
pub fn is_token_isolated(stream: &TokenStream, index: usize) -> bool {
    let previous_ok = match stream.find_previous(Some(index), TokenFlags::NOT_DELIMITER) {
        None => true,
        Some(previous) => stream.get(previous).category == TokenCategory::Bracket,
    };
    if !previous_ok {
        return false;
    }
    match stream.find_next(Some(index), TokenFlags::NOT_DELIMITER) {
        None => true,
        Some(next) => stream.get(next).category == TokenCategory::Bracket,
    }
}

/// Capture the season number around a season-prefix keyword: an ordinal word
/// before it ("2nd Season") or a number after it ("Season 2").
pub fn check_anime_season_keyword(
    stream: &mut TokenStream,
    elements: &mut Elements,
    token: usize,
) -> bool {
    fn set_anime_season(
        stream: &mut TokenStream,
        elements: &mut Elements,
        first: usize,
        second: usize,
        content: &str,
    ) {
        elements.insert(ElementCategory::AnimeSeason, content);
        stream.get_mut(first).category = TokenCategory::Identifier;
        stream.get_mut(second).category = TokenCategory::Identifier;
    }

    if let Some(previous) = stream.find_previous(Some(token), TokenFlags::NOT_DELIMITER) {
        if let Some(number) = get_number_from_ordinal(&stream.get(previous).content) {
            set_anime_season(stream, elements, previous, token, number);
            return true;
        }
    }

    if let Some(next) = stream.find_next(Some(token), TokenFlags::NOT_DELIMITER) {
        let content = stream.get(next).content.clone();
        if is_numeric_string(&content) {
            set_anime_season(stream, elements, token, next, &content);
            return true;
        }
    }

    false
}

/// Concatenate the inclusive token span into one element value, promoting
/// consumed unknown tokens. Without `keep_delimiters`, interior delimiters
/// become spaces (commas and ampersands survive) and the result is trimmed
/// of surrounding spaces and dashes.
pub fn build_element(
    stream: &mut TokenStream,
    elements: &mut Elements,
    category: ElementCategory,
    begin: Option<usize>,
    end: Option<usize>,
    keep_delimiters: bool,
) {
    let mut element = String::new();

    for index in stream.get_list(None, begin, end) {
        let token_category = stream.get(index).category;
        let content = stream.get(index).content.clone();
        match token_category {
            TokenCategory::Unknown => {
                element.push_str(&content);
                stream.get_mut(index).category = TokenCategory::Identifier;
            }
            TokenCategory::Bracket => element.push_str(&content),
            TokenCategory::Delimiter => {
                if keep_delimiters {
                    element.push_str(&content);
                } else if Some(index) != begin && Some(index) != end {
                    if content == "," || content == "&" {
                        element.push_str(&content);
                    } else {
                        element.push(' ');
                    }
                }
            }
            _ => {}
        }
    }

    if !keep_delimiters {
        element = element
            .trim_matches(|c: char| c == ' ' || DASHES.contains(&c))
            .to_string();
    }

    if !element.is_empty() {
        elements.insert(category, element);
    }
}
