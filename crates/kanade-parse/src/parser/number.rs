use std::sync::LazyLock;

use regex::Regex;

use crate::elements::{ElementCategory, Elements};
use crate::keyword;
use crate::parser::helper;
use crate::token::{Token, TokenCategory, TokenFlags, TokenStream};

pub const ANIME_YEAR_MIN: u64 = 1900;
pub const ANIME_YEAR_MAX: u64 = 2050;
const EPISODE_NUMBER_MAX: u64 = ANIME_YEAR_MIN - 1;
const VOLUME_NUMBER_MAX: u64 = 20;

static RE_SINGLE_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3})[vV](\d)$").unwrap());
static RE_MULTI_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3})(?:[vV](\d))?[-~&+](\d{1,3})(?:[vV](\d))?$").unwrap());
static RE_SEASON_AND_EPISODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^S?(\d{1,2})(?:-S?(\d{1,2}))?(?:x|[ ._-x]?E)(\d{1,3})(?:-E?(\d{1,3}))?(?:[vV](\d))?$")
        .unwrap()
});
static RE_FRACTIONAL_EPISODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.5$").unwrap());
static RE_NUMBER_SIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(\d{1,3})(?:[-~&+](\d{1,3}))?(?:[vV](\d))?$").unwrap());
static RE_JAPANESE_COUNTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^(\\d{1,3})\u{8A71}$").unwrap());
static RE_SINGLE_VOLUME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[vV](\d)$").unwrap());
static RE_MULTI_VOLUME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[-~&+](\d{1,2})(?:[vV](\d))?$").unwrap());

/// Lenient numeric conversion: non-numeric strings become zero, numeric
/// strings too large for the integer type saturate instead.
pub fn str2int(text: &str) -> u64 {
    text.parse().unwrap_or_else(|_| {
        if helper::is_numeric_string(text) {
            u64::MAX
        } else {
            0
        }
    })
}

pub fn is_valid_episode_number(number: &str) -> bool {
    str2int(number) <= EPISODE_NUMBER_MAX
}

/// Record an episode number and mark its token consumed. When equivalent
/// numbers are being tracked, the larger of the stored and incoming numbers
/// moves to the alternative slot; equal numbers are rejected.
pub fn set_episode_number(
    stream: &mut TokenStream,
    elements: &mut Elements,
    number: &str,
    token: usize,
    validate: bool,
) -> bool {
    if validate && !is_valid_episode_number(number) {
        return false;
    }

    stream.get_mut(token).category = TokenCategory::Identifier;

    let mut category = ElementCategory::EpisodeNumber;

    if elements.check_alt_number() {
        let episode_number = elements.get(ElementCategory::EpisodeNumber).to_string();
        if str2int(number) > str2int(&episode_number) {
            category = ElementCategory::EpisodeNumberAlt;
        } else if str2int(number) < str2int(&episode_number) {
            elements.remove(ElementCategory::EpisodeNumber, &episode_number);
            elements.insert(ElementCategory::EpisodeNumberAlt, episode_number);
        } else {
            return false;
        }
    }

    elements.insert(category, number);
    true
}

pub fn set_alternative_episode_number(
    stream: &mut TokenStream,
    elements: &mut Elements,
    number: &str,
    token: usize,
) -> bool {
    elements.insert(ElementCategory::EpisodeNumberAlt, number);
    stream.get_mut(token).category = TokenCategory::Identifier;
    true
}

fn is_valid_volume_number(number: &str) -> bool {
    str2int(number) <= VOLUME_NUMBER_MAX
}

pub fn set_volume_number(
    stream: &mut TokenStream,
    elements: &mut Elements,
    number: &str,
    token: usize,
    validate: bool,
) -> bool {
    if validate && !is_valid_volume_number(number) {
        return false;
    }

    elements.insert(ElementCategory::VolumeNumber, number);
    stream.get_mut(token).category = TokenCategory::Identifier;
    true
}

pub fn set_season_number(
    stream: &mut TokenStream,
    elements: &mut Elements,
    number: &str,
    token: usize,
) -> bool {
    if !helper::is_numeric_string(number) {
        return false;
    }

    elements.insert(ElementCategory::AnimeSeason, number);
    stream.get_mut(token).category = TokenCategory::Identifier;
    true
}

/// The token after an extent keyword ("Ep.", "Vol.") holds its number.
pub fn check_extent_keyword(
    stream: &mut TokenStream,
    elements: &mut Elements,
    category: ElementCategory,
    token: usize,
) -> bool {
    let Some(next) = stream.find_next(Some(token), TokenFlags::NOT_DELIMITER) else {
        return false;
    };
    if stream.get(next).category != TokenCategory::Unknown {
        return false;
    }
    let content = stream.get(next).content.clone();
    if helper::find_number_in_string(&content).is_none() {
        return false;
    }

    match category {
        ElementCategory::EpisodeNumber => {
            if !match_episode_patterns(stream, elements, &content, next) {
                set_episode_number(stream, elements, &content, next, false);
            }
        }
        ElementCategory::VolumeNumber => {
            if !match_volume_patterns(stream, elements, &content, next) {
                set_volume_number(stream, elements, &content, next, false);
            }
        }
        _ => return false,
    }

    stream.get_mut(token).category = TokenCategory::Identifier;
    true
}

/// Prefix fused to the number in a single token, e.g. "EP.1", "Vol.1".
pub fn number_comes_after_prefix(
    stream: &mut TokenStream,
    elements: &mut Elements,
    category: ElementCategory,
    token: usize,
) -> bool {
    let content = stream.get(token).content.clone();
    let Some(number_begin) = helper::find_number_in_string(&content) else {
        return false;
    };
    let prefix = &content[..number_begin];

    if keyword::find(&keyword::normalize(prefix), Some(category)).is_none() {
        return false;
    }
    let number = &content[number_begin..];

    match category {
        ElementCategory::EpisodePrefix => {
            if match_episode_patterns(stream, elements, number, token) {
                return true;
            }
            set_episode_number(stream, elements, number, token, false)
        }
        ElementCategory::VolumePrefix => {
            if match_volume_patterns(stream, elements, number, token) {
                return true;
            }
            set_volume_number(stream, elements, number, token, false)
        }
        ElementCategory::AnimeSeasonPrefix => set_season_number(stream, elements, number, token),
        _ => false,
    }
}

/// Number ranges spelled across tokens, e.g. "8 & 10", "01 of 24".
pub fn number_comes_before_another_number(
    stream: &mut TokenStream,
    elements: &mut Elements,
    token: usize,
) -> bool {
    let Some(separator) = stream.find_next(Some(token), TokenFlags::NOT_DELIMITER) else {
        return false;
    };
    let separator_content = stream.get(separator).content.clone();
    if separator_content != "&" && separator_content != "of" {
        return false;
    }

    let Some(other) = stream.find_next(Some(separator), TokenFlags::NOT_DELIMITER) else {
        return false;
    };
    let other_content = stream.get(other).content.clone();
    if !helper::is_numeric_string(&other_content) {
        return false;
    }

    let content = stream.get(token).content.clone();
    set_episode_number(stream, elements, &content, token, false);
    if separator_content == "&" {
        set_episode_number(stream, elements, &other_content, token, false);
    }
    stream.get_mut(separator).category = TokenCategory::Identifier;
    stream.get_mut(other).category = TokenCategory::Identifier;
    true
}

pub fn search_for_episode_patterns(
    stream: &mut TokenStream,
    elements: &mut Elements,
    tokens: &[usize],
) -> bool {
    for &token in tokens {
        let content = stream.get(token).content.clone();
        let numeric_front = content.chars().next().is_some_and(|c| c.is_ascii_digit());

        if !numeric_front {
            if number_comes_after_prefix(stream, elements, ElementCategory::EpisodePrefix, token) {
                return true;
            }
            if number_comes_after_prefix(stream, elements, ElementCategory::VolumePrefix, token) {
                continue;
            }
            if number_comes_after_prefix(
                stream,
                elements,
                ElementCategory::AnimeSeasonPrefix,
                token,
            ) {
                continue;
            }
        } else if number_comes_before_another_number(stream, elements, token) {
            return true;
        }

        if match_episode_patterns(stream, elements, &content, token) {
            return true;
        }
    }

    false
}

fn match_single_episode_pattern(
    stream: &mut TokenStream,
    elements: &mut Elements,
    word: &str,
    token: usize,
) -> bool {
    if let Some(caps) = RE_SINGLE_EPISODE.captures(word) {
        set_episode_number(stream, elements, &caps[1], token, false);
        elements.insert(ElementCategory::ReleaseVersion, &caps[2]);
        return true;
    }
    false
}

fn match_multi_episode_pattern(
    stream: &mut TokenStream,
    elements: &mut Elements,
    word: &str,
    token: usize,
) -> bool {
    if let Some(caps) = RE_MULTI_EPISODE.captures(word) {
        let lower_bound = caps[1].to_string();
        let upper_bound = caps[3].to_string();
        // Avoid matching expressions such as "009-1" or "5-2"
        if str2int(&lower_bound) < str2int(&upper_bound)
            && set_episode_number(stream, elements, &lower_bound, token, true)
        {
            set_episode_number(stream, elements, &upper_bound, token, false);
            if let Some(version) = caps.get(2) {
                elements.insert(ElementCategory::ReleaseVersion, version.as_str());
            }
            if let Some(version) = caps.get(4) {
                elements.insert(ElementCategory::ReleaseVersion, version.as_str());
            }
            return true;
        }
    }
    false
}

fn match_season_and_episode_pattern(
    stream: &mut TokenStream,
    elements: &mut Elements,
    word: &str,
    token: usize,
) -> bool {
    if let Some(caps) = RE_SEASON_AND_EPISODE.captures(word) {
        let season = caps[1].to_string();
        let season_upper = caps.get(2).map(|m| m.as_str().to_string());
        let episode = caps[3].to_string();
        let episode_upper = caps.get(4).map(|m| m.as_str().to_string());
        let version = caps.get(5).map(|m| m.as_str().to_string());

        elements.insert(ElementCategory::AnimeSeason, season);
        if let Some(season_upper) = season_upper {
            elements.insert(ElementCategory::AnimeSeason, season_upper);
        }
        set_episode_number(stream, elements, &episode, token, false);
        if let Some(episode_upper) = episode_upper {
            set_episode_number(stream, elements, &episode_upper, token, false);
        }
        if let Some(version) = version {
            elements.insert(ElementCategory::ReleaseVersion, version);
        }
        return true;
    }
    false
}

/// Anime type fused to the number, e.g. "ED1", "OP4a", "OVA2". On success the
/// token is split so the type prefix survives as its own token.
fn match_type_and_episode_pattern(
    stream: &mut TokenStream,
    elements: &mut Elements,
    word: &str,
    token: usize,
) -> bool {
    let Some(number_begin) = helper::find_number_in_string(word) else {
        return false;
    };
    let prefix = &word[..number_begin];

    let Some(keyword) = keyword::find(&keyword::normalize(prefix), Some(ElementCategory::AnimeType))
    else {
        return false;
    };

    elements.insert(ElementCategory::AnimeType, prefix);
    let number = word[number_begin..].to_string();
    if match_episode_patterns(stream, elements, &number, token)
        || set_episode_number(stream, elements, &number, token, true)
    {
        // Split last to keep the token index stable through the match above.
        let enclosed = stream.get(token).enclosed;
        stream.get_mut(token).content = number;
        stream.insert(
            token,
            Token::new(
                if keyword.options.identifiable {
                    TokenCategory::Identifier
                } else {
                    TokenCategory::Unknown
                },
                prefix,
                enclosed,
            ),
        );
        return true;
    }
    false
}

fn match_fractional_episode_pattern(
    stream: &mut TokenStream,
    elements: &mut Elements,
    word: &str,
    token: usize,
) -> bool {
    // Only ".5" is allowed; anything else tends to be part of the title
    // ("Evangelion: 1.11") or a keyword ("5.1").
    RE_FRACTIONAL_EPISODE.is_match(word) && set_episode_number(stream, elements, word, token, true)
}

fn match_partial_episode_pattern(
    stream: &mut TokenStream,
    elements: &mut Elements,
    word: &str,
    token: usize,
) -> bool {
    let Some(non_number_begin) = helper::find_non_number_in_string(word) else {
        return false;
    };
    let suffix = &word[non_number_begin..];

    let valid_suffix = suffix.len() == 1 && suffix.chars().all(|c| "ABCabc".contains(c));
    valid_suffix && set_episode_number(stream, elements, word, token, true)
}

fn match_number_sign_pattern(
    stream: &mut TokenStream,
    elements: &mut Elements,
    word: &str,
    token: usize,
) -> bool {
    if !word.starts_with('#') {
        return false;
    }

    if let Some(caps) = RE_NUMBER_SIGN.captures(word) {
        let episode = caps[1].to_string();
        let episode_upper = caps.get(2).map(|m| m.as_str().to_string());
        let version = caps.get(3).map(|m| m.as_str().to_string());
        if set_episode_number(stream, elements, &episode, token, true) {
            if let Some(episode_upper) = episode_upper {
                set_episode_number(stream, elements, &episode_upper, token, true);
            }
            if let Some(version) = version {
                elements.insert(ElementCategory::ReleaseVersion, version);
            }
            return true;
        }
    }
    false
}

fn match_japanese_counter_pattern(
    stream: &mut TokenStream,
    elements: &mut Elements,
    word: &str,
    token: usize,
) -> bool {
    // U+8A71 is used as a counter for stories and TV episodes.
    if !word.ends_with('\u{8A71}') {
        return false;
    }

    if let Some(caps) = RE_JAPANESE_COUNTER.captures(word) {
        let episode = caps[1].to_string();
        return set_episode_number(stream, elements, &episode, token, false);
    }
    false
}

pub fn match_episode_patterns(
    stream: &mut TokenStream,
    elements: &mut Elements,
    word: &str,
    token: usize,
) -> bool {
    // All patterns contain at least one non-numeric character
    if helper::is_numeric_string(word) {
        return false;
    }

    let word = word.trim_matches(|c| c == ' ' || c == '-');
    if word.is_empty() {
        return false;
    }

    let numeric_front = word.chars().next().is_some_and(|c| c.is_ascii_digit());
    let numeric_back = word.chars().last().is_some_and(|c| c.is_ascii_digit());

    // e.g. "01v2"
    if numeric_front && numeric_back && match_single_episode_pattern(stream, elements, word, token)
    {
        return true;
    }
    // e.g. "01-02", "03-05v2"
    if numeric_front && numeric_back && match_multi_episode_pattern(stream, elements, word, token) {
        return true;
    }
    // e.g. "2x01", "S01E03", "S01-02xE001-150", "S01E06v2"
    if numeric_back && match_season_and_episode_pattern(stream, elements, word, token) {
        return true;
    }
    // e.g. "ED1", "OP4a", "OVA2"
    if !numeric_front && match_type_and_episode_pattern(stream, elements, word, token) {
        return true;
    }
    // e.g. "07.5"
    if numeric_front
        && numeric_back
        && match_fractional_episode_pattern(stream, elements, word, token)
    {
        return true;
    }
    // e.g. "4a", "111C"
    if numeric_front && !numeric_back && match_partial_episode_pattern(stream, elements, word, token)
    {
        return true;
    }
    // e.g. "#01", "#02-03v2"
    if numeric_back && match_number_sign_pattern(stream, elements, word, token) {
        return true;
    }
    if numeric_front && match_japanese_counter_pattern(stream, elements, word, token) {
        return true;
    }

    false
}

fn match_single_volume_pattern(
    stream: &mut TokenStream,
    elements: &mut Elements,
    word: &str,
    token: usize,
) -> bool {
    if let Some(caps) = RE_SINGLE_VOLUME.captures(word) {
        let volume = caps[1].to_string();
        let version = caps[2].to_string();
        set_volume_number(stream, elements, &volume, token, false);
        elements.insert(ElementCategory::ReleaseVersion, version);
        return true;
    }
    false
}

fn match_multi_volume_pattern(
    stream: &mut TokenStream,
    elements: &mut Elements,
    word: &str,
    token: usize,
) -> bool {
    if let Some(caps) = RE_MULTI_VOLUME.captures(word) {
        let lower_bound = caps[1].to_string();
        let upper_bound = caps[2].to_string();
        if str2int(&lower_bound) < str2int(&upper_bound)
            && set_volume_number(stream, elements, &lower_bound, token, true)
        {
            set_volume_number(stream, elements, &upper_bound, token, false);
            if let Some(version) = caps.get(3) {
                elements.insert(ElementCategory::ReleaseVersion, version.as_str());
            }
            return true;
        }
    }
    false
}

pub fn match_volume_patterns(
    stream: &mut TokenStream,
    elements: &mut Elements,
    word: &str,
    token: usize,
) -> bool {
    if helper::is_numeric_string(word) {
        return false;
    }

    let word = word.trim_matches(|c| c == ' ' || c == '-');
    if word.is_empty() {
        return false;
    }

    let numeric_front = word.chars().next().is_some_and(|c| c.is_ascii_digit());
    let numeric_back = word.chars().last().is_some_and(|c| c.is_ascii_digit());

    if numeric_front && numeric_back {
        // e.g. "01v2"
        if match_single_volume_pattern(stream, elements, word, token) {
            return true;
        }
        // e.g. "01-02", "03-05v2"
        if match_multi_volume_pattern(stream, elements, word, token) {
            return true;
        }
    }

    false
}

/// Equivalent-number pairs like "01 (176)": the smaller number becomes the
/// episode number, the larger the alternative.
pub fn search_for_equivalent_numbers(
    stream: &mut TokenStream,
    elements: &mut Elements,
    tokens: &[usize],
) -> bool {
    for &token in tokens {
        let content = stream.get(token).content.clone();
        if helper::is_token_isolated(stream, token) || !is_valid_episode_number(&content) {
            continue;
        }

        // Find the first enclosed non-delimiter token
        let Some(bracket) = stream.find_next(Some(token), TokenFlags::NOT_DELIMITER) else {
            continue;
        };
        if stream.get(bracket).category != TokenCategory::Bracket {
            continue;
        }
        let Some(other) = stream.find_next(
            Some(bracket),
            TokenFlags::ENCLOSED | TokenFlags::NOT_DELIMITER,
        ) else {
            continue;
        };
        if stream.get(other).category != TokenCategory::Unknown {
            continue;
        }

        let other_content = stream.get(other).content.clone();
        if !helper::is_token_isolated(stream, other)
            || !helper::is_numeric_string(&other_content)
            || !is_valid_episode_number(&other_content)
        {
            continue;
        }

        let first = str2int(&content);
        let second = str2int(&other_content);
        let (episode_content, episode_token) = if first <= second {
            (content.clone(), token)
        } else {
            (other_content.clone(), other)
        };
        let (alt_content, alt_token) = if first >= second {
            (content, token)
        } else {
            (other_content, other)
        };

        set_episode_number(stream, elements, &episode_content, episode_token, false);
        set_alternative_episode_number(stream, elements, &alt_content, alt_token);
        return true;
    }

    false
}

/// Numbers preceded by a dash separator, e.g. " - 08".
pub fn search_for_separated_numbers(
    stream: &mut TokenStream,
    elements: &mut Elements,
    tokens: &[usize],
) -> bool {
    for &token in tokens {
        let Some(previous) = stream.find_previous(Some(token), TokenFlags::NOT_DELIMITER) else {
            continue;
        };
        if stream.get(previous).category != TokenCategory::Unknown
            || !helper::is_dash_character(&stream.get(previous).content)
        {
            continue;
        }

        let content = stream.get(token).content.clone();
        if set_episode_number(stream, elements, &content, token, true) {
            stream.get_mut(previous).category = TokenCategory::Identifier;
            return true;
        }
    }

    false
}

/// Numbers isolated inside brackets, e.g. "[12]", "(2006)".
pub fn search_for_isolated_numbers(
    stream: &mut TokenStream,
    elements: &mut Elements,
    tokens: &[usize],
) -> bool {
    for &token in tokens {
        if !stream.get(token).enclosed || !helper::is_token_isolated(stream, token) {
            continue;
        }

        let content = stream.get(token).content.clone();
        if set_episode_number(stream, elements, &content, token, true) {
            return true;
        }
    }

    false
}

/// Last resort: take the last remaining numeric token, skipping ones that
/// cannot plausibly be the episode number.
pub fn search_for_last_number(
    stream: &mut TokenStream,
    elements: &mut Elements,
    tokens: &[usize],
) -> bool {
    for &token in tokens.iter().rev() {
        // The episode number always comes after the title, so the first token
        // cannot be what we are looking for
        if token == 0 {
            continue;
        }

        // An enclosed token is unlikely to be the episode number at this point
        if stream.get(token).enclosed {
            continue;
        }

        // Ignore if it's the first non-enclosed, non-delimiter token
        if (0..token).all(|i| {
            stream.get(i).enclosed || stream.get(i).category == TokenCategory::Delimiter
        }) {
            continue;
        }

        // Ignore if the previous token is "Movie" or "Part"
        if let Some(previous) = stream.find_previous(Some(token), TokenFlags::NOT_DELIMITER) {
            if stream.get(previous).category == TokenCategory::Unknown {
                let previous_content = stream.get(previous).content.to_lowercase();
                if previous_content == "movie" || previous_content == "part" {
                    continue;
                }
            }
        }

        let content = stream.get(token).content.clone();
        if set_episode_number(stream, elements, &content, token, true) {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unknown(content: &str, enclosed: bool) -> Token {
        Token::new(TokenCategory::Unknown, content, enclosed)
    }

    fn delimiter(content: &str, enclosed: bool) -> Token {
        Token::new(TokenCategory::Delimiter, content, enclosed)
    }

    fn bracket(content: &str) -> Token {
        Token::new(TokenCategory::Bracket, content, true)
    }

    #[test]
    fn test_lenient_conversion() {
        assert_eq!(str2int("07"), 7);
        assert_eq!(str2int("1899"), 1899);
        assert_eq!(str2int("4a"), 0);
        assert_eq!(str2int("07.5"), 0);
        assert_eq!(str2int("99999999999999999999"), u64::MAX);
    }

    #[test]
    fn test_episode_number_upper_bound() {
        assert!(is_valid_episode_number("1899"));
        assert!(!is_valid_episode_number("1900"));
    }

    #[test]
    fn test_single_episode_with_version() {
        let mut stream = TokenStream::new();
        stream.push(unknown("05v2", false));
        let mut elements = Elements::new();
        assert!(match_episode_patterns(
            &mut stream,
            &mut elements,
            "05v2",
            0
        ));
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "05");
        assert_eq!(elements.get(ElementCategory::ReleaseVersion), "2");
        assert_eq!(stream.get(0).category, TokenCategory::Identifier);
    }

    #[test]
    fn test_multi_episode_range() {
        let mut stream = TokenStream::new();
        stream.push(unknown("01-03", false));
        let mut elements = Elements::new();
        assert!(match_episode_patterns(
            &mut stream,
            &mut elements,
            "01-03",
            0
        ));
        assert_eq!(elements.get_all(ElementCategory::EpisodeNumber), ["01", "03"]);
    }

    #[test]
    fn test_multi_episode_rejects_descending_range() {
        // "009-1" is a title, not a range.
        let mut stream = TokenStream::new();
        stream.push(unknown("009-1", false));
        let mut elements = Elements::new();
        assert!(!match_episode_patterns(
            &mut stream,
            &mut elements,
            "009-1",
            0
        ));
        assert!(!elements.contains(ElementCategory::EpisodeNumber));
    }

    #[test]
    fn test_season_and_episode() {
        let mut stream = TokenStream::new();
        stream.push(unknown("S01E03", false));
        let mut elements = Elements::new();
        assert!(match_episode_patterns(
            &mut stream,
            &mut elements,
            "S01E03",
            0
        ));
        assert_eq!(elements.get(ElementCategory::AnimeSeason), "01");
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "03");
    }

    #[test]
    fn test_season_x_episode() {
        let mut stream = TokenStream::new();
        stream.push(unknown("2x01", false));
        let mut elements = Elements::new();
        assert!(match_episode_patterns(&mut stream, &mut elements, "2x01", 0));
        assert_eq!(elements.get(ElementCategory::AnimeSeason), "2");
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "01");
    }

    #[test]
    fn test_type_and_episode_splits_token() {
        let mut stream = TokenStream::new();
        stream.push(unknown("OVA2", false));
        let mut elements = Elements::new();
        assert!(match_episode_patterns(&mut stream, &mut elements, "OVA2", 0));
        assert_eq!(elements.get(ElementCategory::AnimeType), "OVA");
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "2");
        // The prefix now lives in its own token before the number.
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.get(0).content, "OVA");
        assert_eq!(stream.get(1).content, "2");
        assert_eq!(stream.get(1).category, TokenCategory::Identifier);
    }

    #[test]
    fn test_fractional_episode_only_half() {
        let mut stream = TokenStream::new();
        stream.push(unknown("07.5", false));
        stream.push(unknown("8.0", false));
        let mut elements = Elements::new();
        assert!(match_episode_patterns(&mut stream, &mut elements, "07.5", 0));
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "07.5");
        assert!(!match_episode_patterns(&mut stream, &mut elements, "8.0", 1));
    }

    #[test]
    fn test_partial_episode_suffix() {
        let mut stream = TokenStream::new();
        stream.push(unknown("4a", false));
        let mut elements = Elements::new();
        assert!(match_episode_patterns(&mut stream, &mut elements, "4a", 0));
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "4a");
    }

    #[test]
    fn test_number_sign_pattern() {
        let mut stream = TokenStream::new();
        stream.push(unknown("#02-03v2", false));
        let mut elements = Elements::new();
        assert!(match_episode_patterns(
            &mut stream,
            &mut elements,
            "#02-03v2",
            0
        ));
        assert_eq!(elements.get_all(ElementCategory::EpisodeNumber), ["02", "03"]);
        assert_eq!(elements.get(ElementCategory::ReleaseVersion), "2");
    }

    #[test]
    fn test_japanese_counter() {
        let word = "08\u{8A71}";
        let mut stream = TokenStream::new();
        stream.push(unknown(word, false));
        let mut elements = Elements::new();
        assert!(match_episode_patterns(&mut stream, &mut elements, word, 0));
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "08");
    }

    #[test]
    fn test_plain_numbers_do_not_match_patterns() {
        let mut stream = TokenStream::new();
        stream.push(unknown("01", false));
        let mut elements = Elements::new();
        assert!(!match_episode_patterns(&mut stream, &mut elements, "01", 0));
    }

    #[test]
    fn test_volume_range_keeps_lower_bound() {
        // Volume number is singular, so only the lower bound of a range
        // survives in the store.
        let mut stream = TokenStream::new();
        stream.push(unknown("01-02", false));
        let mut elements = Elements::new();
        assert!(match_volume_patterns(&mut stream, &mut elements, "01-02", 0));
        assert_eq!(elements.get_all(ElementCategory::VolumeNumber), ["01"]);
    }

    #[test]
    fn test_volume_upper_bound() {
        let mut stream = TokenStream::new();
        stream.push(unknown("21v2", false));
        let mut elements = Elements::new();
        // 21 exceeds the volume cap, so the single-volume pattern still
        // matches (unvalidated) but the range pattern would not.
        assert!(match_volume_patterns(&mut stream, &mut elements, "21v2", 0));
        assert_eq!(elements.get(ElementCategory::VolumeNumber), "21");
    }

    #[test]
    fn test_alt_number_tracks_larger_value() {
        let mut stream = TokenStream::new();
        stream.push(unknown("01", false));
        stream.push(unknown("176", false));
        let mut elements = Elements::new();
        elements.insert(ElementCategory::EpisodeNumber, "01");
        elements.set_check_alt_number(true);

        assert!(set_episode_number(&mut stream, &mut elements, "176", 1, false));
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "01");
        assert_eq!(elements.get(ElementCategory::EpisodeNumberAlt), "176");

        // Equal numbers are rejected.
        assert!(!set_episode_number(&mut stream, &mut elements, "01", 0, false));
    }

    #[test]
    fn test_alt_number_swaps_when_smaller_arrives() {
        let mut stream = TokenStream::new();
        stream.push(unknown("176", false));
        stream.push(unknown("04", false));
        let mut elements = Elements::new();
        elements.insert(ElementCategory::EpisodeNumber, "176");
        elements.set_check_alt_number(true);

        assert!(set_episode_number(&mut stream, &mut elements, "04", 1, false));
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "04");
        assert_eq!(elements.get(ElementCategory::EpisodeNumberAlt), "176");
    }

    #[test]
    fn test_equivalent_numbers_pair_across_brackets() {
        // "01 (176)"
        let mut stream = TokenStream::new();
        stream.push(unknown("Title", false));
        stream.push(delimiter(" ", false));
        stream.push(unknown("01", false));
        stream.push(delimiter(" ", false));
        stream.push(bracket("("));
        stream.push(unknown("176", true));
        stream.push(bracket(")"));
        let mut elements = Elements::new();
        assert!(search_for_equivalent_numbers(
            &mut stream,
            &mut elements,
            &[2, 5]
        ));
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "01");
        assert_eq!(elements.get(ElementCategory::EpisodeNumberAlt), "176");
    }

    #[test]
    fn test_separated_number_consumes_dash() {
        // " - 08"
        let mut stream = TokenStream::new();
        stream.push(unknown("Title", false));
        stream.push(delimiter(" ", false));
        stream.push(unknown("-", false));
        stream.push(delimiter(" ", false));
        stream.push(unknown("08", false));
        let mut elements = Elements::new();
        assert!(search_for_separated_numbers(
            &mut stream,
            &mut elements,
            &[4]
        ));
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "08");
        assert_eq!(stream.get(2).category, TokenCategory::Identifier);
    }

    #[test]
    fn test_last_number_prefers_later_tokens() {
        // "Title 2 ... 05": the later number wins.
        let mut stream = TokenStream::new();
        stream.push(unknown("Title", false));
        stream.push(delimiter(" ", false));
        stream.push(unknown("2", false));
        stream.push(delimiter(" ", false));
        stream.push(unknown("Arc", false));
        stream.push(delimiter(" ", false));
        stream.push(unknown("05", false));
        let mut elements = Elements::new();
        assert!(search_for_last_number(&mut stream, &mut elements, &[2, 6]));
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "05");
    }

    #[test]
    fn test_last_number_skips_movie_and_part() {
        let mut stream = TokenStream::new();
        stream.push(unknown("Title", false));
        stream.push(delimiter(" ", false));
        stream.push(unknown("Movie", false));
        stream.push(delimiter(" ", false));
        stream.push(unknown("8", false));
        let mut elements = Elements::new();
        assert!(!search_for_last_number(&mut stream, &mut elements, &[4]));
        assert!(!elements.contains(ElementCategory::EpisodeNumber));
    }

    #[test]
    fn test_prefixed_number_in_one_token() {
        // "EP.05"
        let mut stream = TokenStream::new();
        stream.push(unknown("EP.05", false));
        let mut elements = Elements::new();
        assert!(number_comes_after_prefix(
            &mut stream,
            &mut elements,
            ElementCategory::EpisodePrefix,
            0
        ));
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "05");
    }

    #[test]
    fn test_number_ranges_across_tokens() {
        // "8 & 10"
        let mut stream = TokenStream::new();
        stream.push(unknown("8", false));
        stream.push(delimiter(" ", false));
        stream.push(unknown("&", false));
        stream.push(delimiter(" ", false));
        stream.push(unknown("10", false));
        let mut elements = Elements::new();
        assert!(number_comes_before_another_number(
            &mut stream,
            &mut elements,
            0
        ));
        assert_eq!(elements.get_all(ElementCategory::EpisodeNumber), ["8", "10"]);
        assert_eq!(stream.get(2).category, TokenCategory::Identifier);
        assert_eq!(stream.get(4).category, TokenCategory::Identifier);
    }

    #[test]
    fn test_extent_keyword_consumes_following_number() {
        // "Vol" "." "4"
        let mut stream = TokenStream::new();
        stream.push(unknown("Vol", false));
        stream.push(delimiter(".", false));
        stream.push(unknown("4", false));
        let mut elements = Elements::new();
        assert!(check_extent_keyword(
            &mut stream,
            &mut elements,
            ElementCategory::VolumeNumber,
            0
        ));
        assert_eq!(elements.get(ElementCategory::VolumeNumber), "4");
        assert_eq!(stream.get(0).category, TokenCategory::Identifier);
        assert_eq!(stream.get(2).category, TokenCategory::Identifier);
    }
}
