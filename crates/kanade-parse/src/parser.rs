pub(crate) mod helper;
pub(crate) mod number;

use tracing::trace;

use crate::elements::{ElementCategory, Elements};
use crate::keyword;
use crate::token::{TokenCategory, TokenFlags, TokenStream};
use crate::Options;

/// Runs the heuristic passes over a tokenized filename, in a fixed order:
/// keywords, isolated numbers, episode number, anime title, release group,
/// episode title, validation. Each pass only consumes tokens still marked
/// unknown, so a fully resolved stream passes through unchanged.
pub struct Parser<'a> {
    options: &'a Options,
    stream: &'a mut TokenStream,
    elements: &'a mut Elements,
}

impl<'a> Parser<'a> {
    pub fn new(
        options: &'a Options,
        stream: &'a mut TokenStream,
        elements: &'a mut Elements,
    ) -> Self {
        Parser {
            options,
            stream,
            elements,
        }
    }

    pub fn parse(&mut self) -> bool {
        self.search_for_keywords();
        self.search_for_isolated_numbers();

        if self.options.parse_episode_number {
            self.search_for_episode_number();
        }

        self.search_for_anime_title();

        if self.options.parse_release_group
            && !self.elements.contains(ElementCategory::ReleaseGroup)
        {
            self.search_for_release_group();
        }

        if self.options.parse_episode_title
            && self.elements.contains(ElementCategory::EpisodeNumber)
        {
            self.search_for_episode_title();
        }

        self.validate_elements();

        !self.elements.is_empty()
    }

    fn search_for_keywords(&mut self) {
        let unknown_tokens = self.stream.get_list(Some(TokenFlags::UNKNOWN), None, None);
        // Prefix handlers may split tokens, shifting the indices collected
        // above; track the growth and compensate.
        let mut shift = 0;

        for index in unknown_tokens {
            let index = index + shift;
            if self.stream.get(index).category != TokenCategory::Unknown {
                continue;
            }
            let word = self
                .stream
                .get(index)
                .content
                .trim_matches(|c| c == ' ' || c == '-')
                .to_string();

            if word.is_empty() {
                continue;
            }
            // Don't bother if the word is a number that cannot be a CRC
            if word.len() != 8 && word.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }

            let length_before = self.stream.len();
            let keyword = keyword::find(&keyword::normalize(&word), None);
            let mut category = None;
            let mut value = word.clone();

            if let Some(keyword) = keyword {
                category = Some(keyword.category);
                if !self.options.parse_release_group
                    && keyword.category == ElementCategory::ReleaseGroup
                {
                    continue;
                }
                if !keyword.category.is_searchable() || !keyword.options.searchable {
                    continue;
                }
                if keyword.category.is_singular() && self.elements.contains(keyword.category) {
                    continue;
                }

                match keyword.category {
                    ElementCategory::AnimeSeasonPrefix => {
                        helper::check_anime_season_keyword(self.stream, self.elements, index);
                        shift += self.stream.len() - length_before;
                        continue;
                    }
                    ElementCategory::EpisodePrefix => {
                        if keyword.options.valid {
                            number::check_extent_keyword(
                                self.stream,
                                self.elements,
                                ElementCategory::EpisodeNumber,
                                index,
                            );
                        }
                        shift += self.stream.len() - length_before;
                        continue;
                    }
                    ElementCategory::ReleaseVersion => {
                        // Number without the "v"; the marker may be a
                        // multi-byte character such as a fullwidth letter.
                        let marker = value.chars().next().map_or(0, char::len_utf8);
                        value = value[marker..].to_string();
                    }
                    ElementCategory::VolumePrefix => {
                        number::check_extent_keyword(
                            self.stream,
                            self.elements,
                            ElementCategory::VolumeNumber,
                            index,
                        );
                        shift += self.stream.len() - length_before;
                        continue;
                    }
                    _ => {}
                }
            } else if !self.elements.contains(ElementCategory::FileChecksum)
                && helper::is_crc32(&word)
            {
                category = Some(ElementCategory::FileChecksum);
            } else if !self.elements.contains(ElementCategory::VideoResolution)
                && helper::is_resolution(&word)
            {
                category = Some(ElementCategory::VideoResolution);
            }

            if let Some(category) = category {
                self.elements.insert(category, value);
                if keyword.map_or(true, |keyword| keyword.options.identifiable) {
                    self.stream.get_mut(index).category = TokenCategory::Identifier;
                }
            }
        }
    }

    fn search_for_isolated_numbers(&mut self) {
        for index in self.stream.get_list(Some(TokenFlags::UNKNOWN), None, None) {
            let content = self.stream.get(index).content.clone();
            if !helper::is_numeric_string(&content)
                || !helper::is_token_isolated(self.stream, index)
            {
                continue;
            }

            let value = number::str2int(&content);

            // Anime year
            if (number::ANIME_YEAR_MIN..=number::ANIME_YEAR_MAX).contains(&value)
                && !self.elements.contains(ElementCategory::AnimeYear)
            {
                self.elements.insert(ElementCategory::AnimeYear, content);
                self.stream.get_mut(index).category = TokenCategory::Identifier;
                continue;
            }

            // Some fansub groups drop the "p" suffix from the resolution
            if matches!(value, 480 | 720 | 1080)
                && !self.elements.contains(ElementCategory::VideoResolution)
            {
                self.elements
                    .insert(ElementCategory::VideoResolution, content);
                self.stream.get_mut(index).category = TokenCategory::Identifier;
            }
        }
    }

    fn search_for_episode_number(&mut self) {
        // All unknown tokens that contain a number
        let tokens: Vec<usize> = self
            .stream
            .get_list(Some(TokenFlags::UNKNOWN), None, None)
            .into_iter()
            .filter(|&index| {
                helper::find_number_in_string(&self.stream.get(index).content).is_some()
            })
            .collect();

        if tokens.is_empty() {
            return;
        }

        self.elements
            .set_check_alt_number(self.elements.contains(ElementCategory::EpisodeNumber));

        // If a token matches a known episode pattern, it has to be the
        // episode number
        if number::search_for_episode_patterns(self.stream, self.elements, &tokens) {
            trace!("episode number found via pattern match");
            return;
        }

        if self.elements.contains(ElementCategory::EpisodeNumber) {
            return; // Previously found via keywords
        }

        // From now on, only numeric tokens are of interest
        let tokens: Vec<usize> = tokens
            .into_iter()
            .filter(|&index| helper::is_numeric_string(&self.stream.get(index).content))
            .collect();

        if tokens.is_empty() {
            return;
        }

        // e.g. "01 (176)", "29 (04)"
        if number::search_for_equivalent_numbers(self.stream, self.elements, &tokens) {
            return;
        }
        // e.g. " - 08"
        if number::search_for_separated_numbers(self.stream, self.elements, &tokens) {
            return;
        }
        // e.g. "[12]", "(2006)"
        if number::search_for_isolated_numbers(self.stream, self.elements, &tokens) {
            return;
        }
        // Consider the last number as a last resort
        number::search_for_last_number(self.stream, self.elements, &tokens);
    }

    fn search_for_anime_title(&mut self) {
        let mut enclosed_title = false;

        // The first non-enclosed unknown token
        let mut token_begin = self
            .stream
            .find(TokenFlags::NOT_ENCLOSED | TokenFlags::UNKNOWN);

        // If that doesn't work, find the first unknown token in the second
        // enclosed group, assuming that the first one is the release group
        if token_begin.is_none() {
            enclosed_title = true;
            let mut candidate = self.stream.find_next(None, TokenFlags::UNKNOWN);
            let mut skipped_previous_group = false;
            while let Some(index) = candidate {
                // Ignore groups composed of non-Latin characters
                if helper::is_mostly_latin_string(&self.stream.get(index).content)
                    && skipped_previous_group
                {
                    break;
                }
                // Move to the first unknown token of the next group
                let bracket = self.stream.find_next(Some(index), TokenFlags::BRACKET);
                candidate = match bracket {
                    Some(bracket) => self.stream.find_next(Some(bracket), TokenFlags::UNKNOWN),
                    None => None,
                };
                skipped_previous_group = true;
            }
            token_begin = candidate;
        }

        let Some(token_begin) = token_begin else {
            return;
        };

        // Continue until an identifier (or a bracket, if the title is
        // enclosed) is found
        let mut token_end = self.stream.find_next(
            Some(token_begin),
            if enclosed_title {
                TokenFlags::IDENTIFIER | TokenFlags::BRACKET
            } else {
                TokenFlags::IDENTIFIER
            },
        );

        if !enclosed_title {
            // If the interval contains an open bracket without its matching
            // pair, move the upper endpoint back to that bracket
            let mut last_bracket = token_end;
            let mut bracket_open = false;
            for index in self
                .stream
                .get_list(Some(TokenFlags::BRACKET), Some(token_begin), token_end)
            {
                last_bracket = Some(index);
                bracket_open = !bracket_open;
            }
            if bracket_open {
                token_end = last_bracket;
            }

            // If the interval ends with an enclosed group (e.g. "Anime Title
            // [Fansub]"), move the upper endpoint back to the beginning of
            // the group. Parentheses are kept so that groups like "(TV)"
            // survive inside the title.
            let mut token = self.stream.find_previous(token_end, TokenFlags::NOT_DELIMITER);
            while let Some(index) = token {
                if self.stream.get(index).category != TokenCategory::Bracket
                    || self.stream.get(index).content == ")"
                {
                    break;
                }
                match self.stream.find_previous(Some(index), TokenFlags::BRACKET) {
                    Some(open_bracket) => {
                        token_end = Some(open_bracket);
                        token = self
                            .stream
                            .find_previous(token_end, TokenFlags::NOT_DELIMITER);
                    }
                    None => break,
                }
            }
        }

        // Token end is a bracket, so include the previous token instead
        let token_end = self.stream.find_previous(token_end, TokenFlags::VALID);
        helper::build_element(
            self.stream,
            self.elements,
            ElementCategory::AnimeTitle,
            Some(token_begin),
            token_end,
            false,
        );
    }

    fn search_for_release_group(&mut self) {
        let mut token_end: Option<usize> = None;
        loop {
            // The first enclosed unknown token
            let token_begin = match token_end {
                Some(end) => self
                    .stream
                    .find_next(Some(end), TokenFlags::ENCLOSED | TokenFlags::UNKNOWN),
                None => self.stream.find(TokenFlags::ENCLOSED | TokenFlags::UNKNOWN),
            };
            let Some(token_begin) = token_begin else {
                return;
            };

            // Continue until a bracket or identifier is found
            token_end = self.stream.find_next(
                Some(token_begin),
                TokenFlags::BRACKET | TokenFlags::IDENTIFIER,
            );
            let Some(end) = token_end else {
                return;
            };
            if self.stream.get(end).category != TokenCategory::Bracket {
                continue;
            }

            // Ignore if it's not the first non-delimiter token in the group
            if let Some(previous) = self
                .stream
                .find_previous(Some(token_begin), TokenFlags::NOT_DELIMITER)
            {
                if self.stream.get(previous).category != TokenCategory::Bracket {
                    continue;
                }
            }

            // Token end is a bracket, so include the previous token instead
            let token_end = self.stream.find_previous(token_end, TokenFlags::VALID);
            helper::build_element(
                self.stream,
                self.elements,
                ElementCategory::ReleaseGroup,
                Some(token_begin),
                token_end,
                true,
            );
            return;
        }
    }

    fn search_for_episode_title(&mut self) {
        let mut token_end: Option<usize> = None;
        loop {
            // The first non-enclosed unknown token
            let token_begin = match token_end {
                Some(end) => self
                    .stream
                    .find_next(Some(end), TokenFlags::NOT_ENCLOSED | TokenFlags::UNKNOWN),
                None => self
                    .stream
                    .find(TokenFlags::NOT_ENCLOSED | TokenFlags::UNKNOWN),
            };
            let Some(token_begin) = token_begin else {
                return;
            };

            // Continue until a bracket or identifier is found
            token_end = self.stream.find_next(
                Some(token_begin),
                TokenFlags::BRACKET | TokenFlags::IDENTIFIER,
            );

            // Ignore if it's only a dash
            if self.stream.distance(Some(token_begin), token_end) <= 2
                && helper::is_dash_character(&self.stream.get(token_begin).content)
            {
                if token_end.is_none() {
                    return;
                }
                continue;
            }

            // If token end is a bracket, include the previous token instead
            let token_end = match token_end {
                Some(end) if self.stream.get(end).category == TokenCategory::Bracket => {
                    self.stream.find_previous(Some(end), TokenFlags::VALID)
                }
                other => other,
            };
            helper::build_element(
                self.stream,
                self.elements,
                ElementCategory::EpisodeTitle,
                Some(token_begin),
                token_end,
                false,
            );
            return;
        }
    }

    fn validate_elements(&mut self) {
        // An episode title that duplicates (or contains) the anime type is
        // not a real title
        if self.elements.contains(ElementCategory::AnimeType)
            && self.elements.contains(ElementCategory::EpisodeTitle)
        {
            let episode_title = self.elements.get(ElementCategory::EpisodeTitle).to_string();
            let anime_types: Vec<String> =
                self.elements.get_all(ElementCategory::AnimeType).to_vec();
            for anime_type in anime_types {
                if anime_type == episode_title {
                    self.elements.erase(ElementCategory::EpisodeTitle);
                } else if episode_title.contains(&anime_type)
                    && keyword::find(
                        &keyword::normalize(&anime_type),
                        Some(ElementCategory::AnimeType),
                    )
                    .is_some()
                {
                    self.elements.remove(ElementCategory::AnimeType, &anime_type);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;
    use crate::tokenizer;

    fn parse_filename(filename: &str) -> (TokenStream, Elements) {
        let options = Options::default();
        let mut elements = Elements::new();
        let mut stream = tokenizer::tokenize(filename, &options, &mut elements);
        let mut parser = Parser::new(&options, &mut stream, &mut elements);
        assert!(parser.parse());
        (stream, elements)
    }

    #[test]
    fn test_typical_fansub_filename() {
        let (_, elements) =
            parse_filename("[TaoSub] Spy x Family - 25 (1080p) [ABCD1234]");
        assert_eq!(elements.get(ElementCategory::ReleaseGroup), "TaoSub");
        assert_eq!(elements.get(ElementCategory::AnimeTitle), "Spy x Family");
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "25");
        assert_eq!(elements.get(ElementCategory::VideoResolution), "1080p");
        assert_eq!(elements.get(ElementCategory::FileChecksum), "ABCD1234");
    }

    #[test]
    fn test_underscore_delimited_filename() {
        let (_, elements) =
            parse_filename("[HorribleSubs]_Naruto_Shippuuden_-_500_[720p]");
        assert_eq!(elements.get(ElementCategory::ReleaseGroup), "HorribleSubs");
        assert_eq!(elements.get(ElementCategory::AnimeTitle), "Naruto Shippuuden");
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "500");
        assert_eq!(elements.get(ElementCategory::VideoResolution), "720p");
    }

    #[test]
    fn test_equivalent_numbers() {
        let (_, elements) = parse_filename("Anime Title 01 (176)");
        assert_eq!(elements.get(ElementCategory::AnimeTitle), "Anime Title");
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "01");
        assert_eq!(elements.get(ElementCategory::EpisodeNumberAlt), "176");
    }

    #[test]
    fn test_parenthesized_type_stays_in_title() {
        let (_, elements) = parse_filename("Anime (TV)");
        assert_eq!(elements.get(ElementCategory::AnimeTitle), "Anime (TV)");
        assert_eq!(elements.get(ElementCategory::AnimeType), "TV");
    }

    #[test]
    fn test_bare_resolution_number() {
        let (_, elements) = parse_filename("720");
        assert_eq!(elements.get(ElementCategory::VideoResolution), "720");
        assert!(!elements.contains(ElementCategory::EpisodeNumber));
    }

    #[test]
    fn test_isolated_year() {
        let (_, elements) = parse_filename("Anime Title (2006) - 01");
        assert_eq!(elements.get(ElementCategory::AnimeYear), "2006");
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "01");
        assert_eq!(elements.get(ElementCategory::AnimeTitle), "Anime Title");
    }

    #[test]
    fn test_season_and_episode_shorthand() {
        let (_, elements) = parse_filename("[Group] Title S01E03 [1080p]");
        assert_eq!(elements.get(ElementCategory::AnimeTitle), "Title");
        assert_eq!(elements.get(ElementCategory::AnimeSeason), "01");
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "03");
        assert_eq!(elements.get(ElementCategory::VideoResolution), "1080p");
    }

    #[test]
    fn test_season_keyword_with_ordinal() {
        let (_, elements) = parse_filename("Title 2nd Season - 05");
        assert_eq!(elements.get(ElementCategory::AnimeSeason), "2");
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "05");
        assert_eq!(elements.get(ElementCategory::AnimeTitle), "Title");
    }

    #[test]
    fn test_episode_version() {
        let (_, elements) = parse_filename("[Group] Title - 05v2 [720p]");
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "05");
        assert_eq!(elements.get(ElementCategory::ReleaseVersion), "2");
    }

    #[test]
    fn test_fullwidth_version_marker() {
        // "ｖ2" normalizes to "V2"; stripping the marker must respect the
        // character boundary.
        let (_, elements) = parse_filename("Title - 05 \u{FF56}2");
        assert_eq!(elements.get(ElementCategory::ReleaseVersion), "2");
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "05");
    }

    #[test]
    fn test_episode_title_after_number() {
        let (_, elements) = parse_filename("Anime Title - 05 - Episode Title");
        assert_eq!(elements.get(ElementCategory::AnimeTitle), "Anime Title");
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "05");
        assert_eq!(elements.get(ElementCategory::EpisodeTitle), "Episode Title");
    }

    #[test]
    fn test_enclosed_title_skips_release_group() {
        let (_, elements) = parse_filename("[Fansub][Some Title][01]");
        assert_eq!(elements.get(ElementCategory::AnimeTitle), "Some Title");
        assert_eq!(elements.get(ElementCategory::ReleaseGroup), "Fansub");
        assert_eq!(elements.get(ElementCategory::EpisodeNumber), "01");
    }

    #[test]
    fn test_episode_title_matching_anime_type_is_dropped() {
        let (_, elements) = parse_filename("Title - 01 - OVA");
        assert!(!elements.contains(ElementCategory::EpisodeTitle));
        assert_eq!(elements.get(ElementCategory::AnimeType), "OVA");
    }

    #[test]
    fn test_anime_type_inside_episode_title_is_removed_from_types() {
        let (_, elements) = parse_filename("Title - 01 - OVA Omake");
        assert_eq!(elements.get(ElementCategory::EpisodeTitle), "OVA Omake");
        assert!(!elements.contains(ElementCategory::AnimeType));
    }

    #[test]
    fn test_keyword_classification() {
        let (_, elements) =
            parse_filename("[Group] Title - 03 [BD 1080p FLAC Dual Audio]");
        assert_eq!(elements.get(ElementCategory::Source), "BD");
        let audio_terms = elements.get_all(ElementCategory::AudioTerm);
        assert!(audio_terms.iter().any(|term| term == "FLAC"));
        assert!(audio_terms.iter().any(|term| term == "Dual Audio"));
        assert_eq!(elements.get(ElementCategory::VideoResolution), "1080p");
    }

    #[test]
    fn test_passes_leave_resolved_streams_untouched() {
        let options = Options::default();
        let mut stream = TokenStream::new();
        stream.push(Token::new(TokenCategory::Identifier, "Title", false));
        stream.push(Token::new(TokenCategory::Delimiter, " ", false));
        stream.push(Token::new(TokenCategory::Identifier, "05", false));
        let mut elements = Elements::new();
        elements.insert(ElementCategory::AnimeTitle, "Title");
        elements.insert(ElementCategory::EpisodeNumber, "05");

        let mut parser = Parser::new(&options, &mut stream, &mut elements);
        assert!(parser.parse());

        assert_eq!(elements.get(ElementCategory::AnimeTitle), "Title");
        assert_eq!(elements.get_all(ElementCategory::EpisodeNumber), ["05"]);
        assert_eq!(stream.len(), 3);
        for index in 0..stream.len() {
            assert_ne!(stream.get(index).category, TokenCategory::Unknown);
        }
    }

    #[test]
    fn test_enclosure_flags_never_change() {
        let options = Options::default();
        let mut elements = Elements::new();
        let mut stream = tokenizer::tokenize(
            "[Group] Title - 05 (1080p)",
            &options,
            &mut elements,
        );
        let before: Vec<bool> = (0..stream.len())
            .map(|i| stream.get(i).enclosed)
            .collect();

        let mut parser = Parser::new(&options, &mut stream, &mut elements);
        assert!(parser.parse());

        let after: Vec<bool> = (0..stream.len())
            .map(|i| stream.get(i).enclosed)
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_options_disable_passes() {
        let options = Options {
            parse_episode_number: false,
            parse_release_group: false,
            ..Options::default()
        };
        let mut elements = Elements::new();
        let mut stream =
            tokenizer::tokenize("[Group] Title - 05", &options, &mut elements);
        let mut parser = Parser::new(&options, &mut stream, &mut elements);
        assert!(parser.parse());
        assert!(!elements.contains(ElementCategory::EpisodeNumber));
        assert!(!elements.contains(ElementCategory::ReleaseGroup));
    }
}
