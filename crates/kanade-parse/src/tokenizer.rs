use crate::elements::Elements;
use crate::keyword;
use crate::token::{Token, TokenCategory, TokenFlags, TokenStream};
use crate::Options;

const BRACKET_PAIRS: &[(char, char)] = &[
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('\u{300C}', '\u{300D}'), // Corner brackets
    ('\u{300E}', '\u{300F}'), // White corner brackets
    ('\u{3010}', '\u{3011}'), // Black lenticular brackets
    ('\u{FF08}', '\u{FF09}'), // Fullwidth parentheses
];

/// Split a filename into bracket, delimiter, unknown and preidentified
/// tokens. Keywords found by [`keyword::peek`] are recorded into `elements`
/// as a side effect.
pub fn tokenize(filename: &str, options: &Options, elements: &mut Elements) -> TokenStream {
    let mut stream = TokenStream::new();
    tokenize_by_brackets(filename, options, elements, &mut stream);
    stream
}

fn tokenize_by_brackets(
    filename: &str,
    options: &Options,
    elements: &mut Elements,
    stream: &mut TokenStream,
) {
    let mut text = filename;
    let mut is_bracket_open = false;
    let mut matching_bracket = ')';

    while !text.is_empty() {
        let bracket = if !is_bracket_open {
            text.char_indices().find_map(|(index, c)| {
                BRACKET_PAIRS
                    .iter()
                    .find(|(open, _)| *open == c)
                    .map(|(_, close)| (index, c, *close))
            })
        } else {
            // Looking only for the matching bracket handles some rare cases
            // with nested brackets.
            text.find(matching_bracket)
                .map(|index| (index, matching_bracket, matching_bracket))
        };

        match bracket {
            Some((index, bracket_char, close)) => {
                if index != 0 {
                    tokenize_by_preidentified(
                        &text[..index],
                        is_bracket_open,
                        options,
                        elements,
                        stream,
                    );
                }
                stream.push(Token::new(
                    TokenCategory::Bracket,
                    bracket_char.to_string(),
                    true,
                ));
                is_bracket_open = !is_bracket_open;
                matching_bracket = close;
                text = &text[index + bracket_char.len_utf8()..];
            }
            None => {
                tokenize_by_preidentified(text, is_bracket_open, options, elements, stream);
                break;
            }
        }
    }
}

fn tokenize_by_preidentified(
    text: &str,
    enclosed: bool,
    options: &Options,
    elements: &mut Elements,
    stream: &mut TokenStream,
) {
    let spans = keyword::peek(text, elements);

    let mut offset = 0;
    for (begin, end) in spans {
        if begin < offset {
            continue;
        }
        if offset != begin {
            tokenize_by_delimiters(&text[offset..begin], enclosed, options, stream);
        }
        stream.push(Token::new(
            TokenCategory::Identifier,
            &text[begin..end],
            enclosed,
        ));
        offset = end;
    }

    if offset != text.len() {
        tokenize_by_delimiters(&text[offset..], enclosed, options, stream);
    }
}

fn tokenize_by_delimiters(text: &str, enclosed: bool, options: &Options, stream: &mut TokenStream) {
    let mut run_start = 0;
    for (index, c) in text.char_indices() {
        if options.allowed_delimiters.contains(c) {
            if run_start < index {
                stream.push(Token::new(
                    TokenCategory::Unknown,
                    &text[run_start..index],
                    enclosed,
                ));
            }
            stream.push(Token::new(TokenCategory::Delimiter, c.to_string(), enclosed));
            run_start = index + c.len_utf8();
        }
    }
    if run_start < text.len() {
        stream.push(Token::new(
            TokenCategory::Unknown,
            &text[run_start..],
            enclosed,
        ));
    }

    validate_delimiter_tokens(stream);
}

/// Fix up delimiter tokens over the whole stream: merge single-character
/// splinters back together ("5.1ch"), absorb trailing delimiters before a
/// space or underscore, turn "&" between identical delimiters into a real
/// token, and join digit pairs around "&"/"+".
fn validate_delimiter_tokens(stream: &mut TokenStream) {
    fn is_delimiter(stream: &TokenStream, index: Option<usize>) -> bool {
        index.is_some_and(|i| stream.get(i).category == TokenCategory::Delimiter)
    }

    fn is_unknown(stream: &TokenStream, index: Option<usize>) -> bool {
        index.is_some_and(|i| stream.get(i).category == TokenCategory::Unknown)
    }

    fn is_single_character(stream: &TokenStream, index: Option<usize>) -> bool {
        index.is_some_and(|i| {
            let token = stream.get(i);
            token.category == TokenCategory::Unknown
                && token.content.chars().count() == 1
                && token.content != "-"
        })
    }

    fn is_digits(stream: &TokenStream, index: Option<usize>) -> bool {
        index.is_some_and(|i| {
            let content = &stream.get(i).content;
            !content.is_empty() && content.chars().all(|c| c.is_ascii_digit())
        })
    }

    fn append_to(stream: &mut TokenStream, index: usize, target: usize) {
        let content = stream.get(index).content.clone();
        stream.get_mut(target).content.push_str(&content);
        stream.get_mut(index).category = TokenCategory::Invalid;
    }

    for index in 0..stream.len() {
        if stream.get(index).category != TokenCategory::Delimiter {
            continue;
        }

        let delimiter = stream.get(index).content.clone();
        let prev = stream.find_previous(Some(index), TokenFlags::VALID);
        let mut next = stream.find_next(Some(index), TokenFlags::VALID);

        // Single-character tokens must not split group names, keywords or
        // episode numbers.
        if delimiter != " " && delimiter != "_" {
            if is_single_character(stream, prev) {
                let target = prev.unwrap_or_default();
                append_to(stream, index, target);
                while is_unknown(stream, next) {
                    let unknown = next.unwrap_or_default();
                    append_to(stream, unknown, target);
                    next = stream.find_next(Some(unknown), TokenFlags::VALID);
                    if is_delimiter(stream, next)
                        && next.is_some_and(|i| stream.get(i).content == delimiter)
                    {
                        let same = next.unwrap_or_default();
                        append_to(stream, same, target);
                        next = stream.find_next(Some(same), TokenFlags::VALID);
                    }
                }
                continue;
            }
            if is_single_character(stream, next) {
                if let Some(target) = prev {
                    append_to(stream, index, target);
                    append_to(stream, next.unwrap_or_default(), target);
                    continue;
                }
            }
        }

        // Adjacent delimiters
        if is_unknown(stream, prev) && is_delimiter(stream, next) {
            let next_delimiter = next.map(|i| stream.get(i).content.clone()).unwrap_or_default();
            if delimiter != next_delimiter
                && delimiter != ","
                && (next_delimiter == " " || next_delimiter == "_")
            {
                append_to(stream, index, prev.unwrap_or_default());
            }
        } else if is_delimiter(stream, prev) && is_delimiter(stream, next) {
            let prev_delimiter = prev.map(|i| stream.get(i).content.clone()).unwrap_or_default();
            let next_delimiter = next.map(|i| stream.get(i).content.clone()).unwrap_or_default();
            if prev_delimiter == next_delimiter && prev_delimiter != delimiter {
                // e.g. "&" in "_&_"
                stream.get_mut(index).category = TokenCategory::Unknown;
            }
        }

        if delimiter == "&" || delimiter == "+" {
            // e.g. "01+02"
            if is_unknown(stream, prev)
                && is_unknown(stream, next)
                && is_digits(stream, prev)
                && is_digits(stream, next)
            {
                let target = prev.unwrap_or_default();
                append_to(stream, index, target);
                append_to(stream, next.unwrap_or_default(), target);
            }
        }
    }

    stream.retain_valid();
}
