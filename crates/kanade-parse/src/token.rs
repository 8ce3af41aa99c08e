use bitflags::bitflags;

/// Classification of a single span of the filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    /// Not yet assigned to any element.
    Unknown,
    /// A single bracket character.
    Bracket,
    /// A delimiter character (space, underscore, dot, ...).
    Delimiter,
    /// Assigned to an element; must not be reconsidered.
    Identifier,
    /// Discarded during tokenization (merged into a neighbor).
    Invalid,
}

bitflags! {
    /// Predicate flags for token searches.
    ///
    /// Within the category axes a token matches if *any* present axis check
    /// passes; the enclosure axis is checked independently and must pass on
    /// its own. `VALID`/`NOT_VALID` is asymmetric on purpose: `NOT_VALID`
    /// means "category is `Invalid`", `VALID` means "any other category".
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TokenFlags: u16 {
        const BRACKET = 1 << 0;
        const NOT_BRACKET = 1 << 1;
        const DELIMITER = 1 << 2;
        const NOT_DELIMITER = 1 << 3;
        const IDENTIFIER = 1 << 4;
        const NOT_IDENTIFIER = 1 << 5;
        const UNKNOWN = 1 << 6;
        const NOT_UNKNOWN = 1 << 7;
        const VALID = 1 << 8;
        const NOT_VALID = 1 << 9;
        const ENCLOSED = 1 << 10;
        const NOT_ENCLOSED = 1 << 11;

        const MASK_CATEGORIES = Self::BRACKET.bits()
            | Self::NOT_BRACKET.bits()
            | Self::DELIMITER.bits()
            | Self::NOT_DELIMITER.bits()
            | Self::IDENTIFIER.bits()
            | Self::NOT_IDENTIFIER.bits()
            | Self::UNKNOWN.bits()
            | Self::NOT_UNKNOWN.bits()
            | Self::VALID.bits()
            | Self::NOT_VALID.bits();
        const MASK_ENCLOSED = Self::ENCLOSED.bits() | Self::NOT_ENCLOSED.bits();
    }
}

/// A classified span of the original filename.
#[derive(Debug, Clone)]
pub struct Token {
    pub category: TokenCategory,
    pub content: String,
    /// Whether the token lies inside a matched bracket pair. Set once at
    /// tokenization time and never mutated by any pass.
    pub enclosed: bool,
}

impl Token {
    pub fn new(category: TokenCategory, content: impl Into<String>, enclosed: bool) -> Self {
        Token {
            category,
            content: content.into(),
            enclosed,
        }
    }

    /// Check the token against a flag mask.
    pub fn check_flags(&self, flags: TokenFlags) -> bool {
        if flags.intersects(TokenFlags::MASK_ENCLOSED) {
            let success = if flags.contains(TokenFlags::ENCLOSED) {
                self.enclosed
            } else {
                !self.enclosed
            };
            if !success {
                return false;
            }
        }

        if flags.intersects(TokenFlags::MASK_CATEGORIES) {
            let check = |yes: TokenFlags, no: TokenFlags, category: TokenCategory| {
                if flags.contains(yes) {
                    self.category == category
                } else if flags.contains(no) {
                    self.category != category
                } else {
                    false
                }
            };
            return check(
                TokenFlags::BRACKET,
                TokenFlags::NOT_BRACKET,
                TokenCategory::Bracket,
            ) || check(
                TokenFlags::DELIMITER,
                TokenFlags::NOT_DELIMITER,
                TokenCategory::Delimiter,
            ) || check(
                TokenFlags::IDENTIFIER,
                TokenFlags::NOT_IDENTIFIER,
                TokenCategory::Identifier,
            ) || check(
                TokenFlags::UNKNOWN,
                TokenFlags::NOT_UNKNOWN,
                TokenCategory::Unknown,
            ) || check(
                TokenFlags::NOT_VALID,
                TokenFlags::VALID,
                TokenCategory::Invalid,
            );
        }

        true
    }
}

/// The ordered token sequence for a single parse.
///
/// Tokens are addressed by index; searches return `None` on no match, and
/// `None` endpoints mean "from the start" / "to the end" of the stream.
/// Ordering is the order of appearance in the original string.
#[derive(Debug, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> &Token {
        &self.tokens[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Token {
        &mut self.tokens[index]
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Insert a token before `index`, shifting subsequent tokens.
    pub fn insert(&mut self, index: usize, token: Token) {
        self.tokens.insert(index, token);
    }

    /// Drop tokens invalidated during tokenization.
    pub fn retain_valid(&mut self) {
        self.tokens
            .retain(|token| token.category != TokenCategory::Invalid);
    }

    /// First token in the stream matching `flags`.
    pub fn find(&self, flags: TokenFlags) -> Option<usize> {
        self.find_next(None, flags)
    }

    /// First match strictly after `from` (whole stream when `from` is `None`).
    pub fn find_next(&self, from: Option<usize>, flags: TokenFlags) -> Option<usize> {
        let start = from.map_or(0, |index| index + 1);
        (start..self.tokens.len()).find(|&i| self.tokens[i].check_flags(flags))
    }

    /// First match strictly before `from`, scanning backwards (from the end
    /// of the stream when `from` is `None`).
    pub fn find_previous(&self, from: Option<usize>, flags: TokenFlags) -> Option<usize> {
        let end = from.unwrap_or(self.tokens.len());
        (0..end).rev().find(|&i| self.tokens[i].check_flags(flags))
    }

    /// Indices of all matches within the inclusive range `[begin, end]`
    /// (stream boundaries when an endpoint is `None`); `flags` of `None`
    /// matches everything.
    pub fn get_list(
        &self,
        flags: Option<TokenFlags>,
        begin: Option<usize>,
        end: Option<usize>,
    ) -> Vec<usize> {
        if self.tokens.is_empty() {
            return Vec::new();
        }
        let begin = begin.unwrap_or(0);
        let end = end.unwrap_or(self.tokens.len() - 1).min(self.tokens.len() - 1);
        (begin..=end)
            .filter(|&i| flags.map_or(true, |f| self.tokens[i].check_flags(f)))
            .collect()
    }

    /// Index difference between two endpoints; `None` means the start or the
    /// end of the stream respectively.
    pub fn distance(&self, begin: Option<usize>, end: Option<usize>) -> usize {
        end.unwrap_or(self.tokens.len())
            .saturating_sub(begin.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stream() -> TokenStream {
        let mut stream = TokenStream::new();
        stream.push(Token::new(TokenCategory::Bracket, "[", true));
        stream.push(Token::new(TokenCategory::Unknown, "Group", true));
        stream.push(Token::new(TokenCategory::Bracket, "]", true));
        stream.push(Token::new(TokenCategory::Delimiter, " ", false));
        stream.push(Token::new(TokenCategory::Unknown, "Title", false));
        stream
    }

    #[test]
    fn test_flags_match_single_axis() {
        let token = Token::new(TokenCategory::Unknown, "Title", false);
        assert!(token.check_flags(TokenFlags::UNKNOWN));
        assert!(!token.check_flags(TokenFlags::BRACKET));
        assert!(token.check_flags(TokenFlags::NOT_BRACKET));
    }

    #[test]
    fn test_flags_or_across_category_axes() {
        // BRACKET | IDENTIFIER matches either category.
        let bracket = Token::new(TokenCategory::Bracket, "[", true);
        let identifier = Token::new(TokenCategory::Identifier, "720p", false);
        let unknown = Token::new(TokenCategory::Unknown, "Title", false);
        let flags = TokenFlags::BRACKET | TokenFlags::IDENTIFIER;
        assert!(bracket.check_flags(flags));
        assert!(identifier.check_flags(flags));
        assert!(!unknown.check_flags(flags));
    }

    #[test]
    fn test_flags_enclosure_is_independent() {
        let enclosed = Token::new(TokenCategory::Unknown, "Group", true);
        let open = Token::new(TokenCategory::Unknown, "Title", false);
        let flags = TokenFlags::NOT_ENCLOSED | TokenFlags::UNKNOWN;
        assert!(!enclosed.check_flags(flags));
        assert!(open.check_flags(flags));
    }

    #[test]
    fn test_valid_axis_is_asymmetric() {
        // VALID means "not Invalid", NOT_VALID means exactly Invalid.
        let invalid = Token::new(TokenCategory::Invalid, "x", false);
        let delimiter = Token::new(TokenCategory::Delimiter, " ", false);
        assert!(invalid.check_flags(TokenFlags::NOT_VALID));
        assert!(!invalid.check_flags(TokenFlags::VALID));
        assert!(delimiter.check_flags(TokenFlags::VALID));
        assert!(!delimiter.check_flags(TokenFlags::NOT_VALID));
    }

    #[test]
    fn test_find_next_and_previous() {
        let stream = sample_stream();
        assert_eq!(stream.find(TokenFlags::UNKNOWN), Some(1));
        assert_eq!(stream.find_next(Some(1), TokenFlags::UNKNOWN), Some(4));
        assert_eq!(stream.find_previous(Some(4), TokenFlags::BRACKET), Some(2));
        // No previous token before the first one.
        assert_eq!(stream.find_previous(Some(0), TokenFlags::VALID), None);
        // None endpoints scan from the respective end.
        assert_eq!(stream.find_previous(None, TokenFlags::UNKNOWN), Some(4));
        assert_eq!(stream.find_next(None, TokenFlags::BRACKET), Some(0));
    }

    #[test]
    fn test_get_list_is_inclusive() {
        let stream = sample_stream();
        let brackets = stream.get_list(Some(TokenFlags::BRACKET), Some(0), Some(2));
        assert_eq!(brackets, vec![0, 2]);
        let all = stream.get_list(None, None, None);
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_distance_with_open_endpoints() {
        let stream = sample_stream();
        assert_eq!(stream.distance(Some(1), Some(4)), 3);
        assert_eq!(stream.distance(None, None), 5);
        assert_eq!(stream.distance(Some(3), None), 2);
    }
}
