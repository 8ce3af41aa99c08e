use std::collections::BTreeMap;

use serde::Serialize;

/// Categories of metadata extracted from a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementCategory {
    AnimeSeason,
    AnimeSeasonPrefix,
    AnimeTitle,
    AnimeType,
    AnimeYear,
    AudioTerm,
    DeviceCompatibility,
    EpisodeNumber,
    EpisodeNumberAlt,
    EpisodePrefix,
    EpisodeTitle,
    FileChecksum,
    FileExtension,
    FileName,
    Language,
    Other,
    ReleaseGroup,
    ReleaseInformation,
    ReleaseVersion,
    Source,
    Subtitles,
    VideoResolution,
    VideoTerm,
    VolumeNumber,
    VolumePrefix,
}

impl ElementCategory {
    /// Output key used by [`ElementMap`].
    pub fn name(self) -> &'static str {
        match self {
            ElementCategory::AnimeSeason => "anime_season",
            ElementCategory::AnimeSeasonPrefix => "anime_season_prefix",
            ElementCategory::AnimeTitle => "anime_title",
            ElementCategory::AnimeType => "anime_type",
            ElementCategory::AnimeYear => "anime_year",
            ElementCategory::AudioTerm => "audio_term",
            ElementCategory::DeviceCompatibility => "device_compatibility",
            ElementCategory::EpisodeNumber => "episode_number",
            ElementCategory::EpisodeNumberAlt => "episode_number_alt",
            ElementCategory::EpisodePrefix => "episode_prefix",
            ElementCategory::EpisodeTitle => "episode_title",
            ElementCategory::FileChecksum => "file_checksum",
            ElementCategory::FileExtension => "file_extension",
            ElementCategory::FileName => "file_name",
            ElementCategory::Language => "language",
            ElementCategory::Other => "other",
            ElementCategory::ReleaseGroup => "release_group",
            ElementCategory::ReleaseInformation => "release_information",
            ElementCategory::ReleaseVersion => "release_version",
            ElementCategory::Source => "source",
            ElementCategory::Subtitles => "subtitles",
            ElementCategory::VideoResolution => "video_resolution",
            ElementCategory::VideoTerm => "video_term",
            ElementCategory::VolumeNumber => "volume_number",
            ElementCategory::VolumePrefix => "volume_prefix",
        }
    }

    /// Whether direct keyword matches under this category may be inserted
    /// during the keyword pass. Episode number, titles, year and friends are
    /// reachable only through their dedicated passes.
    pub fn is_searchable(self) -> bool {
        matches!(
            self,
            ElementCategory::AnimeSeasonPrefix
                | ElementCategory::AnimeType
                | ElementCategory::AudioTerm
                | ElementCategory::DeviceCompatibility
                | ElementCategory::EpisodePrefix
                | ElementCategory::FileChecksum
                | ElementCategory::Language
                | ElementCategory::Other
                | ElementCategory::ReleaseGroup
                | ElementCategory::ReleaseInformation
                | ElementCategory::ReleaseVersion
                | ElementCategory::Source
                | ElementCategory::Subtitles
                | ElementCategory::VideoResolution
                | ElementCategory::VideoTerm
                | ElementCategory::VolumePrefix
        )
    }

    /// Whether at most one value may ever be stored under this category.
    pub fn is_singular(self) -> bool {
        !matches!(
            self,
            ElementCategory::AnimeSeason
                | ElementCategory::AnimeType
                | ElementCategory::AudioTerm
                | ElementCategory::EpisodeNumber
                | ElementCategory::Language
                | ElementCategory::ReleaseInformation
                | ElementCategory::Source
                | ElementCategory::VideoTerm
        )
    }
}

/// A materialized element value: single-valued categories (and multi-valued
/// categories that happened to collect exactly one value) collapse to a bare
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ElementValue {
    Single(String),
    Multiple(Vec<String>),
}

/// Final parse result: category name to collapsed value(s).
pub type ElementMap = BTreeMap<ElementCategory, ElementValue>;

/// Multi-valued element store populated during a single parse.
///
/// Scoped to exactly one parse; never shared across parses.
#[derive(Debug, Default)]
pub struct Elements {
    elements: BTreeMap<ElementCategory, Vec<String>>,
    check_alt_number: bool,
}

impl Elements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the episode-number pass should treat further numbers as
    /// candidates for the alternate episode number.
    pub fn check_alt_number(&self) -> bool {
        self.check_alt_number
    }

    pub fn set_check_alt_number(&mut self, value: bool) {
        self.check_alt_number = value;
    }

    /// Append a value. Singular categories keep their first value.
    pub fn insert(&mut self, category: ElementCategory, value: impl Into<String>) {
        let values = self.elements.entry(category).or_default();
        if category.is_singular() && !values.is_empty() {
            return;
        }
        values.push(value.into());
    }

    /// Remove all values under a category.
    pub fn erase(&mut self, category: ElementCategory) {
        self.elements.remove(&category);
    }

    /// Remove one occurrence of `value`; drops the category once empty.
    pub fn remove(&mut self, category: ElementCategory, value: &str) {
        if let Some(values) = self.elements.get_mut(&category) {
            if let Some(position) = values.iter().position(|v| v == value) {
                values.remove(position);
            }
            if values.is_empty() {
                self.elements.remove(&category);
            }
        }
    }

    pub fn contains(&self, category: ElementCategory) -> bool {
        self.elements
            .get(&category)
            .is_some_and(|values| !values.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// First value under a category, or `""` when absent. Callers rely on
    /// the empty string instead of branching on absence.
    pub fn get(&self, category: ElementCategory) -> &str {
        self.elements
            .get(&category)
            .and_then(|values| values.first())
            .map_or("", String::as_str)
    }

    /// All values under a category, or an empty slice when absent.
    pub fn get_all(&self, category: ElementCategory) -> &[String] {
        self.elements
            .get(&category)
            .map_or(&[], Vec::as_slice)
    }

    /// Materialize the final map, collapsing one-element sequences to bare
    /// values regardless of cardinality rules.
    pub fn into_map(self) -> ElementMap {
        self.elements
            .into_iter()
            .map(|(category, mut values)| {
                let value = if values.len() == 1 {
                    ElementValue::Single(values.remove(0))
                } else {
                    ElementValue::Multiple(values)
                };
                (category, value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_keeps_first_value() {
        let mut elements = Elements::new();
        elements.insert(ElementCategory::AnimeTitle, "First");
        elements.insert(ElementCategory::AnimeTitle, "Second");
        assert_eq!(elements.get(ElementCategory::AnimeTitle), "First");
        assert_eq!(elements.get_all(ElementCategory::AnimeTitle).len(), 1);
    }

    #[test]
    fn test_non_singular_accumulates() {
        let mut elements = Elements::new();
        elements.insert(ElementCategory::EpisodeNumber, "01");
        elements.insert(ElementCategory::EpisodeNumber, "02");
        assert_eq!(
            elements.get_all(ElementCategory::EpisodeNumber),
            ["01", "02"]
        );
    }

    #[test]
    fn test_get_defaults_to_empty() {
        let elements = Elements::new();
        assert_eq!(elements.get(ElementCategory::AnimeTitle), "");
        assert!(elements.get_all(ElementCategory::Language).is_empty());
    }

    #[test]
    fn test_remove_drops_empty_category() {
        let mut elements = Elements::new();
        elements.insert(ElementCategory::AnimeType, "OVA");
        elements.insert(ElementCategory::AnimeType, "TV");
        elements.remove(ElementCategory::AnimeType, "OVA");
        assert_eq!(elements.get_all(ElementCategory::AnimeType), ["TV"]);
        elements.remove(ElementCategory::AnimeType, "TV");
        assert!(!elements.contains(ElementCategory::AnimeType));
    }

    #[test]
    fn test_map_collapses_single_valued_sequences() {
        let mut elements = Elements::new();
        elements.insert(ElementCategory::Source, "BD");
        elements.insert(ElementCategory::Language, "ENG");
        elements.insert(ElementCategory::Language, "JAP");
        let map = elements.into_map();
        assert_eq!(
            map.get(&ElementCategory::Source),
            Some(&ElementValue::Single("BD".into()))
        );
        assert_eq!(
            map.get(&ElementCategory::Language),
            Some(&ElementValue::Multiple(vec!["ENG".into(), "JAP".into()]))
        );
    }

    #[test]
    fn test_map_serializes_with_snake_case_keys() {
        let mut elements = Elements::new();
        elements.insert(ElementCategory::AnimeTitle, "Anime");
        elements.insert(ElementCategory::EpisodeNumber, "05");
        let json = serde_json::to_value(elements.into_map()).unwrap();
        assert_eq!(json["anime_title"], "Anime");
        assert_eq!(json["episode_number"], "05");
    }

    #[test]
    fn test_searchable_allow_list() {
        assert!(ElementCategory::VideoResolution.is_searchable());
        assert!(ElementCategory::ReleaseGroup.is_searchable());
        assert!(!ElementCategory::EpisodeNumber.is_searchable());
        assert!(!ElementCategory::AnimeTitle.is_searchable());
        assert!(!ElementCategory::AnimeYear.is_searchable());
    }

    #[test]
    fn test_cardinality_rules() {
        assert!(!ElementCategory::EpisodeNumber.is_singular());
        assert!(!ElementCategory::AnimeSeason.is_singular());
        assert!(ElementCategory::EpisodeNumberAlt.is_singular());
        assert!(ElementCategory::AnimeTitle.is_singular());
        assert!(ElementCategory::VolumeNumber.is_singular());
    }
}
