//! Voice catalogue helpers: default selection, filter options and filtering.

use crate::model::{Voice, DEFAULT_VOICE_ID};
use std::collections::BTreeSet;

pub const GENDERS: [&str; 3] = ["male", "female", "neutral"];
pub const CATEGORIES: [&str; 4] = ["premade", "cloned", "generated", "professional"];

/// The default voice if the catalogue has it, otherwise the first voice.
pub fn default_voice(voices: &[Voice]) -> Option<&Voice> {
    voices
        .iter()
        .find(|v| v.id == DEFAULT_VOICE_ID)
        .or_else(|| voices.first())
}

/// Sorted distinct non-empty accents.
pub fn accent_options(voices: &[Voice]) -> Vec<String> {
    voices
        .iter()
        .map(|v| v.accent.as_str())
        .filter(|a| !a.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Criteria for narrowing the catalogue. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceFilter {
    pub search: String,
    pub gender: Option<String>,
    pub category: Option<String>,
    pub accent: Option<String>,
    pub favorites_only: bool,
}

impl VoiceFilter {
    pub fn matches(&self, voice: &Voice, favorites: &BTreeSet<String>) -> bool {
        if self.favorites_only && !favorites.contains(&voice.id) {
            return false;
        }
        if self.gender.as_deref().is_some_and(|g| voice.gender != g) {
            return false;
        }
        if self.category.as_deref().is_some_and(|c| voice.category != c) {
            return false;
        }
        if self.accent.as_deref().is_some_and(|a| voice.accent != a) {
            return false;
        }
        let q = self.search.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        voice.name.to_lowercase().contains(&q)
            || voice.description.to_lowercase().contains(&q)
            || voice.accent.to_lowercase().contains(&q)
    }

    pub fn apply<'a>(&self, voices: &'a [Voice], favorites: &BTreeSet<String>) -> Vec<&'a Voice> {
        voices.iter().filter(|v| self.matches(v, favorites)).collect()
    }
}

/// Step through `None` followed by each option, wrapping around.
pub fn cycle_option(current: &Option<String>, options: &[String]) -> Option<String> {
    match current {
        None => options.first().cloned(),
        Some(cur) => options
            .iter()
            .position(|o| o == cur)
            .and_then(|i| options.get(i + 1))
            .cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(id: &str, name: &str, gender: &str, category: &str, accent: &str, description: &str) -> Voice {
        Voice {
            id: id.into(),
            name: name.into(),
            gender: gender.into(),
            category: category.into(),
            accent: accent.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    fn catalogue() -> Vec<Voice> {
        vec![
            voice("a", "Adam", "male", "premade", "american", "deep"),
            voice(DEFAULT_VOICE_ID, "Rachel", "female", "premade", "american", "calm"),
            voice("c", "Charlotte", "female", "generated", "swedish", "seductive"),
            voice("d", "Dave", "male", "cloned", "british", "conversational"),
            voice("e", "Echo", "neutral", "professional", "", "robotic"),
        ]
    }

    #[test]
    fn default_voice_prefers_known_id() {
        let voices = catalogue();
        assert_eq!(default_voice(&voices).unwrap().name, "Rachel");
        assert_eq!(default_voice(&voices[2..]).unwrap().name, "Charlotte");
        assert!(default_voice(&[]).is_none());
    }

    #[test]
    fn accents_are_sorted_and_distinct() {
        assert_eq!(accent_options(&catalogue()), vec!["american", "british", "swedish"]);
    }

    #[test]
    fn filters_combine() {
        let voices = catalogue();
        let none = BTreeSet::new();
        let f = VoiceFilter {
            gender: Some("female".into()),
            accent: Some("american".into()),
            ..Default::default()
        };
        let names: Vec<_> = f.apply(&voices, &none).iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Rachel"]);

        let f = VoiceFilter {
            category: Some("cloned".into()),
            ..Default::default()
        };
        assert_eq!(f.apply(&voices, &none).len(), 1);
    }

    #[test]
    fn search_is_case_insensitive_over_name_description_accent() {
        let voices = catalogue();
        let none = BTreeSet::new();
        for (q, expect) in [("RACH", "Rachel"), ("robot", "Echo"), ("Swed", "Charlotte")] {
            let f = VoiceFilter {
                search: q.into(),
                ..Default::default()
            };
            let hits = f.apply(&voices, &none);
            assert_eq!(hits.len(), 1, "query {q}");
            assert_eq!(hits[0].name, expect);
        }
    }

    #[test]
    fn favorites_only_uses_favorite_set() {
        let voices = catalogue();
        let favs: BTreeSet<String> = ["d".to_string()].into_iter().collect();
        let f = VoiceFilter {
            favorites_only: true,
            ..Default::default()
        };
        let hits = f.apply(&voices, &favs);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "d");
    }

    #[test]
    fn cycling_wraps_through_all() {
        let opts = vec!["a".to_string(), "b".to_string()];
        let mut cur = None;
        cur = cycle_option(&cur, &opts);
        assert_eq!(cur.as_deref(), Some("a"));
        cur = cycle_option(&cur, &opts);
        assert_eq!(cur.as_deref(), Some("b"));
        cur = cycle_option(&cur, &opts);
        assert_eq!(cur, None);
    }
}
