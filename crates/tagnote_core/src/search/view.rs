//! Pure derivations computed from a note snapshot.
//!
//! # Invariants
//! - Tag filter applies before text search.
//! - Results are ordered by `updated_at` descending; ties keep collection order.
//! - The tag list always starts with [`ALL_TAGS_LABEL`].

use crate::model::note::Note;
use std::collections::HashSet;

/// Sentinel label that disables tag filtering.
pub const ALL_TAGS_LABEL: &str = "All";

/// Maximum number of tag suggestions offered while typing.
pub const MAX_TAG_SUGGESTIONS: usize = 3;

/// Tag filter selected in the sidebar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagFilter {
    #[default]
    All,
    Tag(String),
}

impl TagFilter {
    /// Maps a sidebar label to a filter; `"All"` selects every note.
    pub fn from_label(label: &str) -> Self {
        if label == ALL_TAGS_LABEL {
            Self::All
        } else {
            Self::Tag(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL_TAGS_LABEL,
            Self::Tag(tag) => tag.as_str(),
        }
    }

    pub fn matches(&self, note: &Note) -> bool {
        match self {
            Self::All => true,
            Self::Tag(tag) => note.has_tag(tag),
        }
    }
}

/// Returns notes matching `tag_filter` and `search_term`, most recent first.
///
/// A term that is blank after trimming disables text search. Otherwise the
/// term (untrimmed) is matched case-insensitively as a substring of either
/// title or body.
pub fn filtered_view<'a>(
    notes: &'a [Note],
    tag_filter: &TagFilter,
    search_term: &str,
) -> Vec<&'a Note> {
    let needle = if search_term.trim().is_empty() {
        None
    } else {
        Some(search_term.to_lowercase())
    };

    let mut matched: Vec<&Note> = notes
        .iter()
        .filter(|note| tag_filter.matches(note))
        .filter(|note| match needle.as_deref() {
            Some(needle) => text_matches(note, needle),
            None => true,
        })
        .collect();

    // `sort_by` is stable, so equal timestamps keep collection order.
    matched.sort_by(|left, right| right.sort_timestamp().cmp(&left.sort_timestamp()));
    matched
}

/// Returns `"All"` followed by each referenced tag once, in first-appearance
/// order across the collection.
pub fn distinct_tags(notes: &[Note]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags = vec![ALL_TAGS_LABEL.to_string()];
    for tag in notes.iter().flat_map(|note| note.tags.iter()) {
        if seen.insert(tag.as_str()) {
            tags.push(tag.clone());
        }
    }
    tags
}

/// Suggests known tags for the tag input of a draft.
///
/// A candidate qualifies when it is not the `All` sentinel, not already on the
/// draft, and its lowercase form starts with the lowercase input without being
/// equal to it. At most [`MAX_TAG_SUGGESTIONS`] are returned, in `known_tags`
/// order.
pub fn tag_suggestions(known_tags: &[String], draft_tags: &[String], input: &str) -> Vec<String> {
    let prefix = input.to_lowercase();
    known_tags
        .iter()
        .filter(|tag| tag.as_str() != ALL_TAGS_LABEL)
        .filter(|tag| !draft_tags.contains(tag))
        .filter(|tag| {
            let lowered = tag.to_lowercase();
            lowered.starts_with(&prefix) && lowered != prefix
        })
        .take(MAX_TAG_SUGGESTIONS)
        .cloned()
        .collect()
}

fn text_matches(note: &Note, needle: &str) -> bool {
    note.title.to_lowercase().contains(needle) || note.body.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::{distinct_tags, filtered_view, tag_suggestions, TagFilter, ALL_TAGS_LABEL};
    use crate::model::note::{Note, NoteId};

    fn note(id: &str, title: &str, body: &str, tags: &[&str], updated_at: Option<i64>) -> Note {
        Note {
            id: NoteId::from(id),
            title: title.to_string(),
            body: body.to_string(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            updated_at,
        }
    }

    fn ids(notes: &[&Note]) -> Vec<String> {
        notes.iter().map(|note| note.id.to_string()).collect()
    }

    #[test]
    fn all_filter_sorts_by_recency_with_missing_timestamps_last() {
        let notes = vec![
            note("old", "", "", &[], Some(10)),
            note("none", "", "", &[], None),
            note("new", "", "", &[], Some(30)),
        ];
        let view = filtered_view(&notes, &TagFilter::All, "");
        assert_eq!(ids(&view), vec!["new", "old", "none"]);
    }

    #[test]
    fn equal_timestamps_keep_collection_order() {
        let notes = vec![
            note("a", "", "", &[], Some(5)),
            note("b", "", "", &[], Some(5)),
            note("c", "", "", &[], Some(5)),
        ];
        let view = filtered_view(&notes, &TagFilter::All, "");
        assert_eq!(ids(&view), vec!["a", "b", "c"]);
    }

    #[test]
    fn tag_filter_is_exact_and_case_sensitive() {
        let notes = vec![
            note("w", "", "", &["Work"], Some(1)),
            note("lw", "", "", &["work"], Some(2)),
        ];
        let view = filtered_view(&notes, &TagFilter::Tag("Work".to_string()), "");
        assert_eq!(ids(&view), vec!["w"]);
    }

    #[test]
    fn search_matches_title_or_body_case_insensitively() {
        let notes = vec![
            note("title", "FLIGHT plan", "", &[], Some(1)),
            note("body", "Trip", "book Flights", &[], Some(2)),
            note("miss", "Groceries", "milk", &[], Some(3)),
        ];
        let view = filtered_view(&notes, &TagFilter::All, "flight");
        assert_eq!(ids(&view), vec!["body", "title"]);
    }

    #[test]
    fn blank_search_term_is_ignored() {
        let notes = vec![note("a", "x", "y", &[], Some(1))];
        assert_eq!(filtered_view(&notes, &TagFilter::All, "   ").len(), 1);
    }

    #[test]
    fn search_term_whitespace_is_significant_once_non_blank() {
        let notes = vec![
            note("joined", "book flights", "", &[], Some(1)),
            note("split", "book", "", &[], Some(2)),
        ];
        let view = filtered_view(&notes, &TagFilter::All, "book ");
        assert_eq!(ids(&view), vec!["joined"]);
    }

    #[test]
    fn tag_filter_applies_before_search() {
        let notes = vec![
            note("work", "report", "", &["Work"], Some(1)),
            note("home", "report", "", &["Personal"], Some(2)),
        ];
        let view = filtered_view(&notes, &TagFilter::Tag("Work".to_string()), "REPORT");
        assert_eq!(ids(&view), vec!["work"]);
    }

    #[test]
    fn distinct_tags_uses_first_appearance_order() {
        let notes = vec![
            note("a", "", "", &["Work", "Ideas"], None),
            note("b", "", "", &["Personal", "Work"], None),
        ];
        assert_eq!(
            distinct_tags(&notes),
            vec!["All", "Work", "Ideas", "Personal"]
        );
        assert_eq!(distinct_tags(&[]), vec![ALL_TAGS_LABEL]);
    }

    #[test]
    fn filter_label_round_trip() {
        assert_eq!(TagFilter::from_label("All"), TagFilter::All);
        assert_eq!(TagFilter::from_label("Work").label(), "Work");
    }

    #[test]
    fn suggestions_skip_sentinel_existing_and_exact_matches() {
        let known: Vec<String> = ["All", "Work", "Workout", "Weekend", "Wishlist", "Ideas"]
            .iter()
            .map(|tag| tag.to_string())
            .collect();
        let on_draft = vec!["Weekend".to_string()];

        assert_eq!(
            tag_suggestions(&known, &on_draft, "w"),
            vec!["Work", "Workout", "Wishlist"]
        );
        assert_eq!(tag_suggestions(&known, &on_draft, "work"), vec!["Workout"]);
        assert!(tag_suggestions(&known, &on_draft, "zzz").is_empty());
    }
}
