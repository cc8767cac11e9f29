//! Presentation-facing controller over a [`NoteStore`].
//!
//! # Responsibility
//! - Track selection, active tag filter and search term.
//! - Route editor submits to create or update and keep selection coherent.
//!
//! # Invariants
//! - Selection never points at a deleted note.
//! - Changing the tag filter clears the selection.
//! - Drafts with empty title and body are never saved.

use crate::clock::{Clock, SystemClock};
use crate::model::note::{Note, NoteDraft, NoteId};
use crate::repo::slot_repo::SlotRepository;
use crate::search::view::{tag_suggestions, TagFilter};
use crate::service::note_store::NoteStore;

/// UI session state around one note store.
pub struct NotesSession<R: SlotRepository, C: Clock = SystemClock> {
    store: NoteStore<R, C>,
    selected: Option<NoteId>,
    tag_filter: TagFilter,
    search: String,
}

impl<R: SlotRepository, C: Clock> NotesSession<R, C> {
    pub fn new(store: NoteStore<R, C>) -> Self {
        Self {
            store,
            selected: None,
            tag_filter: TagFilter::All,
            search: String::new(),
        }
    }

    /// Saves an editor submit.
    ///
    /// `editing` is the id of the note being edited, `None` for a new note.
    /// Returns the saved note and selects it; returns `None` when the draft is
    /// not submittable or `editing` no longer exists.
    pub fn save(&mut self, draft: NoteDraft, editing: Option<&NoteId>) -> Option<Note> {
        if !draft.is_submittable() {
            return None;
        }

        let saved = match editing {
            Some(id) => self.store.update(id, draft).into_note()?,
            None => self.store.create(draft),
        };
        self.selected = Some(saved.id.clone());
        Some(saved)
    }

    /// Deletes note `id`, clearing the selection if it pointed there.
    pub fn delete(&mut self, id: &NoteId) -> bool {
        let removed = self.store.delete(id);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        removed
    }

    pub fn select(&mut self, id: NoteId) {
        self.selected = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn set_tag_filter(&mut self, filter: TagFilter) {
        self.tag_filter = filter;
        self.selected = None;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn tag_filter(&self) -> &TagFilter {
        &self.tag_filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Notes shown in the list for the current filter and search term.
    pub fn visible_notes(&self) -> Vec<&Note> {
        self.store.filtered_view(&self.tag_filter, &self.search)
    }

    pub fn tags(&self) -> Vec<String> {
        self.store.distinct_tags()
    }

    pub fn selected_id(&self) -> Option<&NoteId> {
        self.selected.as_ref()
    }

    /// Selected note, looked up in the full collection so a note hidden by
    /// the current filter still shows in the detail pane.
    pub fn selected_note(&self) -> Option<&Note> {
        self.selected.as_ref().and_then(|id| self.store.get(id))
    }

    /// Tag completions for the editor's tag input.
    pub fn tag_suggestions(&self, draft: &NoteDraft, input: &str) -> Vec<String> {
        tag_suggestions(&self.tags(), &draft.tags, input)
    }

    pub fn store(&self) -> &NoteStore<R, C> {
        &self.store
    }
}
