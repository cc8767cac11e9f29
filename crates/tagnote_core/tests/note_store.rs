use std::collections::HashSet;
use tagnote_core::{
    ManualClock, MemorySlotRepository, NoteDraft, NoteId, NoteStore, SlotRepository, TagFilter,
    UpdateOutcome, DEFAULT_NOTES_SLOT,
};

const START_MS: i64 = 1_700_000_000_000;

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn store_with_clock(repo: MemorySlotRepository) -> (NoteStore<MemorySlotRepository, ManualClock>, ManualClock) {
    let clock = ManualClock::new(START_MS);
    let store = NoteStore::load_with(repo, clock.clone(), DEFAULT_NOTES_SLOT);
    (store, clock)
}

fn seeded_repo() -> MemorySlotRepository {
    MemorySlotRepository::with_slot(
        DEFAULT_NOTES_SLOT,
        r#"[{"id":"n1","title":"Old Title","body":"old","tags":["Work"],"updatedAt":1000}]"#,
    )
}

#[test]
fn create_into_empty_store_assigns_id_timestamp_and_tags() {
    let (mut store, _clock) = store_with_clock(MemorySlotRepository::new());

    let note = store.create(NoteDraft::new("Groceries", "Milk, eggs", tags(&["Personal"])));

    assert_eq!(store.len(), 1);
    assert_eq!(note.title, "Groceries");
    assert_eq!(note.body, "Milk, eggs");
    assert_eq!(note.tags, tags(&["Personal"]));
    assert_eq!(note.updated_at, Some(START_MS));
    assert!(!note.id.as_str().is_empty());
    assert_eq!(store.distinct_tags(), vec!["All", "Personal"]);
}

#[test]
fn tag_filter_returns_only_matching_notes() {
    let (mut store, clock) = store_with_clock(MemorySlotRepository::new());
    let work = store.create(NoteDraft::new("Report", "", tags(&["Work"])));
    clock.advance(10);
    store.create(NoteDraft::new("Gym", "", tags(&["Personal"])));

    let view = store.filtered_view(&TagFilter::Tag("Work".to_string()), "");
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id, work.id);
}

#[test]
fn search_matches_body_case_insensitively() {
    let (mut store, _clock) = store_with_clock(MemorySlotRepository::new());
    let trip = store.create(NoteDraft::new("Trip Plan", "Book flights", Vec::new()));
    store.create(NoteDraft::new("Groceries", "Milk", Vec::new()));

    let view = store.filtered_view(&TagFilter::All, "flight");
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id, trip.id);
}

#[test]
fn update_keeps_id_and_advances_timestamp() {
    let (mut store, clock) = store_with_clock(seeded_repo());
    let id = NoteId::from("n1");
    clock.advance(1);

    let outcome = store.update(&id, NoteDraft::new("New Title", "", Vec::new()));

    let UpdateOutcome::Updated(note) = outcome else {
        panic!("n1 should exist");
    };
    assert_eq!(note.id, id);
    assert_eq!(note.title, "New Title");
    assert!(note.tags.is_empty());
    assert!(note.updated_at.unwrap() > 1000);
    assert_eq!(store.get(&id).unwrap().title, "New Title");
}

#[test]
fn update_strictly_increases_timestamp_even_when_clock_stalls() {
    let (mut store, _clock) = store_with_clock(MemorySlotRepository::new());
    let created = store.create(NoteDraft::new("a", "", Vec::new()));

    let first = store
        .update(&created.id, NoteDraft::new("b", "", Vec::new()))
        .into_note()
        .unwrap();
    let second = store
        .update(&created.id, NoteDraft::new("c", "", Vec::new()))
        .into_note()
        .unwrap();

    assert!(first.updated_at > created.updated_at);
    assert!(second.updated_at > first.updated_at);
}

#[test]
fn update_unknown_id_reports_not_found_without_writing() {
    let repo = MemorySlotRepository::new();
    let (mut store, _clock) = store_with_clock(repo.clone());

    let outcome = store.update(&NoteId::from("missing"), NoteDraft::new("x", "", Vec::new()));

    assert_eq!(outcome, UpdateOutcome::NotFound);
    assert_eq!(repo.read_slot(DEFAULT_NOTES_SLOT).unwrap(), None);
}

#[test]
fn delete_removes_note_and_second_delete_is_noop() {
    let repo = seeded_repo();
    let (mut store, _clock) = store_with_clock(repo.clone());
    let id = NoteId::from("n1");

    assert!(store.delete(&id));
    assert!(store.get(&id).is_none());
    assert_eq!(repo.read_slot(DEFAULT_NOTES_SLOT).unwrap().as_deref(), Some("[]"));

    assert!(!store.delete(&id));
    assert!(store.is_empty());
}

#[test]
fn corrupted_slot_loads_as_empty_collection() {
    let repo = MemorySlotRepository::with_slot(DEFAULT_NOTES_SLOT, "{not json");
    let (store, _clock) = store_with_clock(repo);
    assert!(store.is_empty());
    assert_eq!(store.distinct_tags(), vec!["All"]);
}

#[test]
fn non_array_slot_loads_as_empty_and_is_overwritten_by_next_mutation() {
    let repo = MemorySlotRepository::with_slot(DEFAULT_NOTES_SLOT, r#"{"notes":[]}"#);
    let (mut store, _clock) = store_with_clock(repo.clone());
    assert!(store.is_empty());

    store.create(NoteDraft::new("fresh", "", Vec::new()));
    let raw = repo.read_slot(DEFAULT_NOTES_SLOT).unwrap().unwrap();
    assert!(raw.starts_with('['));
}

#[test]
fn replay_from_persisted_state_matches_live_collection() {
    let repo = MemorySlotRepository::new();
    let (mut store, clock) = store_with_clock(repo.clone());

    let a = store.create(NoteDraft::new("a", "alpha", tags(&["Work", "Ideas"])));
    clock.advance(5);
    let b = store.create(NoteDraft::new("b", "beta", Vec::new()));
    clock.advance(5);
    store.update(&a.id, NoteDraft::new("a2", "alpha two", tags(&["Ideas"])));
    store.create(NoteDraft::new("", "body only", tags(&["Personal"])));
    store.delete(&b.id);

    let (reloaded, _clock) = store_with_clock(repo);
    assert_eq!(reloaded.notes(), store.notes());
}

#[test]
fn created_ids_are_unique() {
    let (mut store, _clock) = store_with_clock(MemorySlotRepository::new());
    for idx in 0..50 {
        store.create(NoteDraft::new(format!("note {idx}"), "", Vec::new()));
    }

    let ids: HashSet<_> = store.notes().iter().map(|note| note.id.clone()).collect();
    assert_eq!(ids.len(), 50);
}

#[test]
fn create_drops_blank_and_duplicate_tags() {
    let (mut store, _clock) = store_with_clock(MemorySlotRepository::new());
    let note = store.create(NoteDraft::new("t", "", tags(&["Work", "", "Work", "Ideas"])));
    assert_eq!(note.tags, tags(&["Work", "Ideas"]));
}

#[test]
fn all_view_is_sorted_by_recency() {
    let (mut store, clock) = store_with_clock(MemorySlotRepository::new());
    let first = store.create(NoteDraft::new("first", "", Vec::new()));
    clock.advance(10);
    let second = store.create(NoteDraft::new("second", "", Vec::new()));
    clock.advance(10);
    store.update(&first.id, NoteDraft::new("first edited", "", Vec::new()));

    let view = store.filtered_view(&TagFilter::All, "");
    let order: Vec<_> = view.iter().map(|note| note.id.clone()).collect();
    assert_eq!(order, vec![first.id, second.id]);
}

#[test]
fn distinct_tags_lists_shared_tags_once() {
    let (mut store, _clock) = store_with_clock(MemorySlotRepository::new());
    store.create(NoteDraft::new("a", "", tags(&["Work"])));
    store.create(NoteDraft::new("b", "", tags(&["Work", "Ideas"])));
    store.create(NoteDraft::new("c", "", tags(&["Ideas"])));

    let listed = store.distinct_tags();
    assert_eq!(listed[0], "All");
    assert_eq!(listed.len(), 3);
    assert!(listed.contains(&"Work".to_string()));
    assert!(listed.contains(&"Ideas".to_string()));
}

#[test]
fn legacy_note_shapes_survive_load_and_next_mutation() {
    let repo = MemorySlotRepository::with_slot(
        DEFAULT_NOTES_SLOT,
        r#"[
            {"id":"n1","title":"Report","body":"","tags":["Work"],"updatedAt":1000},
            {"id":"n2","title":"Gym","body":"legs","tags":null},
            {"id":"n3","title":"Float","body":"","tags":[],"updatedAt":1700000000000.0}
        ]"#,
    );
    let (mut store, _clock) = store_with_clock(repo.clone());

    assert_eq!(store.len(), 3);
    assert!(store.get(&NoteId::from("n2")).unwrap().tags.is_empty());
    assert_eq!(
        store.get(&NoteId::from("n3")).unwrap().updated_at,
        Some(1_700_000_000_000)
    );

    store.create(NoteDraft::new("new", "", Vec::new()));

    let (reloaded, _clock) = store_with_clock(repo);
    assert_eq!(reloaded.len(), 4);
    for id in ["n1", "n2", "n3"] {
        assert!(reloaded.get(&NoteId::from(id)).is_some(), "{id} should persist");
    }
}
