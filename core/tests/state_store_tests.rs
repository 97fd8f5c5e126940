use rollmenu::StateStore;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::thread;

fn obj(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("update body is an object")
}

fn store() -> StateStore {
    StateStore::new(vec![
        "Name".to_string(),
        "Team".to_string(),
        "Role".to_string(),
    ])
}

#[test]
fn defaults_select_the_first_column() {
    let store = store();
    let state = store.snapshot();
    assert_eq!(state.selected_column, "Name");
    assert_eq!(state.group_by_column, "");
    assert_eq!(state.font_size, 36);
    assert_eq!(store.version(), 0);
}

#[test]
fn noop_update_leaves_version_untouched() {
    let store = store();
    let (_, changed) = store.apply(&obj(json!({ "fontSize": 36, "color": "#ffffff" })));
    assert!(!changed);
    assert_eq!(store.version(), 0);
}

#[test]
fn effective_update_bumps_version_exactly_once() {
    let store = store();
    let (state, changed) = store.apply(&obj(json!({ "fontSize": 40, "color": "#ff0000" })));
    assert!(changed);
    assert_eq!(state.font_size, 40);
    assert_eq!(state.color, "#ff0000");
    assert_eq!(store.version(), 1);
}

#[test]
fn unrecognized_keys_are_ignored() {
    let store = store();
    let (_, changed) = store.apply(&obj(json!({ "bogus": 1, "alsoBogus": "x" })));
    assert!(!changed);
    assert_eq!(store.version(), 0);
}

#[test]
fn wrong_typed_values_are_dropped_per_key() {
    let store = store();
    let (state, changed) = store.apply(&obj(json!({
        "fontSize": "big",
        "text": 5,
        "scrollSpeed": "fast",
        "color": "#00ff00",
    })));
    assert!(changed);
    assert_eq!(state.font_size, 36);
    assert_eq!(state.text, "place holder");
    assert_eq!(state.scroll_speed, 30.0);
    assert_eq!(state.color, "#00ff00");
    assert_eq!(store.version(), 1);
}

#[test]
fn selected_column_must_name_a_dataset_column() {
    let store = store();
    let (state, changed) = store.apply(&obj(json!({ "selected_column": "Nope" })));
    assert!(!changed);
    assert_eq!(state.selected_column, "Name");
}

#[test]
fn reselecting_the_current_column_is_a_noop() {
    let store = store();
    let (_, changed) = store.apply(&obj(json!({ "selected_column": "Name" })));
    assert!(!changed);
    assert_eq!(store.version(), 0);
}

#[test]
fn group_spec_is_normalized_to_canonical_form() {
    let store = store();
    let (state, changed) = store.apply(&obj(json!({ "groupByColumn": " Team + Role " })));
    assert!(changed);
    assert_eq!(state.group_by_column, "Team+Role");
    assert_eq!(store.version(), 1);

    // Re-sending an equivalent spec changes nothing.
    let (_, changed) = store.apply(&obj(json!({ "groupByColumn": "Team+Role" })));
    assert!(!changed);
    assert_eq!(store.version(), 1);
}

#[test]
fn group_spec_duplicates_and_unknowns_are_filtered() {
    let store = store();
    let (state, _) = store.apply(&obj(json!({ "groupByColumn": "Team+Team+Nope" })));
    assert_eq!(state.group_by_column, "Team");
}

#[test]
fn null_group_spec_clears_grouping() {
    let store = store();
    store.apply(&obj(json!({ "groupByColumn": "Team" })));
    let (state, changed) = store.apply(&obj(json!({ "groupByColumn": null })));
    assert!(changed);
    assert_eq!(state.group_by_column, "");
}

#[test]
fn switching_display_column_clears_matching_group_spec_in_one_bump() {
    let store = store();
    store.apply(&obj(json!({ "groupByColumn": "Team" })));
    assert_eq!(store.version(), 1);

    let (state, changed) = store.apply(&obj(json!({ "selected_column": "Team" })));
    assert!(changed);
    assert_eq!(state.selected_column, "Team");
    assert_eq!(state.group_by_column, "");
    assert_eq!(store.version(), 2);
}

#[test]
fn switching_display_column_keeps_multi_term_group_spec() {
    // The clear rule compares the stored spec string against the new
    // display column; a two-term spec is left in place and re-filtered by
    // every reader at parse time.
    let store = store();
    store.apply(&obj(json!({ "groupByColumn": "Team+Role" })));

    let (state, changed) = store.apply(&obj(json!({ "selected_column": "Team" })));
    assert!(changed);
    assert_eq!(state.group_by_column, "Team+Role");
}

#[test]
fn group_spec_in_same_update_is_parsed_against_new_display_column() {
    let store = store();
    let (state, changed) = store.apply(&obj(json!({
        "selected_column": "Team",
        "groupByColumn": "Team+Role",
    })));
    assert!(changed);
    assert_eq!(state.selected_column, "Team");
    assert_eq!(state.group_by_column, "Role");
    assert_eq!(store.version(), 1);
}

#[test]
fn concurrent_updates_do_not_lose_increments() {
    let store = Arc::new(store());

    let first = {
        let store = store.clone();
        thread::spawn(move || {
            store.apply(&obj(json!({ "fontSize": 48 })));
        })
    };
    let second = {
        let store = store.clone();
        thread::spawn(move || {
            store.apply(&obj(json!({ "color": "#123456" })));
        })
    };
    first.join().expect("first updater");
    second.join().expect("second updater");

    assert_eq!(store.version(), 2);
    let state = store.snapshot();
    assert_eq!(state.font_size, 48);
    assert_eq!(state.color, "#123456");
}

#[test]
fn snapshots_round_trip_through_wire_json() {
    let store = store();
    let wire = serde_json::to_value(store.snapshot()).expect("serialize state");
    assert_eq!(wire["selected_column"], "Name");
    assert_eq!(wire["fontSize"], 36);
    assert_eq!(wire["backgroundOpacity"], 0.4);
    assert_eq!(wire["groupByColumn"], "");
    assert_eq!(wire["textSegmentDuration"], 5.0);
    assert_eq!(wire["borderRadius"], 4);
}
