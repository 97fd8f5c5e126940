use rollmenu::{Row, grouped_rows};

mod common;
use common::{flag, num, roster, table, txt};

fn group(label: &str) -> Row {
    Row::Group {
        label: label.to_string(),
    }
}

fn item(text: &str) -> Row {
    Row::Item {
        text: text.to_string(),
    }
}

#[test]
fn unknown_display_column_yields_empty_sequence() {
    assert!(grouped_rows(&roster(), "Nope", None).is_empty());
    assert!(grouped_rows(&roster(), "Nope", Some("Team")).is_empty());
}

#[test]
fn ungrouped_preserves_original_order_and_drops_blank_display() {
    let rows = grouped_rows(&roster(), "Name", None);
    assert_eq!(rows, vec![item("Alice"), item("Bob"), item("Carol")]);
}

#[test]
fn grouped_orders_groups_and_items() {
    let rows = grouped_rows(&roster(), "Name", Some("Team"));
    assert_eq!(
        rows,
        vec![
            group("Blue"),
            item("Bob"),
            group("Red"),
            item("Alice"),
            item("Carol"),
        ]
    );
}

#[test]
fn blank_display_rows_never_appear_grouped() {
    let rows = grouped_rows(&roster(), "Name", Some("Team"));
    assert_eq!(rows.iter().filter(|r| matches!(r, Row::Item { .. })).count(), 3);
}

#[test]
fn group_labels_appear_once_per_distinct_value() {
    let rows = grouped_rows(&roster(), "Name", Some("Team"));
    let labels: Vec<&Row> = rows
        .iter()
        .filter(|r| matches!(r, Row::Group { .. }))
        .collect();
    assert_eq!(labels, vec![&group("Blue"), &group("Red")]);
}

#[test]
fn duplicate_records_each_emit_an_item() {
    let t = table(
        &["Name", "Team"],
        vec![
            vec![txt("Alice"), txt("Red")],
            vec![txt("Alice"), txt("Red")],
        ],
    );
    let rows = grouped_rows(&t, "Name", Some("Team"));
    assert_eq!(rows, vec![group("Red"), item("Alice"), item("Alice")]);
}

#[test]
fn items_within_a_group_sort_by_display_value() {
    let t = table(
        &["Name", "Team"],
        vec![
            vec![txt("Zoe"), txt("Red")],
            vec![txt("Amy"), txt("Red")],
        ],
    );
    let rows = grouped_rows(&t, "Name", Some("Team"));
    assert_eq!(rows, vec![group("Red"), item("Amy"), item("Zoe")]);
}

#[test]
fn group_column_equal_to_display_degrades_to_ungrouped() {
    let rows = grouped_rows(&roster(), "Name", Some("Name"));
    assert_eq!(rows, vec![item("Alice"), item("Bob"), item("Carol")]);
}

#[test]
fn unknown_group_column_degrades_to_ungrouped() {
    let rows = grouped_rows(&roster(), "Name", Some("Nope"));
    assert_eq!(rows, vec![item("Alice"), item("Bob"), item("Carol")]);
}

#[test]
fn empty_group_column_degrades_to_ungrouped() {
    let rows = grouped_rows(&roster(), "Name", Some(""));
    assert_eq!(rows, vec![item("Alice"), item("Bob"), item("Carol")]);
}

#[test]
fn records_without_group_value_are_dropped_when_grouped() {
    let t = table(
        &["Name", "Team"],
        vec![
            vec![txt("Alice"), txt("Red")],
            vec![txt("Bob"), None],
        ],
    );
    let rows = grouped_rows(&t, "Name", Some("Team"));
    assert_eq!(rows, vec![group("Red"), item("Alice")]);
}

#[test]
fn numeric_groups_sort_numerically() {
    let t = table(
        &["Name", "Rank"],
        vec![
            vec![txt("Alice"), num(10.0)],
            vec![txt("Bob"), num(2.0)],
        ],
    );
    let rows = grouped_rows(&t, "Name", Some("Rank"));
    assert_eq!(
        rows,
        vec![group("2"), item("Bob"), group("10"), item("Alice")]
    );
}

#[test]
fn whole_numbers_render_without_fraction() {
    let t = table(
        &["Score", "Team"],
        vec![
            vec![num(3.0), txt("Red")],
            vec![num(2.5), txt("Red")],
        ],
    );
    let rows = grouped_rows(&t, "Score", None);
    assert_eq!(rows, vec![item("3"), item("2.5")]);
}

#[test]
fn boolean_values_render_as_words() {
    let t = table(
        &["Active", "Team"],
        vec![vec![flag(true), txt("Red")], vec![flag(false), txt("Red")]],
    );
    let rows = grouped_rows(&t, "Active", None);
    assert_eq!(rows, vec![item("true"), item("false")]);
}
