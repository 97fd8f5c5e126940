//! Overlay payload assembly.
//!
//! [`assemble`] composes the projected rows with every visual setting into
//! the single response the overlay page consumes per refresh. It is a pure
//! function of the table and a state snapshot.

use crate::group_spec::parse_group_spec;
use crate::rows::{Row, grouped_rows};
use crate::state::OverlayState;
use crate::table::Table;
use serde::Serialize;

/// Everything the overlay page needs for one refresh.
#[derive(Debug, Clone, Serialize)]
pub struct OverlayPayload {
    pub selected_column: String,
    #[serde(rename = "groupByColumn")]
    pub group_by_column: String,
    pub rows: Vec<Row>,
    #[serde(rename = "containerWidth")]
    pub container_width: u32,
    #[serde(rename = "containerHeight")]
    pub container_height: u32,
    #[serde(rename = "scrollSpeed")]
    pub scroll_speed: f64,
    #[serde(rename = "listFontSize")]
    pub list_font_size: u32,
    #[serde(rename = "listColor")]
    pub list_color: String,
    pub text: String,
    #[serde(rename = "fontSize")]
    pub font_size: u32,
    pub color: String,
    #[serde(rename = "backgroundColor")]
    pub background_color: String,
    #[serde(rename = "backgroundOpacity")]
    pub background_opacity: f64,
    #[serde(rename = "textSegmentDuration")]
    pub text_segment_duration: f64,
    #[serde(rename = "textFontFamily")]
    pub text_font_family: String,
    #[serde(rename = "textFontWeight")]
    pub text_font_weight: u32,
    #[serde(rename = "listFontFamily")]
    pub list_font_family: String,
    #[serde(rename = "listFontWeight")]
    pub list_font_weight: u32,
    #[serde(rename = "borderRadius")]
    pub border_radius: u32,
}

/// Build the overlay payload for a state snapshot.
///
/// The stored grouping spec is re-parsed against the current display
/// column; each grouping column contributes one projected section, in spec
/// order, with repeated columns skipped. An empty spec falls back to the
/// ungrouped projection.
pub fn assemble(table: &Table, state: &OverlayState) -> OverlayPayload {
    let group_cols = parse_group_spec(
        &state.group_by_column,
        &state.selected_column,
        table.columns(),
    );

    let rows: Vec<Row> = if group_cols.is_empty() {
        grouped_rows(table, &state.selected_column, None)
    } else {
        let mut rows = Vec::new();
        let mut used: Vec<&str> = Vec::new();
        for group_col in &group_cols {
            if used.contains(&group_col.as_str()) {
                continue;
            }
            used.push(group_col);
            rows.extend(grouped_rows(table, &state.selected_column, Some(group_col)));
        }
        rows
    };

    OverlayPayload {
        selected_column: state.selected_column.clone(),
        group_by_column: state.group_by_column.clone(),
        rows,
        container_width: state.container_width,
        container_height: state.container_height,
        scroll_speed: state.scroll_speed,
        list_font_size: state.list_font_size,
        list_color: state.list_color.clone(),
        text: state.text.clone(),
        font_size: state.font_size,
        color: state.color.clone(),
        background_color: state.background_color.clone(),
        background_opacity: state.background_opacity,
        text_segment_duration: state.text_segment_duration,
        text_font_family: state.text_font_family.clone(),
        text_font_weight: state.text_font_weight,
        list_font_family: state.list_font_family.clone(),
        list_font_weight: state.list_font_weight,
        border_radius: state.border_radius,
    }
}
