//! The mutable overlay configuration and its store.
//!
//! [`OverlayState`] is the full set of settings driving the control and
//! overlay pages. [`StateStore`] is the single serialized mutation point:
//! every read goes through [`StateStore::snapshot`], every write through
//! [`StateStore::apply`], and each effective write bumps a version counter
//! that connected overlays watch for staleness.

use crate::group_spec::parse_group_spec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::sync::Mutex;

/// The overlay settings, with wire-exact JSON field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayState {
    pub selected_column: String,
    pub text: String,
    #[serde(rename = "fontSize")]
    pub font_size: u32,
    pub color: String,
    #[serde(rename = "backgroundColor")]
    pub background_color: String,
    #[serde(rename = "backgroundOpacity")]
    pub background_opacity: f64,
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
    #[serde(rename = "textSegmentDuration")]
    pub text_segment_duration: f64,
    #[serde(rename = "groupByColumn")]
    pub group_by_column: String,
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

impl OverlayState {
    /// The startup defaults, displaying `selected_column`.
    pub fn new(selected_column: impl Into<String>) -> OverlayState {
        OverlayState {
            selected_column: selected_column.into(),
            text: "place holder".to_string(),
            font_size: 36,
            color: "#ffffff".to_string(),
            background_color: "#000000".to_string(),
            background_opacity: 0.4,
            container_width: 600,
            container_height: 300,
            scroll_speed: 30.0,
            list_font_size: 24,
            list_color: "#ffffff".to_string(),
            text_segment_duration: 5.0,
            group_by_column: String::new(),
            text_font_family: "system".to_string(),
            text_font_weight: 400,
            list_font_family: "system".to_string(),
            list_font_weight: 400,
            border_radius: 4,
        }
    }
}

/// Update keys recognized by [`StateStore::apply`], in application order.
///
/// `selected_column` is applied before `groupByColumn` so a grouping spec
/// arriving in the same update is normalized against the new display column.
const ALLOWED_KEYS: [&str; 18] = [
    "text",
    "fontSize",
    "color",
    "backgroundColor",
    "backgroundOpacity",
    "selected_column",
    "containerWidth",
    "containerHeight",
    "scrollSpeed",
    "listFontSize",
    "listColor",
    "textSegmentDuration",
    "groupByColumn",
    "textFontFamily",
    "textFontWeight",
    "listFontFamily",
    "listFontWeight",
    "borderRadius",
];

struct Versioned {
    state: OverlayState,
    version: u64,
}

/// The single mutable configuration store.
///
/// State and version counter live behind one mutex so readers never observe
/// a half-applied update and concurrent updates never lose an increment.
pub struct StateStore {
    columns: Vec<String>,
    inner: Mutex<Versioned>,
}

impl StateStore {
    /// Create the store for a dataset with the given columns; the first
    /// column becomes the initial display column.
    pub fn new(columns: Vec<String>) -> StateStore {
        let selected = columns.first().cloned().unwrap_or_default();
        StateStore {
            columns,
            inner: Mutex::new(Versioned {
                state: OverlayState::new(selected),
                version: 0,
            }),
        }
    }

    /// A consistent copy of the current state.
    pub fn snapshot(&self) -> OverlayState {
        self.lock().state.clone()
    }

    /// The current version counter.
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// Apply a partial update.
    ///
    /// Recognized keys are applied independently; unrecognized keys and
    /// values of the wrong type are silently ignored. `selected_column` must
    /// name a dataset column; accepting it clears `groupByColumn` when the
    /// stored spec string equals the new display column. `groupByColumn` is
    /// trimmed, parsed, and re-joined into canonical `A+B` form before the
    /// differs check. The version counter increments by exactly one when at
    /// least one key actually changed a value.
    pub fn apply(&self, partial: &Map<String, JsonValue>) -> (OverlayState, bool) {
        let mut inner = self.lock();
        let mut changed = false;

        for key in ALLOWED_KEYS {
            let Some(value) = partial.get(key) else {
                continue;
            };
            let state = &mut inner.state;
            match key {
                "selected_column" => {
                    if let Some(proposed) = value.as_str()
                        && self.columns.iter().any(|c| c == proposed)
                        && state.selected_column != proposed
                    {
                        state.selected_column = proposed.to_string();
                        changed = true;
                        if state.group_by_column == state.selected_column {
                            state.group_by_column.clear();
                        }
                    }
                }
                "groupByColumn" => {
                    let raw = match value {
                        JsonValue::Null => Some(""),
                        JsonValue::String(s) => Some(s.as_str()),
                        _ => None,
                    };
                    if let Some(raw) = raw {
                        let parsed = parse_group_spec(
                            raw.trim(),
                            &state.selected_column,
                            &self.columns,
                        );
                        let canonical = parsed.join("+");
                        if state.group_by_column != canonical {
                            state.group_by_column = canonical;
                            changed = true;
                        }
                    }
                }
                "text" => set_string(&mut state.text, value, &mut changed),
                "fontSize" => set_u32(&mut state.font_size, value, &mut changed),
                "color" => set_string(&mut state.color, value, &mut changed),
                "backgroundColor" => set_string(&mut state.background_color, value, &mut changed),
                "backgroundOpacity" => {
                    set_f64(&mut state.background_opacity, value, &mut changed)
                }
                "containerWidth" => set_u32(&mut state.container_width, value, &mut changed),
                "containerHeight" => set_u32(&mut state.container_height, value, &mut changed),
                "scrollSpeed" => set_f64(&mut state.scroll_speed, value, &mut changed),
                "listFontSize" => set_u32(&mut state.list_font_size, value, &mut changed),
                "listColor" => set_string(&mut state.list_color, value, &mut changed),
                "textSegmentDuration" => {
                    set_f64(&mut state.text_segment_duration, value, &mut changed)
                }
                "textFontFamily" => set_string(&mut state.text_font_family, value, &mut changed),
                "textFontWeight" => set_u32(&mut state.text_font_weight, value, &mut changed),
                "listFontFamily" => set_string(&mut state.list_font_family, value, &mut changed),
                "listFontWeight" => set_u32(&mut state.list_font_weight, value, &mut changed),
                "borderRadius" => set_u32(&mut state.border_radius, value, &mut changed),
                _ => {}
            }
        }

        if changed {
            inner.version += 1;
        }
        (inner.state.clone(), changed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Versioned> {
        // A poisoned guard still holds a consistent snapshot.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn set_string(field: &mut String, value: &JsonValue, changed: &mut bool) {
    if let Some(s) = value.as_str()
        && field.as_str() != s
    {
        *field = s.to_string();
        *changed = true;
    }
}

fn set_u32(field: &mut u32, value: &JsonValue, changed: &mut bool) {
    if let Some(n) = value.as_u64()
        && let Ok(n) = u32::try_from(n)
        && *field != n
    {
        *field = n;
        *changed = true;
    }
}

fn set_f64(field: &mut f64, value: &JsonValue, changed: &mut bool) {
    if let Some(n) = value.as_f64()
        && *field != n
    {
        *field = n;
        *changed = true;
    }
}
