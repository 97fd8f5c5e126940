//! Grouping specification parsing.

/// Parse a user-supplied grouping spec like `""`, `"B"`, or `"B+C"` into a
/// validated list of grouping columns.
///
/// Segments are split on `+` and trimmed. Empty, unknown, and duplicate
/// segments are dropped, as is the display column itself; the result is
/// capped at two columns. Invalid input degrades to a shorter or empty
/// list; this never fails.
pub fn parse_group_spec(spec: &str, selected: &str, columns: &[String]) -> Vec<String> {
    if spec.is_empty() {
        return Vec::new();
    }

    let mut result: Vec<String> = Vec::new();
    for part in spec.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        if part == selected {
            continue;
        }
        if !columns.iter().any(|c| c == part) {
            continue;
        }
        if result.iter().any(|c| c == part) {
            continue;
        }
        result.push(part.to_string());
        if result.len() >= 2 {
            break;
        }
    }
    result
}
