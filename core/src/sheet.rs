//! XML parsing for the source worksheet.
//!
//! Handles the workbook structure, relationship, and shared-string parts of
//! an `.xlsx` package, and converts the data sheet's XML into row-major
//! records of [`Value`]s.

use crate::table::Value;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SheetParseError {
    #[error("XML parse error: {0}")]
    Xml(String),
    #[error("invalid cell address: {0}")]
    InvalidAddress(String),
    #[error("shared string index {0} out of bounds")]
    SharedStringOutOfBounds(usize),
}

pub(crate) struct SheetRef {
    pub name: String,
    pub rel_id: Option<String>,
    pub sheet_id: Option<u32>,
}

pub(crate) fn parse_workbook_sheets(xml: &[u8]) -> Result<Vec<SheetRef>, SheetParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut rel_id = None;
                let mut sheet_id = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| SheetParseError::Xml(e.to_string()))?;
                    match attr.key.as_ref() {
                        b"name" => {
                            name = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned())
                        }
                        b"sheetId" => {
                            let parsed = attr.unescape_value().map_err(to_xml_err)?;
                            sheet_id = parsed.parse::<u32>().ok();
                        }
                        b"r:id" => {
                            rel_id = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned())
                        }
                        _ => {}
                    }
                }
                if let Some(name) = name {
                    sheets.push(SheetRef {
                        name,
                        rel_id,
                        sheet_id,
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SheetParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

pub(crate) fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, String>, SheetParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut map = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                let mut rel_type = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| SheetParseError::Xml(e.to_string()))?;
                    match attr.key.as_ref() {
                        b"Id" => id = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned()),
                        b"Target" => {
                            target = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned())
                        }
                        b"Type" => {
                            rel_type = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned())
                        }
                        _ => {}
                    }
                }

                if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type)
                    && rel_type.contains("worksheet")
                {
                    map.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SheetParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(map)
}

/// Resolve the archive path of a sheet's worksheet part, falling back to the
/// conventional `xl/worksheets/sheetN.xml` layout when relationships are
/// missing.
pub(crate) fn resolve_sheet_part(
    sheet: &SheetRef,
    relationships: &HashMap<String, String>,
    index: usize,
) -> String {
    if let Some(rel_id) = &sheet.rel_id
        && let Some(target) = relationships.get(rel_id)
    {
        return normalize_target(target);
    }

    let guessed = sheet
        .sheet_id
        .map(|id| format!("xl/worksheets/sheet{id}.xml"))
        .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", index + 1));
    normalize_target(&guessed)
}

fn normalize_target(target: &str) -> String {
    let trimmed = target.trim_start_matches('/');
    if trimmed.starts_with("xl/") {
        trimmed.to_string()
    } else {
        format!("xl/{trimmed}")
    }
}

pub(crate) fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>, SheetParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"si" => {
                current.clear();
                in_si = true;
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"t" && in_si => {
                let text = reader
                    .read_text(e.name())
                    .map_err(|e| SheetParseError::Xml(e.to_string()))?
                    .into_owned();
                current.push_str(&text);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"si" => {
                strings.push(current.clone());
                in_si = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SheetParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

/// Parse a worksheet part into dense row-major records.
///
/// Rows and columns that the sheet never mentions collapse to `None` cells;
/// the record grid covers the bounding rectangle of all addressed cells.
pub(crate) fn parse_sheet_records(
    xml: &[u8],
    shared_strings: &[String],
) -> Result<Vec<Vec<Option<Value>>>, SheetParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut cells: Vec<ParsedCell> = Vec::new();
    let mut max_row: Option<u32> = None;
    let mut max_col: Option<u32> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"c" => {
                let cell = parse_cell(&mut reader, e, shared_strings)?;
                max_row = Some(max_row.map_or(cell.row, |r| r.max(cell.row)));
                max_col = Some(max_col.map_or(cell.col, |c| c.max(cell.col)));
                cells.push(cell);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SheetParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let (Some(max_row), Some(max_col)) = (max_row, max_col) else {
        return Ok(Vec::new());
    };

    let mut records =
        vec![vec![None; max_col as usize + 1]; max_row as usize + 1];
    for cell in cells {
        records[cell.row as usize][cell.col as usize] = cell.value;
    }

    Ok(records)
}

struct ParsedCell {
    row: u32,
    col: u32,
    value: Option<Value>,
}

fn parse_cell(
    reader: &mut Reader<&[u8]>,
    start: BytesStart,
    shared_strings: &[String],
) -> Result<ParsedCell, SheetParseError> {
    let address_raw = get_attr_value(&start, b"r")?
        .ok_or_else(|| SheetParseError::Xml("cell missing address".into()))?;
    let (row, col) = address_to_index(&address_raw)
        .ok_or_else(|| SheetParseError::InvalidAddress(address_raw.clone()))?;

    let cell_type = get_attr_value(&start, b"t")?;

    let mut value_text: Option<String> = None;
    let mut inline_text: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"v" => {
                let text = reader
                    .read_text(e.name())
                    .map_err(|e| SheetParseError::Xml(e.to_string()))?
                    .into_owned();
                value_text = Some(text);
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"is" => {
                inline_text = Some(read_inline_string(reader)?);
            }
            Ok(Event::End(e)) if e.name().as_ref() == start.name().as_ref() => break,
            Ok(Event::Eof) => {
                return Err(SheetParseError::Xml("unexpected EOF inside cell".into()));
            }
            Err(e) => return Err(SheetParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let value = match inline_text {
        Some(text) => Some(Value::Text(text)),
        None => convert_value(value_text.as_deref(), cell_type.as_deref(), shared_strings)?,
    };

    Ok(ParsedCell { row, col, value })
}

fn read_inline_string(reader: &mut Reader<&[u8]>) -> Result<String, SheetParseError> {
    let mut buf = Vec::new();
    let mut value = String::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"t" => {
                let text = reader
                    .read_text(e.name())
                    .map_err(|e| SheetParseError::Xml(e.to_string()))?
                    .into_owned();
                value.push_str(&text);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"is" => break,
            Ok(Event::Eof) => {
                return Err(SheetParseError::Xml(
                    "unexpected EOF inside inline string".into(),
                ));
            }
            Err(e) => return Err(SheetParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(value)
}

fn convert_value(
    value_text: Option<&str>,
    cell_type: Option<&str>,
    shared_strings: &[String],
) -> Result<Option<Value>, SheetParseError> {
    let raw = match value_text {
        Some(t) => t,
        None => return Ok(None),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match cell_type {
        Some("s") => {
            let idx = trimmed
                .parse::<usize>()
                .map_err(|e| SheetParseError::Xml(e.to_string()))?;
            let text = shared_strings
                .get(idx)
                .ok_or(SheetParseError::SharedStringOutOfBounds(idx))?;
            Ok(Some(Value::Text(text.clone())))
        }
        Some("b") => Ok(match trimmed {
            "1" => Some(Value::Bool(true)),
            "0" => Some(Value::Bool(false)),
            _ => None,
        }),
        Some("str") | Some("inlineStr") | Some("e") => Ok(Some(Value::Text(raw.to_string()))),
        _ => {
            if let Ok(n) = trimmed.parse::<f64>() {
                Ok(Some(Value::Number(n)))
            } else {
                Ok(Some(Value::Text(trimmed.to_string())))
            }
        }
    }
}

/// Parse an A1 address into zero-based (row, col) indices.
/// Returns `None` for malformed addresses.
fn address_to_index(a1: &str) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_letter = false;
    let mut saw_digit = false;

    for ch in a1.chars() {
        if ch.is_ascii_alphabetic() {
            if saw_digit {
                return None;
            }
            saw_letter = true;
            let upper = ch.to_ascii_uppercase() as u8;
            col = col
                .checked_mul(26)?
                .checked_add((upper - b'A' + 1) as u32)?;
        } else if ch.is_ascii_digit() {
            saw_digit = true;
            row = row.checked_mul(10)?.checked_add((ch as u8 - b'0') as u32)?;
        } else {
            return None;
        }
    }

    if !saw_letter || !saw_digit || row == 0 || col == 0 {
        return None;
    }

    Some((row - 1, col - 1))
}

fn get_attr_value(
    element: &BytesStart<'_>,
    key: &[u8],
) -> Result<Option<String>, SheetParseError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| SheetParseError::Xml(e.to_string()))?;
        if attr.key.as_ref() == key {
            return Ok(Some(
                attr.unescape_value().map_err(to_xml_err)?.into_owned(),
            ));
        }
    }
    Ok(None)
}

fn to_xml_err(err: quick_xml::Error) -> SheetParseError {
    SheetParseError::Xml(err.to_string())
}
