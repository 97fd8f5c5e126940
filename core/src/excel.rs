//! `.xlsx` dataset loading.
//!
//! Opens the source workbook, parses its first worksheet, and converts it
//! into a [`Table`] with the first row as the header. Loading happens once
//! at startup; any failure here is fatal to the process.

use crate::container::{ContainerError, XlsxContainer};
use crate::sheet::{
    SheetParseError, parse_relationships, parse_shared_strings, parse_sheet_records,
    parse_workbook_sheets, resolve_sheet_part,
};
use crate::table::Table;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpenError {
    #[error("container error: {0}")]
    Container(#[from] ContainerError),
    #[error("sheet parse error: {0}")]
    Sheet(#[from] SheetParseError),
    #[error("workbook.xml missing or unreadable")]
    WorkbookXmlMissing,
    #[error("worksheet XML missing for sheet {sheet_name}")]
    WorksheetXmlMissing { sheet_name: String },
    #[error("workbook has no worksheets")]
    NoWorksheet,
    #[error("worksheet has no columns")]
    NoColumns,
}

/// Load the dataset from an `.xlsx` file on disk.
pub fn open_table(path: impl AsRef<Path>) -> Result<Table, OpenError> {
    let container = XlsxContainer::open_path(path.as_ref())?;
    table_from_container(container)
}

/// Load the dataset from an in-memory or streaming `.xlsx` package.
pub fn read_table<R: Read + Seek + 'static>(reader: R) -> Result<Table, OpenError> {
    let container = XlsxContainer::open(reader)?;
    table_from_container(container)
}

fn table_from_container(mut container: XlsxContainer) -> Result<Table, OpenError> {
    let shared_strings = match container.read_part_optional("xl/sharedStrings.xml")? {
        Some(bytes) => parse_shared_strings(&bytes)?,
        None => Vec::new(),
    };

    let workbook_bytes = container
        .read_part("xl/workbook.xml")
        .map_err(|_| OpenError::WorkbookXmlMissing)?;
    let sheets = parse_workbook_sheets(&workbook_bytes)?;

    let relationships = match container.read_part_optional("xl/_rels/workbook.xml.rels")? {
        Some(bytes) => parse_relationships(&bytes)?,
        None => HashMap::new(),
    };

    // Only the first sheet feeds the overlay.
    let sheet = sheets.first().ok_or(OpenError::NoWorksheet)?;
    let target = resolve_sheet_part(sheet, &relationships, 0);
    let sheet_bytes =
        container
            .read_part(&target)
            .map_err(|_| OpenError::WorksheetXmlMissing {
                sheet_name: sheet.name.clone(),
            })?;

    let mut records = parse_sheet_records(&sheet_bytes, &shared_strings)?;
    if records.is_empty() {
        return Err(OpenError::NoColumns);
    }

    let header = records.remove(0);
    if header.is_empty() {
        return Err(OpenError::NoColumns);
    }

    // Blank header cells get positional names so records keep their
    // column alignment.
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| match cell {
            Some(value) => value.to_string(),
            None => format!("Unnamed: {idx}"),
        })
        .collect();

    Ok(Table::new(columns, records))
}
