//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use rollmenu::{Table, Value};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

pub fn table(columns: &[&str], records: Vec<Vec<Option<Value>>>) -> Table {
    Table::new(columns.iter().map(|c| c.to_string()).collect(), records)
}

pub fn txt(s: &str) -> Option<Value> {
    Some(Value::Text(s.to_string()))
}

pub fn num(n: f64) -> Option<Value> {
    Some(Value::Number(n))
}

pub fn flag(b: bool) -> Option<Value> {
    Some(Value::Bool(b))
}

/// The roster used by the end-to-end scenarios: Name/Team with one blank
/// name.
pub fn roster() -> Table {
    table(
        &["Name", "Team"],
        vec![
            vec![txt("Alice"), txt("Red")],
            vec![txt("Bob"), txt("Blue")],
            vec![txt("Carol"), txt("Red")],
            vec![None, txt("Blue")],
        ],
    )
}

/// A cell in a generated worksheet.
pub enum XlsxCell {
    Str(&'static str),
    Num(f64),
    Bool(bool),
    Blank,
}

/// Build a minimal single-sheet `.xlsx` package in memory, using inline
/// strings so no shared-string part is needed.
pub fn xlsx_from_rows(rows: &[Vec<XlsxCell>]) -> Vec<u8> {
    let mut sheet = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (row_idx, row) in rows.iter().enumerate() {
        sheet.push_str(&format!(r#"<row r="{}">"#, row_idx + 1));
        for (col_idx, cell) in row.iter().enumerate() {
            let addr = format!("{}{}", col_letter(col_idx), row_idx + 1);
            match cell {
                XlsxCell::Str(s) => sheet.push_str(&format!(
                    r#"<c r="{addr}" t="inlineStr"><is><t>{s}</t></is></c>"#
                )),
                XlsxCell::Num(n) => sheet.push_str(&format!(r#"<c r="{addr}"><v>{n}</v></c>"#)),
                XlsxCell::Bool(b) => sheet.push_str(&format!(
                    r#"<c r="{addr}" t="b"><v>{}</v></c>"#,
                    if *b { 1 } else { 0 }
                )),
                XlsxCell::Blank => {}
            }
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    xlsx_package(&[
        ("xl/worksheets/sheet1.xml", sheet.as_str()),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Data" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#,
        ),
    ])
}

/// Assemble named parts (plus the content-types marker) into a ZIP package.
pub fn xlsx_package(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    writer
        .start_file("[Content_Types].xml", options)
        .expect("start content types");
    writer
        .write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#,
        )
        .expect("write content types");

    for (name, body) in parts {
        writer.start_file(*name, options).expect("start part");
        writer.write_all(body.as_bytes()).expect("write part");
    }

    writer.finish().expect("finish zip").into_inner()
}

fn col_letter(idx: usize) -> char {
    (b'A' + idx as u8) as char
}
