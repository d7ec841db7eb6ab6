//! CSV and XLSX readers rendering to markdown tables
//!
//! The first row is the header. No index column is emitted.

use super::FileKind;
use crate::ExtractError;
use calamine::{Reader, Xlsx, XlsxError};
use std::io::Cursor;

/// Renders a CSV document as a markdown table
pub fn csv_to_markdown(bytes: &[u8]) -> Result<String, ExtractError> {
    let parse_err = |e: csv::Error| ExtractError::Parse {
        kind: FileKind::Csv,
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(parse_err)?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    if rows.is_empty() {
        return Err(ExtractError::Parse {
            kind: FileKind::Csv,
            message: "no rows".to_string(),
        });
    }

    Ok(markdown_table(&rows))
}

/// Renders the first worksheet of an XLSX workbook as a markdown table
pub fn xlsx_to_markdown(bytes: &[u8]) -> Result<String, ExtractError> {
    let parse_err = |message: String| ExtractError::Parse {
        kind: FileKind::Xlsx,
        message,
    };

    let mut workbook = Xlsx::new(Cursor::new(bytes))
        .map_err(|e: XlsxError| parse_err(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| parse_err("workbook has no worksheets".to_string()))?
        .map_err(|e| parse_err(e.to_string()))?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    if rows.is_empty() {
        return Err(parse_err("first worksheet is empty".to_string()));
    }

    Ok(markdown_table(&rows))
}

/// Builds a pipe table; short rows are padded to the widest row
fn markdown_table(rows: &[Vec<String>]) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);

    let format_row = |row: &[String]| {
        let cells: Vec<String> = (0..width)
            .map(|i| escape_cell(row.get(i).map(String::as_str).unwrap_or("")))
            .collect();
        format!("| {} |", cells.join(" | "))
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_row(&rows[0]));
    lines.push(format!("|{}", "---|".repeat(width)));
    for row in &rows[1..] {
        lines.push(format_row(row));
    }
    lines.join("\n")
}

fn escape_cell(cell: &str) -> String {
    cell.trim().replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const WORKBOOK: &str = r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Scores" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

    const WORKBOOK_RELS: &str = r#"<Relationships>
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

    const SHEET: &str = r#"<worksheet><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>name</t></is></c><c r="B1" t="inlineStr"><is><t>score</t></is></c></row>
<row r="2"><c r="A2" t="inlineStr"><is><t>ada</t></is></c><c r="B2"><v>10</v></c></row>
</sheetData></worksheet>"#;

    fn build_xlsx() -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            for (name, body) in [
                ("xl/workbook.xml", WORKBOOK),
                ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
                ("xl/worksheets/sheet1.xml", SHEET),
            ] {
                writer.start_file(name, SimpleFileOptions::default()).unwrap();
                writer.write_all(body.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn test_csv_header_and_rows() {
        let md = csv_to_markdown(b"name,score\nada,10\nbob,7\n").unwrap();
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "| name | score |");
        assert_eq!(lines[1], "|---|---|");
        assert_eq!(lines[2], "| ada | 10 |");
        assert_eq!(lines[3], "| bob | 7 |");
    }

    #[test]
    fn test_csv_ragged_rows_are_padded() {
        let md = csv_to_markdown(b"a,b,c\n1\n").unwrap();
        assert!(md.ends_with("| 1 |  |  |"));
    }

    #[test]
    fn test_csv_escapes_pipes() {
        let md = csv_to_markdown(b"col\n\"x|y\"\n").unwrap();
        assert!(md.contains("x\\|y"));
    }

    #[test]
    fn test_csv_empty_is_error() {
        assert!(csv_to_markdown(b"").is_err());
    }

    #[test]
    fn test_xlsx_first_sheet_as_table() {
        let md = xlsx_to_markdown(&build_xlsx()).unwrap();
        assert_eq!(md, "| name | score |\n|---|---|\n| ada | 10 |");
    }

    #[test]
    fn test_xlsx_garbage_is_error() {
        let err = xlsx_to_markdown(b"definitely not a workbook").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Parse {
                kind: FileKind::Xlsx,
                ..
            }
        ));
    }
}
