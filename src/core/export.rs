use crate::domain::model::DistancePair;
use crate::utils::error::{PipelineError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// Serialize result rows to CSV bytes. The `Duration` column is emitted only
/// when at least one row carries a duration, so the haversine and routing
/// outputs stay three columns wide.
pub fn to_csv(rows: &[DistancePair]) -> Result<Vec<u8>> {
    let with_duration = has_durations(rows);
    let mut writer = csv::Writer::from_writer(Vec::new());

    if with_duration {
        writer.write_record(["From Zip", "To Zip", "Distance (miles)", "Duration"])?;
    } else {
        writer.write_record(["From Zip", "To Zip", "Distance (miles)"])?;
    }

    for row in rows {
        let miles = format_miles(row.miles);
        if with_duration {
            writer.write_record([
                row.origin.as_str(),
                row.destination.as_str(),
                miles.as_str(),
                row.duration.as_deref().unwrap_or(""),
            ])?;
        } else {
            writer.write_record([row.origin.as_str(), row.destination.as_str(), miles.as_str()])?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| PipelineError::ProcessingError {
            message: e.to_string(),
        })
}

/// Serialize result rows to a minimal XLSX package. ZIP codes are written as
/// inline strings so leading zeros survive a spreadsheet round trip;
/// distances are numeric cells.
pub fn to_xlsx(rows: &[DistancePair]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file::<_, ()>("[Content_Types].xml", FileOptions::default())?;
    zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

    zip.start_file::<_, ()>("_rels/.rels", FileOptions::default())?;
    zip.write_all(PACKAGE_RELS_XML.as_bytes())?;

    zip.start_file::<_, ()>("xl/workbook.xml", FileOptions::default())?;
    zip.write_all(WORKBOOK_XML.as_bytes())?;

    zip.start_file::<_, ()>("xl/_rels/workbook.xml.rels", FileOptions::default())?;
    zip.write_all(WORKBOOK_RELS_XML.as_bytes())?;

    zip.start_file::<_, ()>("xl/worksheets/sheet1.xml", FileOptions::default())?;
    zip.write_all(sheet_xml(rows).as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn has_durations(rows: &[DistancePair]) -> bool {
    rows.iter().any(|r| r.duration.is_some())
}

fn format_miles(miles: Option<f64>) -> String {
    miles.map(|m| format!("{:.1}", m)).unwrap_or_default()
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Distances" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

fn sheet_xml(rows: &[DistancePair]) -> String {
    let with_duration = has_durations(rows);

    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    let mut headers = vec!["From Zip", "To Zip", "Distance (miles)"];
    if with_duration {
        headers.push("Duration");
    }
    xml.push_str(r#"<row r="1">"#);
    for (col, header) in headers.iter().enumerate() {
        push_inline_cell(&mut xml, col, 1, header);
    }
    xml.push_str("</row>");

    for (i, row) in rows.iter().enumerate() {
        let r = i + 2;
        xml.push_str(&format!(r#"<row r="{}">"#, r));
        push_inline_cell(&mut xml, 0, r, row.origin.as_str());
        push_inline_cell(&mut xml, 1, r, row.destination.as_str());
        if let Some(miles) = row.miles {
            xml.push_str(&format!(
                r#"<c r="{}{}"><v>{:.1}</v></c>"#,
                col_letter(2),
                r,
                miles
            ));
        }
        if with_duration {
            if let Some(duration) = &row.duration {
                push_inline_cell(&mut xml, 3, r, duration);
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn push_inline_cell(xml: &mut String, col: usize, row: usize, text: &str) {
    xml.push_str(&format!(
        r#"<c r="{}{}" t="inlineStr"><is><t>{}</t></is></c>"#,
        col_letter(col),
        row,
        xml_escape(text)
    ));
}

fn col_letter(col: usize) -> char {
    (b'A' + col as u8) as char
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
