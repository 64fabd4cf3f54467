use std::io::Read;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{ExtractError, Result};

/// Extract paragraph text from DOCX bytes.
///
/// A DOCX file is a ZIP archive whose body lives in `word/document.xml`
/// as WordprocessingML. Non-blank paragraphs come out one per line.
///
/// # Errors
///
/// Returns `ExtractError::ExtractionFailed` if the archive or the XML body
/// cannot be read.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor)
        .map_err(|e| ExtractError::ExtractionFailed(format!("not a DOCX archive: {e}")))?;

    let mut xml = String::new();
    {
        let mut entry = archive.by_name("word/document.xml").map_err(|e| {
            ExtractError::ExtractionFailed(format!("missing word/document.xml: {e}"))
        })?;
        entry
            .read_to_string(&mut xml)
            .map_err(|e| ExtractError::ExtractionFailed(format!("unreadable body: {e}")))?;
    }

    paragraphs_from_xml(&xml)
}

fn paragraphs_from_xml(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut paragraph = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    let line = paragraph.trim();
                    if !line.is_empty() {
                        out.push_str(line);
                        out.push('\n');
                    }
                    paragraph.clear();
                }
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let chunk = e.unescape().map_err(|err| {
                    ExtractError::ExtractionFailed(format!("malformed document XML: {err}"))
                })?;
                paragraph.push_str(&chunk);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::ExtractionFailed(format!(
                    "malformed document XML: {e}"
                )));
            }
            Ok(_) => {}
        }
    }

    Ok(out)
}
