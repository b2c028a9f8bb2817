// file: src/sources/word.rs
// description: docx reader for paragraphs, table cells and hyperlink targets
// reference: ecma-376 wordprocessingml package structure

use crate::error::{PipelineError, Result};
use crate::sources::SourceReader;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

const DOCUMENT_PART: &str = "word/document.xml";
const RELATIONSHIPS_PART: &str = "word/_rels/document.xml.rels";
const HYPERLINK_SUFFIX: &str = "/hyperlink";

pub struct WordReader;

impl SourceReader for WordReader {
    fn read_segments(&self, path: &Path) -> Result<Vec<String>> {
        let file = File::open(path).map_err(|e| PipelineError::source_read(path, e))?;
        let mut archive = ZipArchive::new(file).map_err(|e| PipelineError::source_read(path, e))?;

        let document = read_part(&mut archive, DOCUMENT_PART)
            .map_err(|e| PipelineError::source_read(path, e))?
            .ok_or_else(|| PipelineError::source_read(path, "missing word/document.xml"))?;

        let mut segments =
            paragraphs(&document).map_err(|e| PipelineError::source_read(path, e))?;

        if let Some(relationships) = read_part(&mut archive, RELATIONSHIPS_PART)
            .map_err(|e| PipelineError::source_read(path, e))?
        {
            segments.extend(
                hyperlink_targets(&relationships)
                    .map_err(|e| PipelineError::source_read(path, e))?,
            );
        }

        Ok(segments)
    }
}

fn read_part(archive: &mut ZipArchive<File>, name: &str) -> std::result::Result<Option<String>, String> {
    match archive.by_name(name) {
        Ok(mut part) => {
            let mut content = String::new();
            part.read_to_string(&mut content)
                .map_err(|e| format!("{}: {}", name, e))?;
            Ok(Some(content))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(format!("{}: {}", name, e)),
    }
}

/// Text of every `w:p`, including paragraphs nested in table cells.
fn paragraphs(xml: &str) -> std::result::Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => flush(&mut current, &mut paragraphs),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push(' '),
                _ => {}
            },
            Ok(Event::Text(text)) if in_text => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "xml error at position {}: {}",
                    reader.buffer_position(),
                    e
                ));
            }
            _ => {}
        }
    }

    flush(&mut current, &mut paragraphs);
    Ok(paragraphs)
}

fn flush(current: &mut String, paragraphs: &mut Vec<String>) {
    if !current.trim().is_empty() {
        paragraphs.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

fn hyperlink_targets(xml: &str) -> std::result::Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut targets = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"Relationship" => {
                let mut kind = None;
                let mut target = None;

                for attribute in e.attributes().flatten() {
                    let value = attribute
                        .unescape_value()
                        .map_err(|e| e.to_string())?
                        .into_owned();
                    match attribute.key.as_ref() {
                        b"Type" => kind = Some(value),
                        b"Target" => target = Some(value),
                        _ => {}
                    }
                }

                if let (Some(kind), Some(target)) = (kind, target)
                    && kind.ends_with(HYPERLINK_SUFFIX)
                {
                    targets.push(target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
    }

    Ok(targets)
}
