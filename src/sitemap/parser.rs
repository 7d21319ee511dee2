//! Sitemap XML decoding
//!
//! Decodes both shapes of the sitemaps.org schema: a `<urlset>` of `<url>`
//! records and a `<sitemapindex>` of `<sitemap>` records. Only `<loc>` and
//! `<priority>` directly inside a record are read; extension elements such as
//! `<image:image><image:loc>` sit deeper and are ignored.

use crate::sitemap::types::{SitemapEntry, UrlEntry, UrlSet};
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Errors produced while decoding a sitemap document
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    #[error("document has no root element")]
    NoRootElement,

    #[error("unexpected end of document inside <{0}>")]
    Unclosed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordKind {
    Url,
    Sitemap,
}

/// Fields collected for the record currently being read
#[derive(Debug)]
struct Record {
    kind: RecordKind,
    loc: String,
    priority: String,
}

impl Record {
    fn start(name: &str) -> Option<Self> {
        let kind = match name {
            "url" => RecordKind::Url,
            "sitemap" => RecordKind::Sitemap,
            _ => return None,
        };
        Some(Self {
            kind,
            loc: String::new(),
            priority: String::new(),
        })
    }

    fn append(&mut self, field: &str, text: &str) {
        match field {
            "loc" => self.loc.push_str(text),
            "priority" if self.kind == RecordKind::Url => self.priority.push_str(text),
            _ => {}
        }
    }

    /// Adds the finished record to the set; records without a location are dropped
    fn finish(self, set: &mut UrlSet) {
        let location = self.loc.trim();
        if location.is_empty() {
            return;
        }

        match self.kind {
            RecordKind::Url => set
                .urls
                .push(UrlEntry::new(location, parse_priority(&self.priority))),
            RecordKind::Sitemap => set.sitemaps.push(SitemapEntry {
                location: location.to_string(),
            }),
        }
    }
}

/// Parses a `<priority>` value; absent, unparsable or non-finite values are 0
pub fn parse_priority(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(priority) if priority.is_finite() => priority,
        _ => 0.0,
    }
}

/// Decodes a sitemap or sitemap index
///
/// # Arguments
///
/// * `data` - The (already decompressed) document bytes
///
/// # Returns
///
/// * `Ok(UrlSet)` - URL records in document order, plus child sitemaps for an index
/// * `Err(ParseError)` - The document is not well-formed XML
///
/// # Example
///
/// ```
/// use cache_primer::sitemap::parse_sitemap;
///
/// let xml = br#"<urlset><url><loc>https://example.com/</loc><priority>0.8</priority></url></urlset>"#;
/// let set = parse_sitemap(xml).unwrap();
/// assert_eq!(set.urls[0].location, "https://example.com/");
/// assert_eq!(set.urls[0].priority, 0.8);
/// ```
pub fn parse_sitemap(data: &[u8]) -> Result<UrlSet, ParseError> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut set = UrlSet::default();
    let mut stack: Vec<String> = Vec::new();
    let mut record: Option<Record> = None;
    let mut seen_root = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                match stack.len() {
                    0 => seen_root = true,
                    1 => record = Record::start(&name),
                    _ => {}
                }
                stack.push(name);
            }
            Event::Empty(_) => {
                // Self-closing elements carry no text; an empty root is still a root
                if stack.is_empty() {
                    seen_root = true;
                }
            }
            Event::End(_) => {
                stack.pop();
                if stack.len() == 1 {
                    if let Some(finished) = record.take() {
                        finished.finish(&mut set);
                    }
                }
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                append_field_text(&stack, record.as_mut(), &text);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e);
                append_field_text(&stack, record.as_mut(), &text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::Unclosed(open));
    }

    if !seen_root {
        return Err(ParseError::NoRootElement);
    }

    Ok(set)
}

/// Text only counts when it sits directly in a field of a record: root > record > field
fn append_field_text(stack: &[String], record: Option<&mut Record>, text: &str) {
    if stack.len() != 3 {
        return;
    }
    if let Some(record) = record {
        record.append(&stack[2], text);
    }
}
