//! Flattening parser for event log XML
//!
//! The document is three levels deep below the root:
//!
//! ```text
//! <Root>
//!   <Message>            one per logged message
//!     <Items>            one item group == one EventRecord
//!       <Node>N1</Node>  tagged leaf, tag name selects the field
//!       ...
//!     </Items>
//!   </Message>
//! </Root>
//! ```
//!
//! Element names at the message and group levels are not checked; only the
//! nesting depth matters. Leaves whose tag is not one of the known fields
//! are skipped.
//!
//! Records are produced lazily in document order. Each group builds its own
//! [`EventRecord`], so a group that omits a tag simply leaves that field
//! `None` on its own record.

use crate::models::{EventField, EventRecord};
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Depth (root = 1) of an item group element
const GROUP_DEPTH: usize = 3;

/// Depth (root = 1) of a tagged leaf element
const LEAF_DEPTH: usize = 4;

/// Decompressed content is not a well-formed event log document
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed XML at byte {offset}: {source}")]
    Xml {
        offset: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Invalid UTF-8 in CDATA section at byte {offset}: {source}")]
    Utf8 {
        offset: u64,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Document has no root element")]
    NoRootElement,

    #[error("Document ended with {open} unclosed element(s)")]
    UnexpectedEof { open: usize },

    #[error("Unexpected element after the root element at byte {offset}")]
    TrailingElement { offset: u64 },

    #[error("Text outside the root element at byte {offset}")]
    TextOutsideRoot { offset: u64 },
}

/// Lazily parse `bytes` into event records
///
/// The iterator stops after the first error. Calling this again on the
/// same bytes starts over from the beginning.
pub fn parse_records(bytes: &[u8]) -> Records<'_> {
    Records::new(bytes)
}

/// Parse every record, failing if any part of the document is malformed
pub fn parse_all(bytes: &[u8]) -> Result<Vec<EventRecord>, ParseError> {
    parse_records(bytes).collect()
}

struct LeafCapture {
    field: EventField,
    text: Option<String>,
    // only text before the first child element is captured
    saw_child: bool,
}

/// Iterator over the records of one document
pub struct Records<'a> {
    reader: Reader<&'a [u8]>,
    depth: usize,
    seen_root: bool,
    group: Option<EventRecord>,
    leaf: Option<LeafCapture>,
    done: bool,
}

impl<'a> Records<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().check_end_names = true;

        Self {
            reader,
            depth: 0,
            seen_root: false,
            group: None,
            leaf: None,
            done: false,
        }
    }

    fn offset(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    fn capturing_leaf(&self) -> bool {
        self.depth == LEAF_DEPTH && self.leaf.as_ref().is_some_and(|leaf| !leaf.saw_child)
    }

    fn push_leaf_text(&mut self, value: &str) {
        if let Some(leaf) = self.leaf.as_mut() {
            leaf.text.get_or_insert_with(String::new).push_str(value);
        }
    }

    fn open_element(&mut self, name: &[u8]) -> Result<(), ParseError> {
        if self.depth == 0 {
            if self.seen_root {
                return Err(ParseError::TrailingElement {
                    offset: self.offset(),
                });
            }
            self.seen_root = true;
        }

        self.depth += 1;
        match self.depth {
            GROUP_DEPTH => self.group = Some(EventRecord::default()),
            LEAF_DEPTH => {
                self.leaf = EventField::from_tag(name).map(|field| LeafCapture {
                    field,
                    text: None,
                    saw_child: false,
                });
            },
            depth if depth > LEAF_DEPTH => {
                if let Some(leaf) = self.leaf.as_mut() {
                    leaf.saw_child = true;
                }
            },
            _ => {},
        }

        Ok(())
    }

    /// Close the innermost element, returning the record if it was a group
    fn close_element(&mut self) -> Option<EventRecord> {
        let closing = self.depth;
        self.depth = self.depth.saturating_sub(1);

        match closing {
            LEAF_DEPTH => {
                if let (Some(leaf), Some(group)) = (self.leaf.take(), self.group.as_mut()) {
                    group.set(leaf.field, leaf.text);
                }
                None
            },
            GROUP_DEPTH => self.group.take(),
            _ => None,
        }
    }

    fn advance(&mut self) -> Result<Option<EventRecord>, ParseError> {
        loop {
            let event = self.reader.read_event().map_err(|source| ParseError::Xml {
                offset: self.offset(),
                source,
            })?;

            match event {
                Event::Start(start) => self.open_element(start.name().as_ref())?,
                Event::Empty(empty) => {
                    self.open_element(empty.name().as_ref())?;
                    if let Some(record) = self.close_element() {
                        return Ok(Some(record));
                    }
                },
                Event::End(_) => {
                    if let Some(record) = self.close_element() {
                        return Ok(Some(record));
                    }
                },
                Event::Text(text) => {
                    if self.depth == 0 {
                        if !text.iter().all(u8::is_ascii_whitespace) {
                            return Err(ParseError::TextOutsideRoot {
                                offset: self.offset(),
                            });
                        }
                    } else if self.capturing_leaf() {
                        let value = text.unescape().map_err(|source| ParseError::Xml {
                            offset: self.offset(),
                            source: source.into(),
                        })?;
                        self.push_leaf_text(&value);
                    }
                },
                Event::CData(cdata) => {
                    if self.depth == 0 {
                        return Err(ParseError::TextOutsideRoot {
                            offset: self.offset(),
                        });
                    }
                    if self.capturing_leaf() {
                        let value = std::str::from_utf8(&cdata).map_err(|source| {
                            ParseError::Utf8 {
                                offset: self.offset(),
                                source,
                            }
                        })?;
                        self.push_leaf_text(value);
                    }
                },
                Event::Eof => {
                    if self.depth > 0 {
                        return Err(ParseError::UnexpectedEof { open: self.depth });
                    }
                    if !self.seen_root {
                        return Err(ParseError::NoRootElement);
                    }
                    return Ok(None);
                },
                // Declarations, comments, processing instructions, doctype
                _ => {},
            }
        }
    }
}

impl Iterator for Records<'_> {
    type Item = Result<EventRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.advance() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(err) => {
                self.done = true;
                Some(Err(err))
            },
        }
    }
}

impl std::iter::FusedIterator for Records<'_> {}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const THREE_GROUPS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<EventLog>
  <Message>
    <Items>
      <Node>N1</Node>
      <Severity>Error</Severity>
      <MessageText>first</MessageText>
    </Items>
    <Items>
      <Node>N2</Node>
      <MessageText>second</MessageText>
    </Items>
  </Message>
  <Message>
    <Items>
      <Node>N3</Node>
      <Severity>Warning</Severity>
      <MessageText>third</MessageText>
    </Items>
  </Message>
</EventLog>"#;

    #[test]
    fn test_missing_tag_does_not_shift_fields() {
        let records = parse_all(THREE_GROUPS.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].severity.as_deref(), Some("Error"));
        assert_eq!(records[1].severity, None);
        assert_eq!(records[2].severity.as_deref(), Some("Warning"));

        let nodes: Vec<_> = records.iter().map(|r| r.node.as_deref()).collect();
        assert_eq!(nodes, vec![Some("N1"), Some("N2"), Some("N3")]);
        assert_eq!(records[1].message_text.as_deref(), Some("second"));
    }

    #[test]
    fn test_all_fifteen_fields() {
        let leaves: String = EventField::ALL
            .iter()
            .map(|f| format!("<{0}>{0}-value</{0}>", f.tag()))
            .collect();
        let doc = format!("<Log><Message><Items>{}</Items></Message></Log>", leaves);

        let records = parse_all(doc.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        for field in EventField::ALL {
            assert_eq!(
                records[0].get(field),
                Some(format!("{}-value", field.tag()).as_str())
            );
        }
    }

    #[test]
    fn test_unknown_tags_are_ignored() {
        let doc = b"<Log><Message><Items><Node>N1</Node><Hostname>box</Hostname><severity>lower</severity></Items></Message></Log>";
        let records = parse_all(doc).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].node.as_deref(), Some("N1"));
        assert_eq!(records[0].severity, None);
    }

    #[test]
    fn test_group_without_known_tags_yields_empty_record() {
        let doc = b"<Log><Message><Items><Extra>x</Extra></Items><Items/><Items></Items></Message></Log>";
        let records = parse_all(doc).unwrap();

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| *r == EventRecord::default()));
    }

    #[test]
    fn test_empty_documents() {
        assert!(parse_all(b"<Log/>").unwrap().is_empty());
        assert!(parse_all(b"<Log><Message/><Message></Message></Log>")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_empty_leaf_is_null() {
        let doc = b"<Log><Message><Items><Node/><Severity></Severity><Id>7</Id></Items></Message></Log>";
        let records = parse_all(doc).unwrap();

        assert_eq!(records[0].node, None);
        assert_eq!(records[0].severity, None);
        assert_eq!(records[0].id.as_deref(), Some("7"));
    }

    #[test]
    fn test_repeated_tag_last_wins() {
        let doc = b"<Log><Message><Items><Node>A</Node><Node>B</Node></Items></Message></Log>";
        let records = parse_all(doc).unwrap();
        assert_eq!(records[0].node.as_deref(), Some("B"));
    }

    #[test]
    fn test_text_is_unescaped_and_untrimmed() {
        let doc = b"<Log><Message><Items><MessageText>  a &lt; b &amp;&amp; c  </MessageText><Type><![CDATA[<raw>]]></Type></Items></Message></Log>";
        let records = parse_all(doc).unwrap();

        assert_eq!(records[0].message_text.as_deref(), Some("  a < b && c  "));
        assert_eq!(records[0].r#type.as_deref(), Some("<raw>"));
    }

    #[test]
    fn test_leaf_text_after_child_is_ignored() {
        let doc = b"<Log><Message><Items><MessageText>head<b>bold</b>tail</MessageText></Items></Message></Log>";
        let records = parse_all(doc).unwrap();
        assert_eq!(records[0].message_text.as_deref(), Some("head"));
    }

    #[test]
    fn test_byte_order_mark_is_accepted() {
        let mut doc = UTF8_BOM.to_vec();
        doc.extend_from_slice(b"<Log><Message><Items><Node>N1</Node></Items></Message></Log>");
        let records = parse_all(&doc).unwrap();
        assert_eq!(records[0].node.as_deref(), Some("N1"));
    }

    #[test]
    fn test_lazy_iteration_and_restart() {
        let bytes = THREE_GROUPS.as_bytes();

        let mut records = parse_records(bytes);
        let first = records.next().unwrap().unwrap();
        assert_eq!(first.node.as_deref(), Some("N1"));

        let again: Vec<_> = parse_records(bytes).map(|r| r.unwrap()).collect();
        assert_eq!(again.len(), 3);
        assert_eq!(again[0], first);
    }

    #[test]
    fn test_mismatched_end_tag() {
        let doc = b"<Log><Message><Items><Node>N1</Severity></Items></Message></Log>";
        assert!(matches!(parse_all(doc), Err(ParseError::Xml { .. })));
    }

    #[test]
    fn test_unclosed_document() {
        let doc = b"<Log><Message><Items><Node>N1</Node></Items>";
        assert!(matches!(
            parse_all(doc),
            Err(ParseError::UnexpectedEof { open: 2 }) | Err(ParseError::Xml { .. })
        ));
    }

    #[test]
    fn test_no_root_element() {
        assert!(matches!(parse_all(b""), Err(ParseError::NoRootElement)));
        assert!(matches!(
            parse_all(b"<?xml version=\"1.0\"?>\n"),
            Err(ParseError::NoRootElement)
        ));
    }

    #[test]
    fn test_content_outside_root() {
        assert!(matches!(
            parse_all(b"<Log/><Log/>"),
            Err(ParseError::TrailingElement { .. })
        ));
        assert!(matches!(
            parse_all(b"garbage"),
            Err(ParseError::TextOutsideRoot { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_text() {
        let doc = b"<Log><Message><Items><Node>\xFF\xFE</Node></Items></Message></Log>";
        assert!(matches!(parse_all(doc), Err(ParseError::Xml { .. })));
    }

    #[test]
    fn test_unknown_entity() {
        let doc = b"<Log><Message><Items><Node>&bogus;</Node></Items></Message></Log>";
        assert!(matches!(parse_all(doc), Err(ParseError::Xml { .. })));
    }

    #[test]
    fn test_invalid_utf8_cdata() {
        let doc = b"<Log><Message><Items><Node><![CDATA[\xFF\xFE]]></Node></Items></Message></Log>";
        assert!(matches!(parse_all(doc), Err(ParseError::Utf8 { .. })));
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let doc = b"<Log><Message><Items><Node>N1</Node></Items><Items><Node>N2</Oops></Items></Message></Log>";
        let mut records = parse_records(doc);

        assert!(records.next().unwrap().is_ok());
        assert!(records.next().unwrap().is_err());
        assert!(records.next().is_none());
    }
}
