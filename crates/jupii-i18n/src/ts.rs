//! Reader for Qt Linguist `.ts` documents.
//!
//! Produces a flat, order-preserving list of [`RawEntry`] records; indexing
//! happens later in [`crate::Catalog::build`].
//!
//! # Accepted structure
//!
//! ```text
//! TS (version?, language, sourcelanguage?)
//! └── context*
//!     ├── name
//!     └── message* (numerus="yes"?)
//!         ├── location* (filename?, line?)
//!         ├── source
//!         ├── comment? / extracomment? / translatorcomment?
//!         └── translation (type?)
//!             └── numerusform* | lengthvariant*
//! ```
//!
//! Relative locations (`line="+4"`, omitted `filename`) are resolved against
//! the previous location in the same file of the same context. Unknown
//! elements such as `oldsource` are skipped.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entry::{Location, RawEntry, Translation, TranslationStatus};
use crate::error::CatalogError;

/// A parsed TS document.
///
/// With the `serde` feature this doubles as the compiled JSON snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TsDocument {
    #[cfg_attr(feature = "serde", serde(default))]
    pub version: Option<String>,
    pub language: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_language: Option<String>,
    pub records: Vec<RawEntry>,
}

impl TsDocument {
    /// Parse a TS document from UTF-8 text.
    pub fn parse(xml: &str) -> Result<Self, CatalogError> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = Reader::from_str(xml);
        reader.config_mut().expand_empty_elements = true;

        let mut parser = TsParser::default();
        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    return Err(CatalogError::Xml {
                        position: reader.buffer_position() as u64,
                        message: err.to_string(),
                    });
                }
            };
            match event {
                Event::Start(start) => parser.open(&start)?,
                Event::End(_) => parser.close()?,
                Event::Text(text) => {
                    if parser.capturing() {
                        let text = text.unescape().map_err(|err| CatalogError::Xml {
                            position: reader.buffer_position() as u64,
                            message: err.to_string(),
                        })?;
                        parser.text.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if parser.capturing() {
                        parser.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        parser.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Ts,
    Context,
    Name,
    Message,
    Location,
    Source,
    Comment,
    ExtraComment,
    TranslatorComment,
    Translation,
    NumerusForm,
    LengthVariant,
    Byte,
    Other,
}

impl Tag {
    fn from_name(name: &[u8]) -> Self {
        match name {
            b"TS" => Self::Ts,
            b"context" => Self::Context,
            b"name" => Self::Name,
            b"message" => Self::Message,
            b"location" => Self::Location,
            b"source" => Self::Source,
            b"comment" => Self::Comment,
            b"extracomment" => Self::ExtraComment,
            b"translatorcomment" => Self::TranslatorComment,
            b"translation" => Self::Translation,
            b"numerusform" => Self::NumerusForm,
            b"lengthvariant" => Self::LengthVariant,
            b"byte" => Self::Byte,
            _ => Self::Other,
        }
    }

    fn captures_text(self) -> bool {
        matches!(
            self,
            Self::Name
                | Self::Source
                | Self::Comment
                | Self::ExtraComment
                | Self::TranslatorComment
                | Self::Translation
                | Self::NumerusForm
                | Self::LengthVariant
        )
    }
}

#[derive(Debug, Default)]
struct PendingMessage {
    numerus: bool,
    source: Option<String>,
    disambiguation: Option<String>,
    extra_comment: Option<String>,
    translator_comment: Option<String>,
    status: Option<TranslationStatus>,
    translation: Option<String>,
    forms: Vec<String>,
    locations: Vec<Location>,
    /// First `<lengthvariant>` of the translation or form being read.
    variant: Option<String>,
}

#[derive(Debug, Default)]
struct TsParser {
    stack: Vec<Tag>,
    text: String,
    version: Option<String>,
    language: Option<String>,
    source_language: Option<String>,
    context: Option<String>,
    message: Option<PendingMessage>,
    records: Vec<RawEntry>,
    last_file: String,
    last_lines: HashMap<String, u32>,
}

impl TsParser {
    fn capturing(&self) -> bool {
        self.stack.last().is_some_and(|tag| tag.captures_text())
    }

    fn parent(&self) -> Option<Tag> {
        self.stack.last().copied()
    }

    fn open(&mut self, start: &BytesStart<'_>) -> Result<(), CatalogError> {
        let tag = Tag::from_name(start.name().as_ref());

        if self.stack.is_empty() {
            if tag != Tag::Ts {
                return Err(CatalogError::Malformed(format!(
                    "root element is <{}>, expected <TS>",
                    String::from_utf8_lossy(start.name().as_ref())
                )));
            }
            self.version = attribute(start, b"version")?;
            self.source_language = attribute(start, b"sourcelanguage")?;
            self.language = Some(attribute(start, b"language")?.ok_or(
                CatalogError::MissingAttribute {
                    element: "TS",
                    attribute: "language",
                },
            )?);
        }

        match tag {
            Tag::Context => {
                self.context = None;
                self.last_file.clear();
                self.last_lines.clear();
            }
            Tag::Message => {
                if !self.stack.contains(&Tag::Context) {
                    return Err(CatalogError::Malformed(
                        "<message> outside of a <context>".into(),
                    ));
                }
                self.message = Some(PendingMessage {
                    numerus: attribute(start, b"numerus")?.as_deref() == Some("yes"),
                    ..PendingMessage::default()
                });
            }
            Tag::Location => {
                if self.message.is_some() {
                    let location = self.resolve_location(start)?;
                    if let Some(message) = self.message.as_mut() {
                        message.locations.push(location);
                    }
                }
            }
            Tag::Translation => {
                let kind = attribute(start, b"type")?;
                if let Some(message) = self.message.as_mut() {
                    message.status = Some(TranslationStatus::from_ts_type(kind.as_deref()));
                    message.variant = None;
                }
            }
            Tag::NumerusForm => {
                if let Some(message) = self.message.as_mut() {
                    message.variant = None;
                }
            }
            Tag::Byte => {
                if self.capturing() {
                    if let Some(ch) = attribute(start, b"value")?.as_deref().and_then(decode_byte) {
                        self.text.push(ch);
                    }
                }
            }
            _ => {}
        }

        if tag.captures_text() {
            self.text.clear();
        }
        self.stack.push(tag);
        Ok(())
    }

    fn close(&mut self) -> Result<(), CatalogError> {
        let Some(tag) = self.stack.pop() else {
            return Err(CatalogError::Malformed("unbalanced closing tag".into()));
        };
        let text = if tag.captures_text() {
            std::mem::take(&mut self.text)
        } else {
            String::new()
        };

        if tag == Tag::Name && self.parent() == Some(Tag::Context) {
            self.context = Some(text);
            return Ok(());
        }
        if tag == Tag::Message {
            return self.finish_message();
        }
        if tag == Tag::Context {
            self.context = None;
            return Ok(());
        }

        let Some(message) = self.message.as_mut() else {
            return Ok(());
        };
        match tag {
            Tag::Source => message.source = Some(text),
            Tag::Comment => message.disambiguation = non_empty(text),
            Tag::ExtraComment => message.extra_comment = non_empty(text),
            Tag::TranslatorComment => message.translator_comment = non_empty(text),
            Tag::LengthVariant => {
                if message.variant.is_none() {
                    message.variant = Some(text);
                }
            }
            Tag::NumerusForm => {
                let form = message.variant.take().unwrap_or(text);
                message.forms.push(form);
            }
            Tag::Translation => {
                if !message.numerus {
                    message.translation = Some(message.variant.take().unwrap_or(text));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish_message(&mut self) -> Result<(), CatalogError> {
        let Some(message) = self.message.take() else {
            return Ok(());
        };
        let Some(context) = self.context.clone() else {
            return Err(CatalogError::MissingElement {
                element: "name",
                context: String::new(),
            });
        };
        let Some(source) = message.source else {
            return Err(CatalogError::MissingElement {
                element: "source",
                context,
            });
        };

        let translation = if message.numerus {
            Translation::Plural(message.forms)
        } else {
            Translation::Single(message.translation.unwrap_or_default())
        };
        // No <translation> element at all counts as an empty draft.
        let status = message.status.unwrap_or(TranslationStatus::Unfinished);

        self.records.push(RawEntry {
            context,
            source,
            disambiguation: message.disambiguation,
            translation,
            status,
            locations: message.locations,
            extra_comment: message.extra_comment,
            translator_comment: message.translator_comment,
        });
        Ok(())
    }

    fn resolve_location(&mut self, start: &BytesStart<'_>) -> Result<Location, CatalogError> {
        let filename = match attribute(start, b"filename")? {
            Some(name) => name,
            None => self.last_file.clone(),
        };
        let base = self.last_lines.get(&filename).copied().unwrap_or(0);
        let line = attribute(start, b"line")?
            .as_deref()
            .and_then(|raw| parse_line(raw, base));

        if let Some(line) = line {
            self.last_lines.insert(filename.clone(), line);
        }
        self.last_file.clone_from(&filename);
        Ok(Location { filename, line })
    }

    fn finish(self) -> Result<TsDocument, CatalogError> {
        if let Some(open) = self.stack.last() {
            return Err(CatalogError::Malformed(format!(
                "document ends inside {open:?}"
            )));
        }
        let Some(language) = self.language else {
            return Err(CatalogError::Malformed(
                "document has no <TS> root element".into(),
            ));
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            language = %language,
            records = self.records.len(),
            "parsed ts document"
        );

        Ok(TsDocument {
            version: self.version,
            language,
            source_language: self.source_language,
            records: self.records,
        })
    }
}

fn attribute(start: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, CatalogError> {
    for attr in start.attributes() {
        let attr = attr.map_err(|err| CatalogError::Malformed(err.to_string()))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|err| CatalogError::Malformed(err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

/// Absolute (`42`) or relative (`+3`, `-1`) line number.
fn parse_line(raw: &str, base: u32) -> Option<u32> {
    if let Some(delta) = raw.strip_prefix('+') {
        base.checked_add(delta.parse().ok()?)
    } else if let Some(delta) = raw.strip_prefix('-') {
        base.checked_sub(delta.parse().ok()?)
    } else {
        raw.parse().ok()
    }
}

/// `<byte value="x9"/>` (hex) or `<byte value="9"/>` (decimal).
fn decode_byte(value: &str) -> Option<char> {
    let code = match value.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => value.parse().ok()?,
    };
    char::from_u32(code)
}
