//! Small XML helpers shared by the rewriting passes.
//!
//! The OOXML parts are edited as event streams: read with `quick_xml`,
//! copy untouched events through a writer, and drop or splice elements on
//! the way. Raw fragments built by [`crate::shapes`] are inserted verbatim.

use deck_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

/// Local part of a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Copy `xml` unchanged, inserting `fragment` immediately before the
/// closing tag of the first element whose local name is `element`.
///
/// Fails when no such element closes in the document.
pub(crate) fn insert_before_close(xml: &str, element: &[u8], fragment: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut inserted = false;

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::End(e)) => {
                if !inserted && local_name(e.name().as_ref()) == element {
                    writer.get_mut().extend_from_slice(fragment.as_bytes());
                    inserted = true;
                }
                writer
                    .write_event(Event::End(e))
                    .map_err(|e| Error::XmlError(format!("Failed to write event: {}", e)))?;
            }
            Ok(event) => writer
                .write_event(event)
                .map_err(|e| Error::XmlError(format!("Failed to write event: {}", e)))?,
            Err(e) => return Err(Error::XmlError(format!("Failed to parse part: {}", e))),
        }
    }

    if !inserted {
        return Err(Error::XmlError(format!(
            "no <{}> element to insert into",
            String::from_utf8_lossy(element)
        )));
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::XmlError(format!("rewritten part is not valid UTF-8: {}", e)))
}

/// Copy `xml` unchanged, dropping every element whose local name is
/// `element` and whose `attr_key` attribute equals `attr_value`.
///
/// Absent matches are not an error; the result is then byte-identical.
pub(crate) fn remove_element(
    xml: &str,
    element: &[u8],
    attr_key: &[u8],
    attr_value: &str,
) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                if element_matches(&e, element, attr_key, attr_value) {
                    let end = e.to_end().into_owned();
                    reader
                        .read_to_end(end.name())
                        .map_err(|e| Error::XmlError(format!("Failed to skip element: {}", e)))?;
                    continue;
                }
                writer
                    .write_event(Event::Start(e))
                    .map_err(|e| Error::XmlError(format!("Failed to write event: {}", e)))?;
            }
            Ok(Event::Empty(e)) => {
                if element_matches(&e, element, attr_key, attr_value) {
                    continue;
                }
                writer
                    .write_event(Event::Empty(e))
                    .map_err(|e| Error::XmlError(format!("Failed to write event: {}", e)))?;
            }
            Ok(event) => writer
                .write_event(event)
                .map_err(|e| Error::XmlError(format!("Failed to write event: {}", e)))?,
            Err(e) => return Err(Error::XmlError(format!("Failed to parse part: {}", e))),
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::XmlError(format!("rewritten part is not valid UTF-8: {}", e)))
}

fn element_matches(
    e: &quick_xml::events::BytesStart<'_>,
    element: &[u8],
    attr_key: &[u8],
    attr_value: &str,
) -> bool {
    if local_name(e.name().as_ref()) != element {
        return false;
    }
    e.attributes().flatten().any(|attr| {
        attr.key.as_ref() == attr_key && String::from_utf8_lossy(&attr.value) == attr_value
    })
}
