//! Presentation-level structure: relationships, slide order, and the
//! bookkeeping for adding and removing slides.
//!
//! Slide order comes from `p:sldIdLst` in `ppt/presentation.xml`, joined
//! against `ppt/_rels/presentation.xml.rels` to resolve each entry to its
//! slide part. Adding or removing a slide touches four places: the slide
//! part itself, its rels part, the presentation relationships, and the
//! `[Content_Types].xml` overrides.

use crate::package::PptxPackage;
use crate::slide;
use crate::xml::{insert_before_close, local_name, remove_element};
use deck_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

pub const PRESENTATION_PART: &str = "ppt/presentation.xml";
pub const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const SLIDE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

/// One entry parsed from a relationships part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

/// A slide in presentation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideEntry {
    /// Relationship id joining `p:sldId` to the rels part.
    pub rel_id: String,
    /// Resolved part name, e.g. `ppt/slides/slide2.xml`.
    pub part_name: String,
}

/// Parse every `Relationship` element of a rels part.
pub fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut relationships = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut id = String::new();
                let mut rel_type = String::new();
                let mut target = String::new();

                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                        _ => {}
                    }
                }

                relationships.push(Relationship {
                    id,
                    rel_type,
                    target,
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(relationships)
}

/// Whether a relationship points at a slide part (and not a slideLayout
/// or slideMaster, whose types share the `/slide` stem).
fn is_slide_relationship(rel: &Relationship) -> bool {
    rel.rel_type.contains("/slide")
        && !rel.rel_type.contains("slideLayout")
        && !rel.rel_type.contains("slideMaster")
}

/// Resolve a presentation-level relationship target to a part name.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        format!("ppt/{}", target)
    }
}

/// The slides of the presentation, in `p:sldIdLst` document order.
pub fn slide_entries(presentation_xml: &str, rels: &[Relationship]) -> Result<Vec<SlideEntry>> {
    let mut entries = Vec::new();

    for rel_id in parse_slide_id_list(presentation_xml)? {
        let rel = rels
            .iter()
            .find(|r| r.id == rel_id && is_slide_relationship(r))
            .ok_or_else(|| {
                Error::XmlError(format!("sldId references unknown relationship {}", rel_id))
            })?;
        entries.push(SlideEntry {
            rel_id,
            part_name: resolve_target(&rel.target),
        });
    }

    Ok(entries)
}

/// Relationship ids of `p:sldId` entries, in document order.
fn parse_slide_id_list(presentation_xml: &str) -> Result<Vec<String>> {
    let mut rel_ids = Vec::new();
    let mut reader = Reader::from_str(presentation_xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"r:id" {
                        rel_ids.push(String::from_utf8_lossy(&attr.value).to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing slide list: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(rel_ids)
}

/// First unused `rId<n>` in a rels part.
fn next_relationship_id(rels: &[Relationship]) -> String {
    let max = rels
        .iter()
        .filter_map(|r| r.id.strip_prefix("rId")?.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("rId{}", max + 1)
}

/// First unused slide id, at least 256 as PowerPoint expects.
fn next_slide_id(presentation_xml: &str) -> Result<u32> {
    let mut max: u32 = 255;
    let mut reader = Reader::from_str(presentation_xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"id" {
                        if let Ok(id) = String::from_utf8_lossy(&attr.value).parse::<u32>() {
                            max = max.max(id);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing slide list: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(max + 1)
}

/// Rels part name for a slide part.
pub fn rels_part_name(slide_part: &str) -> String {
    match slide_part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", slide_part),
    }
}

/// Append a fresh, empty slide that inherits `layout_target`.
///
/// Registers the new part everywhere the package needs to know about it
/// and returns its entry, placed last in presentation order.
pub fn add_slide(package: &mut PptxPackage, layout_target: &str) -> Result<SlideEntry> {
    let number = package.next_slide_number();
    let part_name = format!("ppt/slides/slide{}.xml", number);

    package.set_part(&part_name, slide::empty_slide_xml().into_bytes());
    package.set_part(
        &rels_part_name(&part_name),
        slide::slide_rels_xml(layout_target).into_bytes(),
    );

    let rels_xml = package.xml(PRESENTATION_RELS_PART)?;
    let rel_id = next_relationship_id(&parse_relationships(rels_xml)?);
    let with_rel = insert_before_close(
        rels_xml,
        b"Relationships",
        &format!(
            r#"<Relationship Id="{}" Type="{}" Target="slides/slide{}.xml"/>"#,
            rel_id, SLIDE_REL_TYPE, number
        ),
    )?;
    package.set_part(PRESENTATION_RELS_PART, with_rel.into_bytes());

    let presentation_xml = package.xml(PRESENTATION_PART)?;
    let slide_id = next_slide_id(presentation_xml)?;
    let with_id = insert_before_close(
        presentation_xml,
        b"sldIdLst",
        &format!(r#"<p:sldId id="{}" r:id="{}"/>"#, slide_id, rel_id),
    )?;
    package.set_part(PRESENTATION_PART, with_id.into_bytes());

    let content_types = package.xml(CONTENT_TYPES_PART)?;
    let with_override = insert_before_close(
        content_types,
        b"Types",
        &format!(
            r#"<Override PartName="/{}" ContentType="{}"/>"#,
            part_name, SLIDE_CONTENT_TYPE
        ),
    )?;
    package.set_part(CONTENT_TYPES_PART, with_override.into_bytes());

    Ok(SlideEntry { rel_id, part_name })
}

/// Remove a slide and every reference to it.
pub fn remove_slide(package: &mut PptxPackage, entry: &SlideEntry) -> Result<()> {
    let presentation_xml = package.xml(PRESENTATION_PART)?;
    let without_id = remove_element(presentation_xml, b"sldId", b"r:id", &entry.rel_id)?;
    package.set_part(PRESENTATION_PART, without_id.into_bytes());

    let rels_xml = package.xml(PRESENTATION_RELS_PART)?;
    let without_rel = remove_element(rels_xml, b"Relationship", b"Id", &entry.rel_id)?;
    package.set_part(PRESENTATION_RELS_PART, without_rel.into_bytes());

    let content_types = package.xml(CONTENT_TYPES_PART)?;
    let without_override = remove_element(
        content_types,
        b"Override",
        b"PartName",
        &format!("/{}", entry.part_name),
    )?;
    package.set_part(CONTENT_TYPES_PART, without_override.into_bytes());

    package.remove_part(&entry.part_name);
    package.remove_part(&rels_part_name(&entry.part_name));

    Ok(())
}
