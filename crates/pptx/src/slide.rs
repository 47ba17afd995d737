//! Single-slide XML surgery.
//!
//! A slide part keeps its background and theme at the layout/master
//! level, so stripping the shape tree's children leaves the visual design
//! intact. [`rewrite_slide`] copies a slide event-by-event, drops every
//! shape subtree, and splices the replacement shapes in before the tree
//! closes.

use crate::xml::local_name;
use deck_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

/// Shape tree children that count as removable shapes. The tree's own
/// `p:nvGrpSpPr`/`p:grpSpPr` (and anything else, like `p:extLst`) stay.
const SHAPE_ELEMENTS: [&[u8]; 6] = [
    b"sp",
    b"grpSp",
    b"graphicFrame",
    b"cxnSp",
    b"pic",
    b"contentPart",
];

/// Strip every shape from a slide and splice `shapes_xml` into its shape
/// tree. Everything outside `p:spTree` is copied through untouched.
pub fn rewrite_slide(xml: &str, shapes_xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut in_tree = false;
    let mut found_tree = false;

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let (is_shape, is_tree) = {
                    let name = e.name();
                    let local = local_name(name.as_ref());
                    (SHAPE_ELEMENTS.contains(&local), local == b"spTree")
                };

                if in_tree && is_shape {
                    let end = e.to_end().into_owned();
                    reader
                        .read_to_end(end.name())
                        .map_err(|e| Error::XmlError(format!("Failed to skip shape: {}", e)))?;
                    continue;
                }
                if is_tree {
                    in_tree = true;
                    found_tree = true;
                }
                writer
                    .write_event(Event::Start(e))
                    .map_err(|e| Error::XmlError(format!("Failed to write slide: {}", e)))?;
            }
            Ok(Event::Empty(e)) => {
                let is_shape = {
                    let name = e.name();
                    SHAPE_ELEMENTS.contains(&local_name(name.as_ref()))
                };
                if in_tree && is_shape {
                    continue;
                }
                writer
                    .write_event(Event::Empty(e))
                    .map_err(|e| Error::XmlError(format!("Failed to write slide: {}", e)))?;
            }
            Ok(Event::End(e)) => {
                let is_tree = {
                    let name = e.name();
                    local_name(name.as_ref()) == b"spTree"
                };
                if is_tree {
                    writer.get_mut().extend_from_slice(shapes_xml.as_bytes());
                    in_tree = false;
                }
                writer
                    .write_event(Event::End(e))
                    .map_err(|e| Error::XmlError(format!("Failed to write slide: {}", e)))?;
            }
            Ok(event) => writer
                .write_event(event)
                .map_err(|e| Error::XmlError(format!("Failed to write slide: {}", e)))?,
            Err(e) => return Err(Error::XmlError(format!("Failed to parse slide: {}", e))),
        }
    }

    if !found_tree {
        return Err(Error::XmlError("slide has no shape tree".to_string()));
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::XmlError(format!("rewritten slide is not valid UTF-8: {}", e)))
}

/// Layout target of a slide, read from its rels part.
///
/// Returned verbatim (slide-relative, e.g. `../slideLayouts/slideLayout2.xml`)
/// so it can be copied straight into a cloned slide's rels.
pub fn layout_target(rels_xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(rels_xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut rel_type = String::new();
                let mut target = String::new();

                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                        _ => {}
                    }
                }

                if rel_type.contains("slideLayout") {
                    return Ok(target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing slide relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Err(Error::XmlError(
        "slide has no layout relationship".to_string(),
    ))
}

/// XML for a fresh slide part: an empty shape tree plus the master color
/// mapping, everything else inherited from the layout.
pub fn empty_slide_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\r\n",
        r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
        r#"<p:cSld><p:spTree>"#,
        r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
        r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
        r#"</p:spTree></p:cSld>"#,
        r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#,
        r#"</p:sld>"#
    )
    .to_string()
}

/// Rels part for a fresh slide pointing at `layout_target`.
pub fn slide_rels_xml(layout_target: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\r\n",
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="{}"/>"#,
            r#"</Relationships>"#
        ),
        quick_xml::escape::escape(layout_target)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>LEFTOVER TITLE</a:t></a:r></a:p></p:txBody></p:sp><p:pic><p:nvPicPr><p:cNvPr id="3" name="Logo"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr></p:pic></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#;

    #[test]
    fn test_rewrite_strips_shapes_and_splices_new_content() {
        let new_shape = r#"<p:sp><p:txBody><a:p><a:r><a:t>NEW</a:t></a:r></a:p></p:txBody></p:sp>"#;
        let out = rewrite_slide(SLIDE, new_shape).unwrap();

        assert!(!out.contains("LEFTOVER TITLE"));
        assert!(!out.contains("p:pic"));
        assert!(out.contains("NEW"));
        // Tree properties and everything outside the tree survive.
        assert!(out.contains("p:nvGrpSpPr"));
        assert!(out.contains("p:grpSpPr"));
        assert!(out.contains("a:masterClrMapping"));
        // New content lands inside the tree.
        let tree_close = out.find("</p:spTree>").unwrap();
        assert!(out.find("NEW").unwrap() < tree_close);
    }

    #[test]
    fn test_rewrite_with_empty_fragment_just_strips() {
        let out = rewrite_slide(SLIDE, "").unwrap();
        assert!(!out.contains("LEFTOVER TITLE"));
        assert!(out.contains("<p:spTree>"));
    }

    #[test]
    fn test_rewrite_without_shape_tree_fails() {
        let err = rewrite_slide("<p:sld><p:cSld/></p:sld>", "<p:sp/>").unwrap_err();
        assert!(matches!(err, Error::XmlError(_)));
    }

    #[test]
    fn test_layout_target() {
        let rels = slide_rels_xml("../slideLayouts/slideLayout2.xml");
        assert_eq!(
            layout_target(&rels).unwrap(),
            "../slideLayouts/slideLayout2.xml"
        );
    }

    #[test]
    fn test_layout_target_missing_fails() {
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide" Target="../notesSlides/notesSlide1.xml"/></Relationships>"#;
        assert!(layout_target(rels).is_err());
    }

    #[test]
    fn test_empty_slide_has_shape_tree_and_color_mapping() {
        let xml = empty_slide_xml();
        assert!(xml.contains("<p:spTree>"));
        assert!(xml.contains("<a:masterClrMapping/>"));
        // A fresh slide accepts a rewrite like any template slide.
        let out = rewrite_slide(&xml, "<p:sp/>").unwrap();
        assert!(out.contains("<p:sp/>"));
    }
}
