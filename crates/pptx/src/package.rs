//! In-memory PPTX package I/O.

use deck_core::{Error, Result};
use std::io::{Cursor, Read, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// One file inside the package.
#[derive(Debug, Clone)]
pub struct Part {
    /// Archive path, e.g. `ppt/slides/slide1.xml`.
    pub name: String,
    pub data: Vec<u8>,
}

/// A PPTX package held fully in memory.
///
/// Every part is read up front and kept in archive order, so the template
/// file on disk is never written and a rewritten package keeps its parts
/// in a stable, deterministic order.
#[derive(Debug, Clone, Default)]
pub struct PptxPackage {
    parts: Vec<Part>,
}

impl PptxPackage {
    /// Read a package from anything seekable.
    pub fn open<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }

            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.push(Part {
                name: file.name().to_string(),
                data,
            });
        }

        Ok(Self { parts })
    }

    /// Raw content of a part, if present.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }

    /// Content of a part as UTF-8 XML.
    ///
    /// Fails with [`Error::MissingPart`] when absent; the caller names the
    /// parts it relies on, so a hit here means the template is unusable.
    pub fn xml(&self, name: &str) -> Result<&str> {
        let data = self
            .part(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))?;
        std::str::from_utf8(data)
            .map_err(|e| Error::XmlError(format!("{} is not valid UTF-8: {}", name, e)))
    }

    /// Replace a part's content, appending the part when absent.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
            }),
        }
    }

    pub fn remove_part(&mut self, name: &str) {
        self.parts.retain(|p| p.name != name);
    }

    /// Next free number for a `ppt/slides/slideN.xml` part name.
    pub fn next_slide_number(&self) -> usize {
        self.parts
            .iter()
            .filter_map(|p| {
                p.name
                    .strip_prefix("ppt/slides/slide")?
                    .strip_suffix(".xml")?
                    .parse::<usize>()
                    .ok()
            })
            .max()
            .map_or(1, |n| n + 1)
    }

    /// Serialize the package to .pptx bytes (deflated ZIP).
    ///
    /// Entry timestamps are pinned to the DOS epoch; the same parts always
    /// serialize to the same bytes.
    pub fn write_to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        for part in &self.parts {
            writer
                .start_file(part.name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", part.name, e)))?;
            writer.write_all(&part.data)?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove_part() {
        let mut package = PptxPackage::default();
        package.set_part("a.xml", b"<a/>".to_vec());
        package.set_part("b.xml", b"<b/>".to_vec());

        assert_eq!(package.part("a.xml"), Some(b"<a/>".as_slice()));
        assert!(package.has_part("b.xml"));
        assert!(package.part("c.xml").is_none());

        package.set_part("a.xml", b"<a2/>".to_vec());
        assert_eq!(package.xml("a.xml").unwrap(), "<a2/>");

        package.remove_part("a.xml");
        assert!(!package.has_part("a.xml"));
    }

    #[test]
    fn test_xml_missing_part_is_error() {
        let package = PptxPackage::default();
        let err = package.xml("ppt/presentation.xml").unwrap_err();
        assert!(matches!(err, Error::MissingPart(_)));
    }

    #[test]
    fn test_round_trip_preserves_order_and_content() {
        let mut package = PptxPackage::default();
        package.set_part("[Content_Types].xml", b"<Types/>".to_vec());
        package.set_part("ppt/presentation.xml", b"<p/>".to_vec());
        package.set_part("ppt/slides/slide1.xml", "نص عربي".as_bytes().to_vec());

        let bytes = package.write_to_bytes().unwrap();
        let reopened = PptxPackage::open(Cursor::new(bytes)).unwrap();

        let names: Vec<&str> = reopened.parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "[Content_Types].xml",
                "ppt/presentation.xml",
                "ppt/slides/slide1.xml"
            ]
        );
        assert_eq!(reopened.xml("ppt/slides/slide1.xml").unwrap(), "نص عربي");
    }

    #[test]
    fn test_written_entries_carry_the_pinned_timestamp() {
        let mut package = PptxPackage::default();
        package.set_part("ppt/presentation.xml", b"<p/>".to_vec());
        package.set_part("ppt/slides/slide1.xml", b"<sld/>".to_vec());

        // Wall-clock stamps would make identical content serialize to
        // different bytes from one second to the next.
        let bytes = package.write_to_bytes().unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let pinned = DateTime::default();
        for i in 0..archive.len() {
            let stamp = archive.by_index(i).unwrap().last_modified();
            assert_eq!(stamp.datepart(), pinned.datepart());
            assert_eq!(stamp.timepart(), pinned.timepart());
        }
    }

    #[test]
    fn test_open_rejects_garbage() {
        let err = PptxPackage::open(Cursor::new(b"not a zip".to_vec())).unwrap_err();
        assert!(matches!(err, Error::ZipError(_)));
    }

    #[test]
    fn test_next_slide_number() {
        let mut package = PptxPackage::default();
        assert_eq!(package.next_slide_number(), 1);

        package.set_part("ppt/slides/slide1.xml", Vec::new());
        package.set_part("ppt/slides/slide7.xml", Vec::new());
        package.set_part("ppt/slides/_rels/slide7.xml.rels", Vec::new());
        assert_eq!(package.next_slide_number(), 8);
    }
}
