//! Report assembly: template in, finished deck out.
//!
//! The template's first slide becomes the title slide and its second
//! slide is the visual model for note slides. One note slide is produced
//! per group; extra slides are cloned from the second slide's layout and
//! unused template slides are removed along with every reference to them.

use crate::package::PptxPackage;
use crate::{presentation, shapes, slide};
use deck_core::{report, resolve_groups, Error, FeedbackPayload, NoteGroup, Result};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek};
use std::path::PathBuf;

/// A finished deck plus the metadata the transport layer needs.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    /// The .pptx file content.
    pub bytes: Vec<u8>,
    /// Suggested download filename, carrying the ticket id.
    pub filename: String,
    /// Slides in the deck: the title slide plus one per group.
    pub slide_count: usize,
}

/// Renders feedback payloads into decks based on one template file.
///
/// The builder holds only the template path; each build reads the
/// template fresh, so swapping the file on disk takes effect on the next
/// request.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    template_path: PathBuf,
}

impl ReportBuilder {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
        }
    }

    /// Validate `payload` and render its deck from the template file.
    ///
    /// Validation runs first, so a bad payload never costs a file read.
    pub fn build(&self, payload: &FeedbackPayload) -> Result<GeneratedReport> {
        let groups = resolve_groups(payload)?;
        let file = File::open(&self.template_path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::TemplateNotFound(self.template_path.clone())
            } else {
                Error::IoError(e)
            }
        })?;
        render_groups(BufReader::new(file), payload, &groups)
    }

    /// Same pipeline with the template supplied as a reader.
    pub fn build_from_reader<R: Read + Seek>(
        &self,
        template: R,
        payload: &FeedbackPayload,
    ) -> Result<GeneratedReport> {
        let groups = resolve_groups(payload)?;
        render_groups(template, payload, &groups)
    }
}

fn render_groups<R: Read + Seek>(
    template: R,
    payload: &FeedbackPayload,
    groups: &[NoteGroup],
) -> Result<GeneratedReport> {
    let mut package = PptxPackage::open(template)?;

    let rels =
        presentation::parse_relationships(package.xml(presentation::PRESENTATION_RELS_PART)?)?;
    let slides = presentation::slide_entries(package.xml(presentation::PRESENTATION_PART)?, &rels)?;
    if slides.len() < 2 {
        return Err(Error::TemplateTooSmall(slides.len()));
    }

    let title = shapes::title_shapes(report::REPORT_TITLE, &report::subtitle_lines(payload));
    let rewritten = slide::rewrite_slide(package.xml(&slides[0].part_name)?, &title)?;
    package.set_part(&slides[0].part_name, rewritten.into_bytes());

    // Cloned slides attach to the same layout as the template's note slide.
    let layout = slide::layout_target(
        package.xml(&presentation::rels_part_name(&slides[1].part_name))?,
    )?;

    let mut used = 1;
    for group in groups {
        let entry = if used < slides.len() {
            slides[used].clone()
        } else {
            presentation::add_slide(&mut package, &layout)?
        };

        let observations: Vec<String> = group
            .notes
            .iter()
            .map(|note| report::observation_line(&note.category, &note.sub_category, &note.observation))
            .collect();
        let table = shapes::note_table(2, &observations);
        let rewritten = slide::rewrite_slide(package.xml(&entry.part_name)?, &table)?;
        package.set_part(&entry.part_name, rewritten.into_bytes());
        used += 1;
    }

    for leftover in slides.iter().skip(used) {
        presentation::remove_slide(&mut package, leftover)?;
    }

    let bytes = package.write_to_bytes()?;
    log::debug!(
        "rendered {} note slide(s), {} bytes",
        groups.len(),
        bytes.len()
    );

    Ok(GeneratedReport {
        bytes,
        filename: report::report_filename(payload.ticket_id.as_deref()),
        slide_count: groups.len() + 1,
    })
}
