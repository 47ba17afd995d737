//! Shape XML builders for the report slides.
//!
//! All geometry is fixed by the report design. Positions and sizes are
//! authored in inches and serialized as EMU; font sizes are serialized in
//! hundredths of a point. Every piece of user text goes through
//! `quick_xml::escape::escape` on its way into a run.

use quick_xml::escape::escape;

/// English Metric Units per inch, the native PPTX coordinate unit.
pub const EMU_PER_INCH: i64 = 914_400;

/// Report font for every run.
const FONT: &str = "Calibri";

/// Header row fill, a solid dark blue.
const HEADER_FILL: &str = "4472C4";
/// Banded fill for odd data rows (1-based), a light blue tint.
const BAND_FILL: &str = "D9E1F2";
const WHITE: &str = "FFFFFF";
const BLACK: &str = "000000";

/// Convert inches to EMU.
pub fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH as f64).round() as i64
}

/// Table height tier for a group: more notes get a taller frame, in four
/// fixed steps.
pub fn table_height(notes: usize) -> i64 {
    if notes <= 3 {
        emu(1.5)
    } else if notes <= 6 {
        emu(2.5)
    } else if notes <= 9 {
        emu(3.5)
    } else {
        emu(4.0)
    }
}

/// Title and subtitle text boxes for the opening slide.
///
/// The headline is large and bold; the subtitle box carries the facility
/// and ticket lines below it. Both are centered.
pub fn title_shapes(title: &str, subtitle_lines: &[String; 2]) -> String {
    let mut xml = centered_text_box(
        2,
        "Report Title",
        emu(1.5),
        emu(2.5),
        emu(10.0),
        emu(1.5),
        &[title],
        4000,
        true,
    );
    xml.push_str(&centered_text_box(
        3,
        "Report Subtitle",
        emu(1.5),
        emu(4.2),
        emu(10.0),
        emu(1.0),
        &[subtitle_lines[0].as_str(), subtitle_lines[1].as_str()],
        2400,
        false,
    ));
    xml
}

/// A plain text box, one centered paragraph per line.
#[allow(clippy::too_many_arguments)]
fn centered_text_box(
    id: u32,
    name: &str,
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
    lines: &[&str],
    size: u32,
    bold: bool,
) -> String {
    let mut xml = format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
            r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#,
            r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0"/><a:lstStyle/>"#
        ),
        id, name, x, y, cx, cy
    );
    for line in lines {
        xml.push_str(&text_paragraph("ctr", line, size, bold, None));
    }
    xml.push_str("</p:txBody></p:sp>");
    xml
}

/// The note table for one group: a styled header row plus one banded row
/// per observation. `observations` holds the composed observation cell
/// texts; status and plan cells start blank for the review meeting.
pub fn note_table(id: u32, observations: &[String]) -> String {
    let height = table_height(observations.len());
    let rows = observations.len() as i64 + 1;
    // Height is split evenly over the rows, as a hint renderers may grow.
    let row_height = height / rows;

    let mut xml = format!(
        concat!(
            r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{}" name="Notes Table"/>"#,
            r#"<p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr>"#,
            r#"<p:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></p:xfrm>"#,
            r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table">"#,
            r#"<a:tbl><a:tblPr firstRow="1" bandRow="1"/>"#,
            r#"<a:tblGrid><a:gridCol w="{}"/><a:gridCol w="{}"/><a:gridCol w="{}"/></a:tblGrid>"#
        ),
        id,
        emu(1.5),
        emu(2.0),
        emu(9.0),
        height,
        emu(0.8),
        emu(2.0),
        emu(8.5)
    );

    xml.push_str(&format!(r#"<a:tr h="{}">"#, row_height));
    for header in deck_core::report::TABLE_HEADERS {
        xml.push_str(&header_cell(header));
    }
    xml.push_str("</a:tr>");

    for (row, observation) in observations.iter().enumerate() {
        let fill = if (row + 1) % 2 == 1 { BAND_FILL } else { WHITE };
        xml.push_str(&format!(r#"<a:tr h="{}">"#, row_height));
        xml.push_str(&blank_cell(fill));
        xml.push_str(&blank_cell(fill));
        xml.push_str(&observation_cell(observation, fill));
        xml.push_str("</a:tr>");
    }

    xml.push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");
    xml
}

/// Header cell: centered bold white text on the solid header fill, tight
/// margins, vertically centered.
fn header_cell(text: &str) -> String {
    format!(
        concat!(
            r#"<a:tc><a:txBody><a:bodyPr/><a:lstStyle/>{}</a:txBody>"#,
            r#"<a:tcPr marL="{m}" marR="{m}" marT="{m}" marB="{m}" anchor="ctr">"#,
            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:tcPr></a:tc>"#
        ),
        text_paragraph("ctr", text, 1800, true, Some(WHITE)),
        HEADER_FILL,
        m = emu(0.05)
    )
}

/// Status/plan cell: empty, centered, banded fill.
fn blank_cell(fill: &str) -> String {
    format!(
        concat!(
            r#"<a:tc><a:txBody><a:bodyPr/><a:lstStyle/>"#,
            r#"<a:p><a:pPr algn="ctr"/><a:endParaRPr lang="ar-SA"/></a:p></a:txBody>"#,
            r#"<a:tcPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:tcPr></a:tc>"#
        ),
        fill
    )
}

/// Observation cell: right-aligned wrapped black text, vertically
/// centered, wider side margins than the header.
fn observation_cell(text: &str, fill: &str) -> String {
    format!(
        concat!(
            r#"<a:tc><a:txBody><a:bodyPr wrap="square"/><a:lstStyle/>{}</a:txBody>"#,
            r#"<a:tcPr marL="{lr}" marR="{lr}" marT="{tb}" marB="{tb}" anchor="ctr">"#,
            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:tcPr></a:tc>"#
        ),
        text_paragraph("r", text, 1400, false, Some(BLACK)),
        fill,
        lr = emu(0.1),
        tb = emu(0.05)
    )
}

/// One paragraph holding one run.
fn text_paragraph(align: &str, text: &str, size: u32, bold: bool, color: Option<&str>) -> String {
    let bold_attr = if bold { r#" b="1""# } else { "" };
    let fill = color.map_or_else(String::new, |c| {
        format!(r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, c)
    });
    format!(
        concat!(
            r#"<a:p><a:pPr algn="{}"/><a:r>"#,
            r#"<a:rPr lang="ar-SA" sz="{}"{} dirty="0">{}<a:latin typeface="{f}"/><a:cs typeface="{f}"/></a:rPr>"#,
            r#"<a:t>{}</a:t></a:r></a:p>"#
        ),
        align,
        size,
        bold_attr,
        fill,
        escape(text),
        f = FONT
    )
}
