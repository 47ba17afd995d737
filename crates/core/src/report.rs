//! Fixed report wording.
//!
//! The deck serves one organizational workflow and its wording is part of
//! the template design; none of these strings are configurable.

use crate::types::FeedbackPayload;

/// Headline on the title slide.
pub const REPORT_TITLE: &str = "الخطة التصحيحية لملاحظات الزائر السري";

/// Substitute for any name the intake form left blank.
pub const PLACEHOLDER: &str = "غير محدد";

/// Note-table column headers: status, corrective plan, observation.
pub const TABLE_HEADERS: [&str; 3] = ["الحالة", "الخطة التصحيحية", "الملاحظة"];

/// Display key for one (category, subcategory) pair.
pub fn group_key(category: &str, sub_category: &str) -> String {
    format!("{} ( {} )", category, sub_category)
}

/// Full text of one observation cell.
pub fn observation_line(category: &str, sub_category: &str, observation: &str) -> String {
    format!("في {} {}", group_key(category, sub_category), observation)
}

/// The two subtitle lines under the headline: facility, then ticket.
pub fn subtitle_lines(payload: &FeedbackPayload) -> [String; 2] {
    [
        payload
            .hospital
            .clone()
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        payload
            .ticket_id
            .clone()
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
    ]
}

/// Suggested download filename for the generated deck.
///
/// A missing ticket leaves the suffix empty rather than inserting the
/// placeholder, matching the intake frontend's expectations.
pub fn report_filename(ticket_id: Option<&str>) -> String {
    format!("تحليل_الزائر_السري_{}.pptx", ticket_id.unwrap_or(""))
}
