//! Grade repair: `recordedAt` stored as a date string becomes a timestamp.

use crate::timestamp::parse_date_string;
use schoolsync_store::{FieldValue, Fields, Patch};

pub const RECORDED_AT: &str = "recordedAt";

pub fn normalize_grade(fields: &Fields) -> Patch {
    let mut patch = Patch::new();
    if let Some(FieldValue::String(raw)) = fields.get(RECORDED_AT)
        && let Some(recorded_at) = parse_date_string(raw)
    {
        patch.set(RECORDED_AT, recorded_at);
    }
    patch
}
