//! Group repair: every group carries a top-level `ownerId`.

use schoolsync_store::{FieldValue, Fields, Patch};

pub const OWNER_ID: &str = "ownerId";
pub const SUBJECTS: &str = "subjects";

/// Derive the patch for one group.
///
/// A missing or null `ownerId` is taken from the first subject when it
/// names one, and set to `""` otherwise. An existing empty string marks a
/// group that was already checked and is left alone.
pub fn normalize_group(fields: &Fields) -> Patch {
    let mut patch = Patch::new();
    if matches!(fields.get(OWNER_ID), None | Some(FieldValue::Null)) {
        patch.set(OWNER_ID, first_subject_owner(fields).unwrap_or_default());
    }
    patch
}

/// Owner IDs written by older clients may be numbers; they are stored back
/// in string form.
fn first_subject_owner(fields: &Fields) -> Option<String> {
    let first = fields.get(SUBJECTS)?.as_array()?.first()?;
    let owner = first.as_map()?.get(OWNER_ID)?;
    (!owner.is_blank()).then(|| owner.to_display_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use schoolsync_store::{Document, Timestamp};

    fn subject(owner: Option<&str>) -> FieldValue {
        let mut map = Fields::new();
        map.insert("name".to_string(), FieldValue::string("Math"));
        if let Some(owner) = owner {
            map.insert(OWNER_ID.to_string(), FieldValue::string(owner));
        }
        FieldValue::Map(map)
    }

    #[test]
    fn owner_is_taken_from_first_subject() {
        let doc = Document::new("g1").field(
            SUBJECTS,
            FieldValue::Array(vec![subject(Some("P1")), subject(Some("P2"))]),
        );
        let patch = normalize_group(&doc.fields);
        assert_eq!(patch.value(OWNER_ID), Some(&FieldValue::string("P1")));
    }

    #[test]
    fn missing_subjects_mark_owner_unknown() {
        let doc = Document::new("g1");
        let patch = normalize_group(&doc.fields);
        assert_eq!(patch.value(OWNER_ID), Some(&FieldValue::string("")));

        let empty = Document::new("g2").field(SUBJECTS, FieldValue::Array(Vec::new()));
        assert_eq!(
            normalize_group(&empty.fields).value(OWNER_ID),
            Some(&FieldValue::string(""))
        );
    }

    #[test]
    fn first_subject_without_owner_marks_unknown() {
        let doc = Document::new("g1").field(
            SUBJECTS,
            FieldValue::Array(vec![subject(None), subject(Some("P2"))]),
        );
        assert_eq!(
            normalize_group(&doc.fields).value(OWNER_ID),
            Some(&FieldValue::string(""))
        );
    }

    #[test]
    fn numeric_subject_owner_is_stored_as_string() {
        let mut numeric = Fields::new();
        numeric.insert(OWNER_ID.to_string(), FieldValue::Integer(4021));
        let doc = Document::new("g1").field(
            SUBJECTS,
            FieldValue::Array(vec![FieldValue::Map(numeric)]),
        );
        assert_eq!(
            normalize_group(&doc.fields).value(OWNER_ID),
            Some(&FieldValue::string("4021"))
        );

        let mut zero = Fields::new();
        zero.insert(OWNER_ID.to_string(), FieldValue::Integer(0));
        let blank = Document::new("g2").field(
            SUBJECTS,
            FieldValue::Array(vec![FieldValue::Map(zero)]),
        );
        assert_eq!(
            normalize_group(&blank.fields).value(OWNER_ID),
            Some(&FieldValue::string(""))
        );
    }

    #[test]
    fn null_owner_counts_as_missing() {
        let doc = Document::new("g1").field(OWNER_ID, FieldValue::Null);
        assert!(!normalize_group(&doc.fields).is_empty());
    }

    #[test]
    fn present_owner_is_kept() {
        let doc = Document::new("g1").field(OWNER_ID, "P9");
        assert!(normalize_group(&doc.fields).is_empty());
    }

    #[test]
    fn unknown_owner_marker_is_idempotent() {
        let mut doc = Document::new("g1");
        let patch = normalize_group(&doc.fields);
        doc.merge(&patch, Timestamp::now());
        assert_eq!(doc.get(OWNER_ID), Some(&FieldValue::string("")));
        assert!(normalize_group(&doc.fields).is_empty());
    }
}
