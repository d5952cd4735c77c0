//! Account repair: `kind` from the legacy `profile` label, and
//! `groupMemberships` as a sequence.

use schoolsync_store::{FieldValue, Fields, Patch, field_is_blank};

pub const KIND: &str = "kind";
pub const PROFILE: &str = "profile";
pub const GROUP_MEMBERSHIPS: &str = "groupMemberships";

/// Derive the patch that brings one account into canonical shape.
pub fn normalize_account(fields: &Fields) -> Patch {
    let mut patch = Patch::new();

    if field_is_blank(fields.get(KIND))
        && let Some(profile) = fields.get(PROFILE).and_then(FieldValue::as_str)
        && !profile.is_empty()
    {
        patch.set(KIND, profile.to_lowercase());
    }

    if let Some(raw) = fields.get(GROUP_MEMBERSHIPS).and_then(FieldValue::as_str) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            patch.set(
                GROUP_MEMBERSHIPS,
                FieldValue::Array(vec![FieldValue::string(trimmed)]),
            );
        }
    }

    patch
}
