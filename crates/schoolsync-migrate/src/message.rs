//! Message repair: canonical `body` and `sentAt`, plus the direct-message
//! `conversationKey`.

use crate::timestamp::to_timestamp;
use schoolsync_store::{FieldValue, Fields, Patch, field_is_blank};

pub const BODY: &str = "body";
pub const LEGACY_TEXT: &str = "text";
pub const SENT_AT: &str = "sentAt";
pub const LEGACY_TIMESTAMP: &str = "timestamp";
pub const SENDER_ID: &str = "senderId";
pub const RECIPIENT_ID: &str = "recipientId";
pub const CONVERSATION_KEY: &str = "conversationKey";

/// Order-independent key of a two-party conversation.
///
/// The lexicographically smaller ID comes first, so both participants map to
/// the same key.
pub fn conversation_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}_{b}")
    } else {
        format!("{b}_{a}")
    }
}

/// Derive the patch for one message; the three rules are independent.
pub fn normalize_message(fields: &Fields) -> Patch {
    let mut patch = Patch::new();

    if field_is_blank(fields.get(BODY))
        && let Some(text) = present(fields, LEGACY_TEXT)
    {
        patch.set(BODY, text.to_display_string());
    }

    if field_is_blank(fields.get(SENT_AT))
        && let Some(sent_at) = to_timestamp(fields.get(LEGACY_TIMESTAMP))
    {
        patch.set(SENT_AT, sent_at);
    }

    // Without a sender the key cannot be paired; such messages stay as they are.
    if field_is_blank(fields.get(CONVERSATION_KEY))
        && let Some(recipient) = present(fields, RECIPIENT_ID)
        && let Some(sender) = present(fields, SENDER_ID)
    {
        patch.set(
            CONVERSATION_KEY,
            conversation_key(&sender.to_display_string(), &recipient.to_display_string()),
        );
    }

    patch
}

fn present<'a>(fields: &'a Fields, name: &str) -> Option<&'a FieldValue> {
    fields.get(name).filter(|value| !value.is_blank())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::RAW_SECONDS;
    use schoolsync_store::{Document, Timestamp};

    #[test]
    fn conversation_key_is_symmetric() {
        assert_eq!(conversation_key("U1", "U2"), "U1_U2");
        assert_eq!(conversation_key("U2", "U1"), "U1_U2");
        assert_eq!(conversation_key("same", "same"), "same_same");
    }

    #[test]
    fn body_is_backfilled_from_legacy_text() {
        let doc = Document::new("m1").field(LEGACY_TEXT, "hello");
        let patch = normalize_message(&doc.fields);
        assert_eq!(patch.value(BODY), Some(&FieldValue::string("hello")));
    }

    #[test]
    fn non_string_text_uses_string_form() {
        let doc = Document::new("m1").field(LEGACY_TEXT, 42_i64);
        let patch = normalize_message(&doc.fields);
        assert_eq!(patch.value(BODY), Some(&FieldValue::string("42")));
    }

    #[test]
    fn existing_body_is_kept() {
        let doc = Document::new("m1")
            .field(BODY, "new")
            .field(LEGACY_TEXT, "old");
        assert!(normalize_message(&doc.fields).is_empty());
    }

    #[test]
    fn sent_at_is_converted_from_legacy_string() {
        let doc = Document::new("m1").field(LEGACY_TIMESTAMP, "2024-01-15T10:00:00Z");
        let patch = normalize_message(&doc.fields);
        let expected = Timestamp::parse_rfc3339("2024-01-15T10:00:00Z").expect("valid");
        assert_eq!(patch.value(SENT_AT), Some(&FieldValue::Timestamp(expected)));
    }

    #[test]
    fn sent_at_is_rebuilt_from_raw_seconds() {
        let mut raw = Fields::new();
        raw.insert(RAW_SECONDS.to_string(), FieldValue::Integer(1_705_312_800));
        let doc = Document::new("m1").field(LEGACY_TIMESTAMP, FieldValue::Map(raw));
        let patch = normalize_message(&doc.fields);
        assert!(matches!(
            patch.value(SENT_AT),
            Some(FieldValue::Timestamp(ts)) if ts.seconds() == 1_705_312_800
        ));
    }

    #[test]
    fn unconvertible_legacy_timestamp_sets_nothing() {
        let doc = Document::new("m1").field(LEGACY_TIMESTAMP, "someday");
        assert!(normalize_message(&doc.fields).is_empty());
    }

    #[test]
    fn conversation_key_needs_sender_and_recipient() {
        let doc = Document::new("m1")
            .field(SENDER_ID, "U2")
            .field(RECIPIENT_ID, "U1");
        let patch = normalize_message(&doc.fields);
        assert_eq!(
            patch.value(CONVERSATION_KEY),
            Some(&FieldValue::string("U1_U2"))
        );

        let no_sender = Document::new("m2").field(RECIPIENT_ID, "U1");
        assert!(normalize_message(&no_sender.fields).is_empty());

        let broadcast = Document::new("m3").field(SENDER_ID, "U1");
        assert!(normalize_message(&broadcast.fields).is_empty());
    }

    #[test]
    fn existing_conversation_key_is_kept() {
        let doc = Document::new("m1")
            .field(SENDER_ID, "U2")
            .field(RECIPIENT_ID, "U1")
            .field(CONVERSATION_KEY, "custom");
        assert!(normalize_message(&doc.fields).is_empty());
    }

    #[test]
    fn rules_merge_into_one_idempotent_patch() {
        let mut doc = Document::new("m1")
            .field(LEGACY_TEXT, "hi")
            .field(LEGACY_TIMESTAMP, "2024-01-15")
            .field(SENDER_ID, "b")
            .field(RECIPIENT_ID, "a");
        let patch = normalize_message(&doc.fields);
        assert_eq!(patch.len(), 3);

        doc.merge(&patch, Timestamp::now());
        assert!(normalize_message(&doc.fields).is_empty());
    }
}
