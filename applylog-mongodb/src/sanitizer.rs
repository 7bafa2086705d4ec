//! Field-name sanitization for MongoDB compatibility.
//!
//! MongoDB restricts field names (keys) from containing certain characters like dots
//! and dollar signs, which are part of its query syntax. Keys are escaped on the way in
//! and restored on the way out. Values are stored verbatim.

use bson::{Bson, Document};


/// Sanitizes and restores document keys to handle MongoDB field name restrictions.
///
/// MongoDB does not allow field names (document keys) to contain:
/// - Dots (`.`) - used for nested field access in queries
/// - Dollar signs (`$`) - used for operators in queries
/// - Null bytes (`\0`) - field name terminators
pub(crate) struct KeySanitizer;

impl KeySanitizer {
    /// Character replacements for sanitization
    const REPLACEMENTS: [(&'static str, &'static str); 3] = [
        (".", "__dot__"),
        ("$", "__dollar__"),
        ("\0", "__null__"),
    ];

    /// Recursively escapes the keys of `document` and of every nested document.
    pub(crate) fn sanitize_document(document: Document) -> Document {
        document
            .into_iter()
            .map(|(k, v)| (Self::sanitize_key(&k), Self::map_nested(v, Self::sanitize_document)))
            .collect()
    }

    /// Inverse of [`sanitize_document`](Self::sanitize_document).
    pub(crate) fn restore_document(document: Document) -> Document {
        document
            .into_iter()
            .map(|(k, v)| (Self::restore_key(&k), Self::map_nested(v, Self::restore_document)))
            .collect()
    }

    fn map_nested(value: Bson, f: fn(Document) -> Document) -> Bson {
        match value {
            Bson::Document(doc) => Bson::Document(f(doc)),
            Bson::Array(arr) => Bson::Array(
                arr
                    .into_iter()
                    .map(|item| Self::map_nested(item, f))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Replaces problematic characters in a single key.
    pub(crate) fn sanitize_key(input: &str) -> String {
        let mut sanitized = input.to_string();
        for (target, replacement) in Self::REPLACEMENTS.iter() {
            sanitized = sanitized.replace(*target, *replacement);
        }
        sanitized
    }

    pub(crate) fn restore_key(input: &str) -> String {
        let mut restored = input.to_string();
        for (target, replacement) in Self::REPLACEMENTS.iter().rev() {
            restored = restored.replace(*replacement, *target);
        }
        restored
    }
}
