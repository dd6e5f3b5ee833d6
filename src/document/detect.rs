use crate::document::{Format, PageContainer};
use serde_json::Value;

/// Return the first matching format in priority order
/// (structured data, message, page document), or `Format::Unknown`.
///
/// Detection never fails: undecodable or unparsable input is a non-match.
pub fn detect_format(bytes: &[u8]) -> Format {
    if is_structured_data(bytes) {
        Format::StructuredData
    } else if is_message(bytes) {
        Format::Message
    } else if is_page_document(bytes) {
        Format::PageDocument
    } else {
        Format::Unknown
    }
}

/// UTF-8 text that parses fully as a JSON object or array.
pub fn is_structured_data(bytes: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return false;
    };
    serde_json::from_str::<Value>(text).is_ok_and(|value| value.is_object() || value.is_array())
}

/// UTF-8 text with a `From:` or `Subject:` header line and an `@` somewhere.
pub fn is_message(bytes: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return false;
    };
    text.contains('@')
        && text
            .lines()
            .any(|line| line.starts_with("From:") || line.starts_with("Subject:"))
}

/// Bytes that open as a PDF container without structural error.
pub fn is_page_document(bytes: &[u8]) -> bool {
    PageContainer::load(bytes).is_ok()
}
