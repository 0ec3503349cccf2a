//! Borrowed views over the fields pulled out of one message.

use std::fmt;

use serde::Serialize;

use crate::extractor::FieldExtractor;

/// CSeq number and method pair.
///
/// A missing or malformed CSeq header yields [`Sequence::MISSING`]
/// (`-1`, `""`). A header carrying only a method token yields number `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Sequence<'a> {
    pub number: i64,
    pub method: &'a str,
}

impl<'a> Sequence<'a> {
    /// Sentinel for an absent or unparsable CSeq header.
    pub const MISSING: Sequence<'static> = Sequence { number: -1, method: "" };

    pub fn new(number: i64, method: &'a str) -> Self {
        Self { number, method }
    }

    pub fn is_missing(&self) -> bool {
        self.number == -1 && self.method.is_empty()
    }
}

impl PartialEq<(i64, &str)> for Sequence<'_> {
    fn eq(&self, other: &(i64, &str)) -> bool {
        self.number == other.0 && self.method == other.1
    }
}

impl fmt::Display for Sequence<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.method)
    }
}

/// Every field a session counter consults, extracted in one pass.
///
/// For responses `method` is empty; the CSeq method is the authoritative
/// method name of the transaction a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MessageFields<'a> {
    pub is_response: bool,
    pub call_id: &'a str,
    pub sequence: Sequence<'a>,
    pub method: &'a str,
    pub status_code: &'a str,
    pub dialog_tag: Option<bool>,
}

impl<'a> MessageFields<'a> {
    /// Run every lookup of `extractor` against `message`.
    pub fn extract<E>(extractor: &E, message: &'a str) -> Self
    where
        E: FieldExtractor + ?Sized,
    {
        let is_response = extractor.is_response(message);
        let (number, seq_method) = extractor.sequence(message);

        let fields = Self {
            is_response,
            call_id: extractor.call_id(message),
            sequence: Sequence::new(number, seq_method),
            method: extractor.method(message),
            status_code: extractor.status_code(message),
            dialog_tag: extractor.has_dialog_tag(message),
        };

        tracing::trace!(
            "Extracted fields: response={} call_id={:?} cseq={} status={:?} tag={:?}",
            fields.is_response, fields.call_id, fields.sequence, fields.status_code, fields.dialog_tag
        );

        fields
    }

    /// True when the To header carries a tag. An absent To header counts as
    /// "no tag".
    pub fn in_dialog(&self) -> bool {
        self.dialog_tag.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextFieldExtractor;

    #[test]
    fn test_missing_sequence_sentinel() {
        assert!(Sequence::MISSING.is_missing());
        assert!(!Sequence::new(0, "INVITE").is_missing());
        assert_eq!(Sequence::MISSING, (-1, ""));
    }

    #[test]
    fn test_extract_response_fields() {
        let msg = "SIP/2.0 486 Busy Here\r\n\
                   Call-ID: busy@host\r\n\
                   CSeq: 7 INVITE\r\n\
                   To: <sip:bob@example.com>;tag=xyz\r\n\r\n";
        let fields = MessageFields::extract(&TextFieldExtractor::new(), msg);

        assert!(fields.is_response);
        assert_eq!(fields.call_id, "busy@host");
        assert_eq!(fields.sequence, Sequence::new(7, "INVITE"));
        assert_eq!(fields.method, "");
        assert_eq!(fields.status_code, "486");
        assert_eq!(fields.dialog_tag, Some(true));
        assert!(fields.in_dialog());
    }

    #[test]
    fn test_in_dialog_without_to_header() {
        let msg = "SIP/2.0 100 Trying\r\nCall-ID: x\r\n\r\n";
        let fields = MessageFields::extract(&TextFieldExtractor::new(), msg);
        assert_eq!(fields.dialog_tag, None);
        assert!(!fields.in_dialog());
    }
}
