//! # rvoip-sip-fields
//!
//! Lenient, allocation-free lookups of the handful of SIP fields a passive
//! observer needs: Call-ID, CSeq, the request method, the response status code
//! and whether the To header carries a dialog tag.
//!
//! Nothing here validates a message. Every lookup answers with a sentinel
//! (`""`, `-1`, `None`) when the field is absent or malformed so that callers
//! processing live traffic never abort on bad input.
//!
//! ```rust
//! use rvoip_sip_fields::{FieldExtractor, TextFieldExtractor};
//!
//! let msg = "SIP/2.0 100 Trying\r\n\
//!            Call-ID: a84b4c76e66710\r\n\
//!            CSeq: 314159 INVITE\r\n\
//!            To: Bob <sip:bob@biloxi.com>\r\n\r\n";
//!
//! let extractor = TextFieldExtractor::new();
//! assert!(extractor.is_response(msg));
//! assert_eq!(extractor.call_id(msg), "a84b4c76e66710");
//! assert_eq!(extractor.sequence(msg), (314159, "INVITE"));
//! assert_eq!(extractor.status_code(msg), "100");
//! assert_eq!(extractor.has_dialog_tag(msg), Some(false));
//! ```

pub mod codes;
pub mod extractor;
pub mod fields;

pub use codes::{methods, StatusClass};
pub use extractor::{FieldExtractor, TextFieldExtractor};
pub use fields::{MessageFields, Sequence};
