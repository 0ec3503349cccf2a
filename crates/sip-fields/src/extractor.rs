//! Field extraction over raw message text.
//!
//! [`FieldExtractor`] is the seam between a session counter and whatever
//! knows how to read a SIP message. [`TextFieldExtractor`] is the default:
//! a line scanner over the header block that tolerates bare `\n` line ends,
//! compact header names and any header-name casing.

/// Protocol signature that opens every response start line.
const SIP_VERSION: &str = "SIP/2.0";

/// Read-only lookups of the fields a passive counter needs.
///
/// Implementations must be pure and must never fail: absent or malformed
/// fields are reported with the documented sentinels.
pub trait FieldExtractor {
    /// Call-ID header value, or `""` when absent.
    fn call_id<'a>(&self, message: &'a str) -> &'a str;

    /// CSeq number and method.
    ///
    /// `(-1, "")` if the header is missing or malformed, `(0, method)` if it
    /// carries a single token.
    fn sequence<'a>(&self, message: &'a str) -> (i64, &'a str);

    /// Leading token of a request line; `""` for responses.
    fn method<'a>(&self, message: &'a str) -> &'a str;

    /// Three-character status token of a response start line, or `""`.
    fn status_code<'a>(&self, message: &'a str) -> &'a str;

    /// True iff the start line is a status line.
    fn is_response(&self, message: &str) -> bool;

    fn is_request(&self, message: &str) -> bool {
        !self.is_response(message)
    }

    /// `Some(true)` if the To header has a `tag` parameter, `Some(false)` if
    /// it has none, `None` if there is no To header at all.
    fn has_dialog_tag(&self, message: &str) -> Option<bool>;
}

/// Line-scanning [`FieldExtractor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFieldExtractor;

impl TextFieldExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for TextFieldExtractor {
    fn call_id<'a>(&self, message: &'a str) -> &'a str {
        header_value(message, "Call-ID", "i").unwrap_or("")
    }

    fn sequence<'a>(&self, message: &'a str) -> (i64, &'a str) {
        let Some(value) = header_value(message, "CSeq", "") else {
            return (-1, "");
        };

        let mut tokens = value.split_whitespace();
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(number), Some(method), None) => match number.parse::<i64>() {
                Ok(number) => (number, method),
                Err(_) => (-1, ""),
            },
            (Some(method), None, None) => (0, method),
            _ => (-1, ""),
        }
    }

    fn method<'a>(&self, message: &'a str) -> &'a str {
        if self.is_response(message) {
            return "";
        }
        start_line(message).split_whitespace().next().unwrap_or("")
    }

    fn status_code<'a>(&self, message: &'a str) -> &'a str {
        if !self.is_response(message) {
            return "";
        }
        match start_line(message).split_whitespace().nth(1) {
            Some(code) if code.chars().count() == 3 => code,
            _ => "",
        }
    }

    fn is_response(&self, message: &str) -> bool {
        start_line(message)
            .strip_prefix(SIP_VERSION)
            .map_or(false, |rest| rest.starts_with([' ', '\t']))
    }

    fn has_dialog_tag(&self, message: &str) -> Option<bool> {
        header_value(message, "To", "t").map(has_tag_param)
    }
}

/// First non-empty line of the message, without its line ending.
fn start_line(message: &str) -> &str {
    message
        .trim_start_matches(['\r', '\n'])
        .lines()
        .next()
        .unwrap_or("")
}

/// Header lines between the start line and the blank line before the body.
fn header_lines(message: &str) -> impl Iterator<Item = &str> {
    message
        .trim_start_matches(['\r', '\n'])
        .lines()
        .skip(1)
        .take_while(|line| !line.is_empty())
}

/// Trimmed value of the first header named `name` (or its compact form).
/// An empty `compact` disables the compact match.
fn header_value<'a>(message: &'a str, name: &str, compact: &str) -> Option<&'a str> {
    header_lines(message).find_map(|line| {
        let (header, value) = line.split_once(':')?;
        let header = header.trim_end();
        let matches = header.eq_ignore_ascii_case(name)
            || (!compact.is_empty() && header.eq_ignore_ascii_case(compact));
        matches.then(|| value.trim())
    })
}

/// Whether a To/From header value carries a `tag` header parameter.
///
/// Parameters inside `<...>` belong to the URI and are ignored.
fn has_tag_param(value: &str) -> bool {
    let params = match value.rfind('>') {
        Some(end) => &value[end + 1..],
        None => value,
    };
    params
        .split(';')
        .skip(1)
        .map(|param| param.split('=').next().unwrap_or("").trim())
        .any(|name| name.eq_ignore_ascii_case("tag"))
}
