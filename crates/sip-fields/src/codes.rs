//! Method names and status-code classification used by passive counters.

/// Method tokens as they appear in request lines and CSeq headers.
pub mod methods {
    /// Dialog-initiating request.
    pub const INVITE: &str = "INVITE";
    /// Dialog-terminating request.
    pub const BYE: &str = "BYE";
}

/// Provisional "Trying" status token.
pub const TRYING: &str = "100";

/// Positive final status token.
pub const OK: &str = "200";

/// Coarse classification of a three-character status token.
///
/// Only the leading digit matters. Tokens that do not start with `1`..`6`
/// classify as [`StatusClass::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// 1xx
    Provisional,
    /// 2xx
    Success,
    /// 3xx
    Redirection,
    /// 4xx
    ClientError,
    /// 5xx
    ServerError,
    /// 6xx
    GlobalFailure,
    /// Empty or unrecognised token
    Unknown,
}

impl StatusClass {
    /// Classify a status token such as `"486"`.
    pub fn of(status_code: &str) -> Self {
        match status_code.as_bytes().first() {
            Some(b'1') => StatusClass::Provisional,
            Some(b'2') => StatusClass::Success,
            Some(b'3') => StatusClass::Redirection,
            Some(b'4') => StatusClass::ClientError,
            Some(b'5') => StatusClass::ServerError,
            Some(b'6') => StatusClass::GlobalFailure,
            _ => StatusClass::Unknown,
        }
    }

    /// True for any 3xx, 4xx, 5xx or 6xx class, i.e. an attempt that will
    /// not produce a dialog.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            StatusClass::Redirection
                | StatusClass::ClientError
                | StatusClass::ServerError
                | StatusClass::GlobalFailure
        )
    }
}
