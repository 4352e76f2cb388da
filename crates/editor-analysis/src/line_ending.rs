//! Line ending helpers.
//!
//! Buffers and mirrored documents use LF (`'\n'`) only. Text coming from outside (file loads,
//! library sources) is normalized before registration, so that a CR never produces an offset
//! the line buffer does not see. A session remembers the ending a load used so the host can
//! write the text back the way it came in.

/// Newline sequence of a loaded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `'\n'`.
    #[default]
    Lf,
    /// `"\r\n"`.
    Crlf,
    /// A lone `'\r'`.
    Cr,
}

impl LineEnding {
    /// The ending of the first line break in `text`; [`LineEnding::Lf`] when there is none.
    pub fn detect_in_text(text: &str) -> Self {
        let bytes = text.as_bytes();
        match bytes.iter().position(|b| matches!(b, b'\r' | b'\n')) {
            Some(at) if bytes[at] == b'\n' => Self::Lf,
            Some(at) if bytes.get(at + 1) == Some(&b'\n') => Self::Crlf,
            Some(_) => Self::Cr,
            None => Self::Lf,
        }
    }

    /// Convert LF-normalized `text` to this ending.
    pub fn apply_to_text(self, text: &str) -> String {
        match self {
            Self::Lf => text.to_string(),
            other => text.replace('\n', other.as_str()),
        }
    }

    /// The newline sequence.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
            Self::Cr => "\r",
        }
    }
}

/// Replace every `"\r\n"` and lone `'\r'` with `'\n'`.
pub fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}
