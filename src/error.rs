use thiserror::Error;

/// Failure while turning text or integers into addresses and ranges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Text does not follow the grammar of the attempted parse.
    #[error("invalid format: {0}")]
    Format(String),
    /// A syntactically valid number lies outside its legal bound.
    #[error("out of range: {0}")]
    Range(String),
}

impl Error {
    pub(crate) fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format(msg.into())
    }

    pub(crate) fn range<S: Into<String>>(msg: S) -> Self {
        Error::Range(msg.into())
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Error::Range(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
