use std::borrow::Cow;

/// All kinds of errors returned by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The switch replied with an error status or an unexpected payload.
    Api,
    /// The switch replied with an internal server error status.
    ///
    /// This is also an [`ErrorKind::Api`] error, see [`ErrorKind::is_api`].
    InternalServer,
    /// The switch cannot be reached.
    InvalidHost,
    /// The switch replied with a body that cannot be decoded.
    InvalidResponse,
    /// The switch refused the credentials or the session expired.
    Login,
    /// The switch did not reply in time.
    Timeout,
}

impl ErrorKind {
    /// Whether the error was reported by the switch API.
    #[must_use]
    pub const fn is_api(self) -> bool {
        matches!(self, Self::Api | Self::InternalServer)
    }

    const fn description(self) -> &'static str {
        match self {
            Self::Api => "Api",
            Self::InternalServer => "Internal Server",
            Self::InvalidHost => "Invalid Host",
            Self::InvalidResponse => "Invalid Response",
            Self::Login => "Login",
            Self::Timeout => "Timeout",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.description().fmt(f)
    }
}

/// A controller error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    description: Cow<'static, str>,
}

impl Error {
    /// Creates an [`Error`] of the given kind.
    pub fn new(kind: ErrorKind, description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the same error with a different kind.
    #[must_use]
    pub(crate) fn with_kind(self, kind: ErrorKind) -> Self {
        Self { kind, ..self }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.description)
    }
}

impl std::error::Error for Error {}

impl From<qsw::response::ResponseError> for Error {
    fn from(e: qsw::response::ResponseError) -> Self {
        Self::new(ErrorKind::Api, e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::new(
            ErrorKind::InvalidResponse,
            format!("Json error caused by {e}"),
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            ErrorKind::Timeout
        } else {
            ErrorKind::InvalidHost
        };
        Self::new(kind, e.to_string())
    }
}

/// A specialized [`Result`](std::result::Result) type for controller
/// operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use qsw::response::ResponseError;

    use super::{Error, ErrorKind};

    #[test]
    fn api_kinds() {
        assert!(ErrorKind::Api.is_api());
        assert!(ErrorKind::InternalServer.is_api());
        assert!(!ErrorKind::Login.is_api());
        assert!(!ErrorKind::InvalidHost.is_api());
        assert!(!ErrorKind::InvalidResponse.is_api());
        assert!(!ErrorKind::Timeout.is_api());
    }

    #[test]
    fn display() {
        let error = Error::new(ErrorKind::InternalServer, "GET /api/v1/system/sensor");
        assert_eq!(
            error.to_string(),
            "Internal Server: GET /api/v1/system/sensor"
        );

        let error = error.with_kind(ErrorKind::InvalidHost);
        assert_eq!(error.kind(), ErrorKind::InvalidHost);
        assert_eq!(error.description(), "GET /api/v1/system/sensor");
    }

    #[test]
    fn missing_result() {
        let error = Error::from(ResponseError {
            error_code: Some(500),
            error_message: None,
        });
        assert_eq!(error.kind(), ErrorKind::Api);
        assert_eq!(
            error.description(),
            "Missing result in response (error_code=500)"
        );
    }
}
