use std::time::Duration;

// Maximum time for a single HTTP call, body included.
const HTTP_CALL_TIMEOUT: Duration = Duration::from_secs(20);

// Maximum number of HTTP requests sent to a switch at the same time.
const HTTP_MAX_REQUESTS: usize = 3;

/// Options to connect to a switch.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub(crate) url: String,
    pub(crate) user: String,
    pub(crate) password: String,
    pub(crate) timeout: Duration,
    pub(crate) max_requests: usize,
}

impl std::fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionOptions")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_requests", &self.max_requests)
            .finish()
    }
}

impl ConnectionOptions {
    /// Creates [`ConnectionOptions`] for the switch at `url`, for instance
    /// `http://192.168.1.200`, with the given credentials.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let mut url = url.into();
        while url.ends_with('/') {
            let _ = url.pop();
        }

        Self {
            url,
            user: user.into(),
            password: password.into(),
            timeout: HTTP_CALL_TIMEOUT,
            max_requests: HTTP_MAX_REQUESTS,
        }
    }

    /// Sets the maximum time for a single HTTP call.
    #[must_use]
    #[inline]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum number of HTTP requests sent at the same time.
    ///
    /// A value of zero is treated as one.
    #[must_use]
    #[inline]
    pub fn max_requests(mut self, max_requests: usize) -> Self {
        self.max_requests = if max_requests == 0 { 1 } else { max_requests };
        self
    }

    /// Returns the switch URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the user name.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ConnectionOptions, HTTP_CALL_TIMEOUT, HTTP_MAX_REQUESTS};

    #[test]
    fn defaults() {
        let options = ConnectionOptions::new("http://192.168.1.200//", "admin", "secret");

        assert_eq!(options.url(), "http://192.168.1.200");
        assert_eq!(options.user(), "admin");
        assert_eq!(options.timeout, HTTP_CALL_TIMEOUT);
        assert_eq!(options.max_requests, HTTP_MAX_REQUESTS);
    }

    #[test]
    fn builder() {
        let options = ConnectionOptions::new("http://qsw.local", "admin", "secret")
            .timeout(Duration::from_secs(5))
            .max_requests(0);

        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.max_requests, 1);
    }

    #[test]
    fn password_is_not_printed() {
        let options = ConnectionOptions::new("http://qsw.local", "admin", "secret");
        assert!(!format!("{options:?}").contains("secret"));
    }
}
