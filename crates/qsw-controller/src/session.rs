use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use serde_json::{Value, json};

const QSW_ID: &str = "QSW_ID";
const QSW_LANG: &str = "QSW_LANG";
const LANGUAGE: &str = "ENG";

// The credentials body of a login request.
//
// Switches expect the password as the base64 encoding of its UTF-8 bytes.
pub(crate) fn login_params(user: &str, password: &str) -> Value {
    json!({
        "username": user,
        "password": STANDARD.encode(password.as_bytes()),
    })
}

// Session tokens of a logged in user.
//
// The same API key is sent both as a cookie and as a bearer token.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    api_key: Option<String>,
}

impl Session {
    pub(crate) fn is_active(&self) -> bool {
        self.api_key.as_deref().is_some_and(|api_key| !api_key.is_empty())
    }

    pub(crate) fn start(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub(crate) fn clear(&mut self) {
        self.api_key = None;
    }

    pub(crate) fn cookie(&self) -> String {
        match self.api_key.as_deref() {
            Some(api_key) if !api_key.is_empty() => {
                format!("{QSW_LANG}={LANGUAGE}; {QSW_ID}={api_key}")
            }
            _ => format!("{QSW_LANG}={LANGUAGE}"),
        }
    }

    pub(crate) fn authorization(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .filter(|api_key| !api_key.is_empty())
            .map(|api_key| format!("Bearer {api_key}"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Session, login_params};

    #[test]
    fn login_body() {
        assert_eq!(
            login_params("admin", "pässword"),
            json!({
                "username": "admin",
                "password": "cMOkc3N3b3Jk",
            })
        );
    }

    #[test]
    fn anonymous_session() {
        let session = Session::default();

        assert!(!session.is_active());
        assert_eq!(session.cookie(), "QSW_LANG=ENG");
        assert_eq!(session.authorization(), None);
    }

    #[test]
    fn session_lifecycle() {
        let mut session = Session::default();

        session.start("f00d".into());
        assert!(session.is_active());
        assert_eq!(session.cookie(), "QSW_LANG=ENG; QSW_ID=f00d");
        assert_eq!(session.authorization().as_deref(), Some("Bearer f00d"));

        session.clear();
        assert_eq!(session, Session::default());

        session.start(String::new());
        assert!(!session.is_active());
        assert_eq!(session.authorization(), None);
    }
}
