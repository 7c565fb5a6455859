//! HTTP Basic credentials.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// `Authorization` header value for `user:password`, encoded as UTF-8.
pub fn basic_auth_header(user: &str, password: &str) -> String {
    let token = STANDARD.encode(format!("{user}:{password}"));
    format!("Basic {token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_ascii_credentials() {
        assert_eq!(
            basic_auth_header("user@example.com", "secret"),
            "Basic dXNlckBleGFtcGxlLmNvbTpzZWNyZXQ="
        );
    }

    #[test]
    fn non_ascii_credentials_use_utf8() {
        let header = basic_auth_header("jürgen", "pässword");
        let decoded = STANDARD
            .decode(header.trim_start_matches("Basic "))
            .unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "jürgen:pässword");
    }

    #[test]
    fn empty_password_keeps_separator() {
        assert_eq!(basic_auth_header("a", ""), "Basic YTo=");
    }
}
