//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. Room tokens issued by
//! the application server and the application-server password are always held
//! in a `SecretString`, so deriving `Debug` on a struct that carries one is safe.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct Credentials {
//!     domain: String,
//!     token: SecretString,
//! }
//!
//! let creds = Credentials {
//!     domain: "d.example.com".to_string(),
//!     token: SecretString::from("tok123"),
//! };
//!
//! assert!(!format!("{creds:?}").contains("tok123"));
//! assert_eq!(creds.token.expose_secret(), "tok123");
//! ```
//!
//! Only call `expose_secret()` at the point the value leaves the process
//! (an HTTP header, the SDK join call).

pub use secrecy::{ExposeSecret, SecretBox, SecretString};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("room-token-value");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("room-token-value"));
    }

    #[test]
    fn test_struct_with_secret_is_safe() {
        #[allow(dead_code)]
        #[derive(Debug)]
        struct ServerLogin {
            username: String,
            password: SecretString,
        }

        let login = ServerLogin {
            username: "demo-user".to_string(),
            password: SecretString::from("super-secret"),
        };

        let debug_str = format!("{login:?}");
        assert!(debug_str.contains("demo-user"));
        assert!(!debug_str.contains("super-secret"));
    }

    #[test]
    fn test_deserialize_token_from_json() {
        #[derive(Debug, Deserialize)]
        struct Room {
            token: SecretString,
        }

        let room: Room = serde_json::from_str(r#"{"token": "tok123"}"#).expect("deserialize");

        assert_eq!(room.token.expose_secret(), "tok123");
        assert!(!format!("{room:?}").contains("tok123"));
    }
}
