//! SQL Server login credentials with automatic memory zeroing.
//!
//! # Security
//! - The password is stored in a `Zeroizing<String>` and cleared on drop
//! - `Debug` output never shows the password

use zeroize::Zeroizing;

/// Username and password for SQL Server authentication.
///
/// # Example
///
/// ```rust
/// use sqlprobe_core::Credentials;
///
/// let creds = Credentials::new("sa".to_string(), "secret".to_string());
/// assert_eq!(creds.username(), "sa");
/// assert!(creds.has_password());
/// assert!(!format!("{:?}", creds).contains("secret"));
/// ```
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Creates new credentials; the password is moved into secure storage.
    pub fn new(username: String, password: String) -> Self {
        Self {
            username,
            password: Zeroizing::new(password),
        }
    }

    /// Gets the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Gets the password for building the login string.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Checks if a non-empty password is present without exposing it.
    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &super::REDACTED)
            .finish()
    }
}
