//! Credential verification
//!
//! Callers only see [`CredentialVerifier`]. The shipped implementation is a
//! fixed plaintext account table; a real identity provider plugs in behind
//! the same trait.

use serde::Deserialize;

use crate::models::{Principal, Role};

/// One-shot verify-and-return-principal capability
pub trait CredentialVerifier: Send + Sync {
    /// Returns the principal for a matching account, `None` otherwise
    fn verify(&self, username: &str, password: &str) -> Option<Principal>;
}

/// A registered account
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Static account table, exact case-sensitive match on both fields
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    accounts: Vec<Account>,
}

impl StaticCredentials {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }

    /// The two built-in accounts: one admin, one hacker
    pub fn builtin() -> Self {
        Self::new(vec![
            Account {
                username: "admin".to_string(),
                password: "chiru".to_string(),
                role: Role::Admin,
            },
            Account {
                username: "hacker".to_string(),
                password: "pragmanchiru".to_string(),
                role: Role::Hacker,
            },
        ])
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> Option<Principal> {
        self.accounts
            .iter()
            .find(|a| a.username == username && a.password == password)
            .map(|a| Principal::new(a.username.clone(), a.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_accounts() {
        let creds = StaticCredentials::builtin();

        let admin = creds.verify("admin", "chiru").unwrap();
        assert_eq!(admin.role, Role::Admin);

        let hacker = creds.verify("hacker", "pragmanchiru").unwrap();
        assert_eq!(hacker.username, "hacker");
        assert_eq!(hacker.role, Role::Hacker);
    }

    #[test]
    fn test_rejects_mismatch() {
        let creds = StaticCredentials::builtin();
        assert!(creds.verify("admin", "wrong").is_none());
        assert!(creds.verify("Admin", "chiru").is_none());
        assert!(creds.verify("hacker", "chiru").is_none());
        assert!(creds.verify("", "").is_none());
    }
}
