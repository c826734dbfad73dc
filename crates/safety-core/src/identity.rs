//! Mock identity: registration with emailed codes, bearer sessions and
//! checksum-based ID verification.
//!
//! Everything lives in memory. Passwords are salted SHA-256, enough to keep
//! plaintext out of the store but not a credential system.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::{Result, SafetyError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
struct UserRecord {
    profile: UserProfile,
    salt: [u8; 16],
    password_hash: String,
    verified: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub user_id: String,
    pub email: String,
    /// Six-digit code; the demo "sends" it by echoing it back
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginSession {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecksumVerification {
    pub verified: bool,
    pub hash: String,
    pub message: String,
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn hash_password(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Default)]
pub struct IdentityStore {
    users: HashMap<String, UserRecord>,
    pending_codes: HashMap<String, String>,
    sessions: HashMap<String, String>,
    checksums: HashMap<String, String>,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, email: &str, password: &str) -> Result<Registration> {
        let email = normalize_email(email);
        let name = name.trim();
        if email.is_empty() {
            return Err(SafetyError::MissingField("email"));
        }
        if name.is_empty() {
            return Err(SafetyError::MissingField("name"));
        }
        if password.is_empty() {
            return Err(SafetyError::MissingField("password"));
        }
        if self.users.contains_key(&email) {
            return Err(SafetyError::UserExists(email));
        }

        let mut rng = rand::thread_rng();
        let salt: [u8; 16] = rng.gen();
        let code = rng.gen_range(100_000..=999_999u32).to_string();

        let user_id = (self.users.len() + 1).to_string();
        self.users.insert(
            email.clone(),
            UserRecord {
                profile: UserProfile {
                    id: user_id.clone(),
                    name: name.to_string(),
                    email: email.clone(),
                },
                salt,
                password_hash: hash_password(&salt, password),
                verified: false,
                created_at: Utc::now(),
            },
        );
        self.pending_codes.insert(email.clone(), code.clone());
        info!(user_id = %user_id, "user registered, awaiting verification");

        Ok(Registration { user_id, email, code })
    }

    pub fn verify(&mut self, email: &str, code: &str) -> Result<()> {
        let email = normalize_email(email);
        match self.pending_codes.get(&email) {
            Some(expected) if expected == code.trim() => {}
            _ => return Err(SafetyError::InvalidVerificationCode),
        }

        let user = self
            .users
            .get_mut(&email)
            .ok_or_else(|| SafetyError::UserNotFound(email.clone()))?;
        user.verified = true;
        self.pending_codes.remove(&email);
        info!(user_id = %user.profile.id, "email verified");
        Ok(())
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<LoginSession> {
        let email = normalize_email(email);
        let user = self
            .users
            .get(&email)
            .filter(|u| hash_password(&u.salt, password) == u.password_hash)
            .ok_or(SafetyError::InvalidCredentials)?;

        if !user.verified {
            return Err(SafetyError::EmailNotVerified);
        }

        let token = Uuid::new_v4().to_string();
        let profile = user.profile.clone();
        self.sessions.insert(token.clone(), email);
        info!(user_id = %profile.id, "login");
        Ok(LoginSession { token, user: profile })
    }

    /// Returns whether a session was actually removed
    pub fn logout(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn session_user(&self, token: &str) -> Option<&UserProfile> {
        self.sessions
            .get(token)
            .and_then(|email| self.users.get(email))
            .map(|u| &u.profile)
    }

    pub fn verified_count(&self) -> usize {
        self.users.values().filter(|u| u.verified).count()
    }

    fn checksum(user: &UserRecord) -> String {
        // serde_json maps are ordered by key, so this is canonical
        let canonical = serde_json::json!({
            "id": user.profile.id,
            "name": user.profile.name,
            "email": user.profile.email,
            "timestamp": user.created_at.to_rfc3339(),
        })
        .to_string();
        to_hex(&Sha256::digest(canonical.as_bytes()))
    }

    /// First call records the user's checksum; later calls compare against it
    pub fn verify_checksum(&mut self, email: &str) -> Result<ChecksumVerification> {
        let email = normalize_email(email);
        let user = self
            .users
            .get(&email)
            .ok_or_else(|| SafetyError::UserNotFound(email.clone()))?;

        let hash = Self::checksum(user);
        match self.checksums.get(&user.profile.id) {
            None => {
                self.checksums.insert(user.profile.id.clone(), hash.clone());
                Ok(ChecksumVerification {
                    verified: true,
                    hash,
                    message: "ID verified and stored on blockchain".to_string(),
                })
            }
            Some(stored) => {
                let verified = *stored == hash;
                Ok(ChecksumVerification {
                    verified,
                    hash,
                    message: if verified {
                        "Blockchain verification successful"
                    } else {
                        "Blockchain verification failed - data tampering detected"
                    }
                    .to_string(),
                })
            }
        }
    }
}
