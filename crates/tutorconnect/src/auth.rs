//! Mock authentication against the demo accounts and in-memory signups.
//!
//! Every demo account accepts [`seed::DEMO_PASSWORD`]. Accounts created through
//! signup live only as long as the process.

use dashmap::DashMap;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::marketplace::{generate_id, Marketplace, MarketplaceError};
use crate::model::{StudentProgress, User, UserProfile, UserRole};
use crate::seed;

const AVATAR_SERVICE: &str = "https://ui-avatars.com/api/";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid password. (Hint: password)")]
    InvalidPassword,

    #[error("User not found. Please sign up or use demo credentials.")]
    UserNotFound,

    #[error("Please fill in all fields.")]
    MissingFields,

    #[error("An account with this email already exists.")]
    EmailTaken,

    #[error("Accounts with role {0:?} cannot be created through signup.")]
    RoleNotAllowed(UserRole),

    #[error(transparent)]
    Registration(#[from] MarketplaceError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_signup_role")]
    pub role: UserRole,
}

fn default_signup_role() -> UserRole {
    UserRole::Student
}

struct Account {
    user: User,
    password_digest: [u8; 32],
}

fn digest(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

fn admin() -> User {
    User::Admin {
        profile: UserProfile {
            id: "admin1".to_string(),
            name: "Platform Admin".to_string(),
            email: seed::ADMIN_EMAIL.to_string(),
            avatar: None,
        },
    }
}

fn demo_student() -> User {
    User::Student {
        profile: UserProfile {
            id: "s1".to_string(),
            name: "Student User".to_string(),
            email: seed::STUDENT_EMAIL.to_string(),
            avatar: Some("https://picsum.photos/id/100/200/200".to_string()),
        },
        balance: 5,
        progress: StudentProgress {
            points: 1240,
            streak: 12,
            badges: vec![
                "Maths Whiz".to_string(),
                "Early Bird".to_string(),
                "Perfect Attendee".to_string(),
            ],
        },
    }
}

/// Avatar rendered from the user's name.
pub fn avatar_url(name: &str) -> String {
    Url::parse_with_params(
        AVATAR_SERVICE,
        &[("name", name), ("background", "0d9488"), ("color", "fff")],
    )
    .map(String::from)
    .unwrap_or_else(|_| AVATAR_SERVICE.to_string())
}

/// Accounts created through signup, keyed by lower-cased email.
#[derive(Default)]
pub struct Accounts {
    signed_up: DashMap<String, Account>,
}

impl Accounts {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_demo_email(email: &str, market: &Marketplace) -> bool {
        email == seed::ADMIN_EMAIL
            || email == seed::STUDENT_EMAIL
            || market
                .teachers()
                .iter()
                .any(|t| t.profile.email.to_lowercase() == email)
    }

    /// Resolves credentials to a user. Emails are matched case-insensitively.
    ///
    /// Signed-up accounts are checked first with their own password. The demo
    /// teacher branch only covers the seeded catalogue.
    pub fn login(&self, market: &Marketplace, request: &LoginRequest) -> Result<User, AuthError> {
        let email = normalize(&request.email);

        if let Some(account) = self.signed_up.get(&email) {
            if account.password_digest != digest(&request.password) {
                return Err(AuthError::InvalidPassword);
            }
            info!(user_id = %account.user.id(), "Login");
            return Ok(account.user.clone());
        }

        let demo = if email == seed::ADMIN_EMAIL {
            Some(admin())
        } else if email == seed::STUDENT_EMAIL {
            Some(demo_student())
        } else {
            market
                .teachers()
                .iter()
                .filter(|t| seed::is_demo_teacher(t.id()))
                .find(|t| t.profile.email.to_lowercase() == email)
                .map(|t| User::Teacher {
                    profile: t.profile.clone(),
                    teacher_id: t.id().to_string(),
                    balance: t.balance,
                    pending_balance: 0,
                })
        };

        let user = demo.ok_or(AuthError::UserNotFound)?;
        if request.password != seed::DEMO_PASSWORD {
            return Err(AuthError::InvalidPassword);
        }
        info!(user_id = %user.id(), role = ?user.role(), "Demo login");
        Ok(user)
    }

    /// Creates a student or teacher account. A teacher also gets a catalogue record.
    pub fn signup(&self, market: &Marketplace, request: &SignupRequest) -> Result<User, AuthError> {
        let name = request.name.trim();
        let email = normalize(&request.email);
        if name.is_empty() || email.is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        if Self::is_demo_email(&email, market) || self.signed_up.contains_key(&email) {
            return Err(AuthError::EmailTaken);
        }

        let profile = UserProfile {
            id: generate_id("user-"),
            name: name.to_string(),
            email: request.email.trim().to_string(),
            avatar: Some(avatar_url(name)),
        };

        let user = match request.role {
            UserRole::Student => User::Student {
                profile,
                balance: 0,
                progress: StudentProgress::default(),
            },
            UserRole::Teacher => {
                let teacher = market.register_teacher(profile.clone())?;
                User::Teacher {
                    profile,
                    teacher_id: teacher.id().to_string(),
                    balance: 0,
                    pending_balance: 0,
                }
            }
            UserRole::Admin => return Err(AuthError::RoleNotAllowed(UserRole::Admin)),
        };

        self.signed_up.insert(
            email,
            Account {
                user: user.clone(),
                password_digest: digest(&request.password),
            },
        );
        info!(user_id = %user.id(), role = ?user.role(), "Account created");
        Ok(user)
    }
}
