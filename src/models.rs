//! Account Models
//!
//! Data structures for requests, responses, and database entities.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::str::FromStr;
use std::sync::OnceLock;
use uuid::Uuid;
use validator::Validate;

// ============================================
// Roles
// ============================================

/// Named role granted to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role '{other}'")),
        }
    }
}

/// Role audit action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleAuditAction {
    Added,
    Removed,
}

impl RoleAuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleAuditAction::Added => "added",
            RoleAuditAction::Removed => "removed",
        }
    }
}

// ============================================
// Database Entities
// ============================================

/// User entity from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub email_confirmed: bool,
    pub phone_confirmed: bool,
    #[serde(skip_serializing)]
    pub confirmation_token_hash: Option<String>,
    pub confirmation_sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub phone_code_hash: Option<String>,
    pub phone_confirmation_sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub phone_code_attempts: i32,
    pub profile: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn email_confirmed(&self) -> bool {
        self.email_confirmed
    }

    pub fn phone_confirmed(&self) -> bool {
        self.phone_confirmed
    }

    /// Whether a phone confirmation code is still inside its window
    pub fn phone_code_live(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match (&self.phone_code_hash, self.phone_confirmation_sent_at) {
            (Some(_), Some(sent_at)) => sent_at + ttl > now,
            _ => false,
        }
    }

    /// Notification preferences stored in the profile document
    pub fn preferences(&self) -> NotificationPreferences<'_> {
        NotificationPreferences::new(&self.profile)
    }
}

/// Read-only view over `profile.preferences`
#[derive(Debug, Clone, Copy)]
pub struct NotificationPreferences<'a> {
    profile: &'a Value,
}

/// Timezone used when the profile does not name one
pub const DEFAULT_NOTIFICATION_TIMEZONE: &str = "America/New_York";

/// Daily notification slots a user may toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationSlot {
    Morning,
    Midday,
    Afternoon,
    Evening,
    WindDown,
}

impl NotificationSlot {
    fn key(&self) -> &'static str {
        match self {
            NotificationSlot::Morning => "morning",
            NotificationSlot::Midday => "midday",
            NotificationSlot::Afternoon => "afternoon",
            NotificationSlot::Evening => "evening",
            NotificationSlot::WindDown => "wind_down",
        }
    }
}

impl<'a> NotificationPreferences<'a> {
    pub fn new(profile: &'a Value) -> Self {
        Self { profile }
    }

    pub fn timezone(&self) -> &'a str {
        self.profile
            .pointer("/preferences/timezone")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_NOTIFICATION_TIMEZONE)
    }

    /// Toggles default to on; only an explicit `false` turns them off
    pub fn enabled(&self) -> bool {
        !self.explicitly_off("/preferences/notifications/enabled")
    }

    pub fn slot_enabled(&self, slot: NotificationSlot) -> bool {
        self.enabled()
            && !self.explicitly_off(&format!("/preferences/notifications/{}", slot.key()))
    }

    fn explicitly_off(&self, pointer: &str) -> bool {
        matches!(self.profile.pointer(pointer), Some(Value::Bool(false)))
    }
}

/// Lifecycle state of a single-use credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Active,
    Expired,
    /// Revoked refresh token or used reset token
    Spent,
}

/// Refresh token entity from database
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub replaced_by: Option<Uuid>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    /// Whether the token was rotated, not revoked outright, at most `window` before `now`
    pub fn rotated_within(&self, window: Duration, now: DateTime<Utc>) -> bool {
        match (self.replaced_by, self.revoked_at) {
            (Some(_), Some(revoked_at)) => now - revoked_at <= window,
            _ => false,
        }
    }

    /// Revocation wins over expiry so reuse is always detectable
    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        if self.is_revoked() {
            TokenState::Spent
        } else if self.is_expired_at(now) {
            TokenState::Expired
        } else {
            TokenState::Active
        }
    }
}

/// Password reset token entity from database
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// Used wins over expired, matching the order errors are reported in
    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        if self.used {
            TokenState::Spent
        } else if self.expires_at <= now {
            TokenState::Expired
        } else {
            TokenState::Active
        }
    }
}

// ============================================
// Normalization
// ============================================

/// Trim and lowercase an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalize a phone number towards E.164
///
/// Ten digit numbers are assumed to be North American. Input containing
/// letters, or too many digits, is returned unchanged so validation can
/// reject it.
pub fn normalize_phone(phone: &str) -> Option<String> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return None;
    }

    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    let foreign = trimmed
        .chars()
        .any(|c| !(c.is_ascii_digit() || c.is_whitespace() || "-()+.".contains(c)));

    if foreign || digits.len() > 15 {
        return Some(trimmed.to_string());
    }

    let normalized = match digits.len() {
        10 => format!("+1{digits}"),
        11 if digits.starts_with('1') => format!("+{digits}"),
        10..=15 => format!("+{digits}"),
        _ => trimmed.to_string(),
    };
    Some(normalized)
}

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^\+\d{10,15}$").expect("valid phone regex"))
}

/// E.164 check applied after normalization
pub fn is_valid_phone(phone: &str) -> bool {
    phone_regex().is_match(phone)
}

// ============================================
// Request DTOs
// ============================================

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,
}

/// Registration request envelope (`{"user": {...}}`)
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub user: RegisterUser,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(email(message = "Email is invalid"))]
    #[serde(default)]
    pub email: String,

    /// Length policy lives in `Passwords`, it is configurable
    #[serde(default)]
    pub password: String,

    #[validate(length(max = 100, message = "Name is too long (maximum is 100 characters)"))]
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub phone: Option<String>,
}

/// Refresh token request; the cookie takes precedence over this body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Email lookup used by the resend and password reset endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailRequest {
    #[serde(default)]
    pub email: String,
}

/// Email confirmation request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmEmailRequest {
    #[serde(default)]
    pub token: String,
}

/// Phone confirmation request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmPhoneRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub code: String,
}

/// Password reset completion
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub password: String,
}

/// Profile update envelope (`{"user": {...}}`)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    pub user: UpdateUser,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 100, message = "Name can't be blank"))]
    pub name: Option<String>,

    /// `Some("")` clears the phone number
    pub phone: Option<String>,

    pub profile: Option<Value>,
}

/// Password change envelope (`{"user": {...}}`)
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub user: ChangePassword,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangePassword {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: Option<String>,
}

/// Role grant request
#[derive(Debug, Clone, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

// ============================================
// Response DTOs
// ============================================

/// Serialized user attributes
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserAttributes {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub email_confirmed: bool,
    pub phone_confirmed: bool,
    pub profile: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub roles: Vec<String>,
}

impl UserAttributes {
    pub fn new(user: &User, roles: &[Role]) -> Self {
        let mut roles: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();
        roles.sort();
        roles.dedup();
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            email_confirmed: user.email_confirmed,
            phone_confirmed: user.phone_confirmed,
            profile: user.profile.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
            roles,
        }
    }
}

/// Resource object: `{"id", "type": "user", "attributes"}`
#[derive(Debug, Clone, Serialize)]
pub struct UserResource {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attributes: UserAttributes,
}

impl From<UserAttributes> for UserResource {
    fn from(attributes: UserAttributes) -> Self {
        Self {
            id: attributes.id,
            kind: "user",
            attributes,
        }
    }
}

/// Top-level document wrapping one or many resources
#[derive(Debug, Clone, Serialize)]
pub struct Document<T> {
    pub data: T,
}

/// Minimal user view embedded in the login response
#[derive(Debug, Clone, Serialize)]
pub struct AuthUserSummary {
    pub id: Uuid,
    pub email: String,
}

/// Login response body
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: AuthUserSummary,
    pub message: String,
}

/// Refresh response body
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Simple message response
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================
// JWT Claims
// ============================================

/// JWT claims for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// JWT ID (unique identifier)
    pub jti: Uuid,
}

/// Freshly issued access/refresh pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
pub(crate) fn sample_user() -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: "jane@example.com".into(),
        name: "Jane".into(),
        password_hash: String::new(),
        phone: Some("+15555550100".into()),
        email_confirmed: true,
        phone_confirmed: false,
        confirmation_token_hash: None,
        confirmation_sent_at: None,
        phone_code_hash: None,
        phone_confirmation_sent_at: None,
        phone_code_attempts: 0,
        profile: serde_json::json!({}),
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn refresh_token(revoked: bool, expires_in: Duration) -> RefreshToken {
        let now = Utc::now();
        RefreshToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: "digest".into(),
            expires_at: now + expires_in,
            revoked,
            revoked_at: None,
            replaced_by: None,
            user_agent: None,
            ip_address: None,
            created_at: now,
        }
    }

    #[test]
    fn test_refresh_token_states() {
        let now = Utc::now();
        assert_eq!(
            refresh_token(false, Duration::days(7)).state_at(now),
            TokenState::Active
        );
        assert_eq!(
            refresh_token(false, Duration::seconds(-1)).state_at(now),
            TokenState::Expired
        );
        assert_eq!(
            refresh_token(true, Duration::seconds(-1)).state_at(now),
            TokenState::Spent
        );
    }

    #[test]
    fn test_rotated_within() {
        let now = Utc::now();
        let window = Duration::seconds(10);

        let rotated = RefreshToken {
            revoked_at: Some(now - Duration::seconds(3)),
            replaced_by: Some(Uuid::new_v4()),
            ..refresh_token(true, Duration::days(7))
        };
        assert!(rotated.rotated_within(window, now));
        assert!(!rotated.rotated_within(window, now + Duration::minutes(1)));

        // Logout and theft revocations never set a successor
        let revoked = RefreshToken {
            replaced_by: None,
            ..rotated.clone()
        };
        assert!(!revoked.rotated_within(window, now));
    }

    #[test]
    fn test_reset_token_used_before_expired() {
        let now = Utc::now();
        let token = PasswordResetToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: "digest".into(),
            expires_at: now - Duration::minutes(5),
            used: true,
            created_at: now - Duration::hours(2),
        };
        assert_eq!(token.state_at(now), TokenState::Spent);

        let fresh = PasswordResetToken {
            used: false,
            expires_at: now + Duration::hours(1),
            ..token
        };
        assert_eq!(fresh.state_at(now), TokenState::Active);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("(555) 555-0100").as_deref(), Some("+15555550100"));
        assert_eq!(normalize_phone("1-555-555-0100").as_deref(), Some("+15555550100"));
        assert_eq!(normalize_phone("+44 20 7946 0958").as_deref(), Some("+442079460958"));
        assert_eq!(normalize_phone("call me").as_deref(), Some("call me"));
        assert_eq!(normalize_phone("12345").as_deref(), Some("12345"));
        assert_eq!(normalize_phone("   "), None);
    }

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("+15555550100"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("call me"));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_notification_preferences_default_on() {
        let user = sample_user();
        let prefs = user.preferences();
        assert_eq!(prefs.timezone(), DEFAULT_NOTIFICATION_TIMEZONE);
        assert!(prefs.enabled());
        assert!(prefs.slot_enabled(NotificationSlot::WindDown));
    }

    #[test]
    fn test_notification_preferences_explicit_off() {
        let mut user = sample_user();
        user.profile = json!({
            "preferences": {
                "timezone": "Europe/Berlin",
                "notifications": { "midday": false }
            }
        });
        let prefs = user.preferences();
        assert_eq!(prefs.timezone(), "Europe/Berlin");
        assert!(!prefs.slot_enabled(NotificationSlot::Midday));
        assert!(prefs.slot_enabled(NotificationSlot::Morning));

        user.profile = json!({ "preferences": { "notifications": { "enabled": false } } });
        assert!(!user.preferences().slot_enabled(NotificationSlot::Morning));
    }

    #[test]
    fn test_user_resource_shape() {
        let user = sample_user();
        let resource = UserResource::from(UserAttributes::new(&user, &[Role::User, Role::Admin]));
        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(value["type"], "user");
        assert_eq!(value["attributes"]["roles"], json!(["admin", "user"]));
        assert!(value["attributes"].get("password_hash").is_none());
    }

    #[test]
    fn test_phone_code_window() {
        let now = Utc::now();
        let mut user = sample_user();
        assert!(!user.phone_code_live(Duration::minutes(10), now));

        user.phone_code_hash = Some("digest".into());
        user.phone_confirmation_sent_at = Some(now - Duration::minutes(5));
        assert!(user.phone_code_live(Duration::minutes(10), now));
        assert!(!user.phone_code_live(Duration::minutes(1), now));
    }
}
