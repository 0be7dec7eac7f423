//! Player entity - a registered account that plays life runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{day_count, some_if_not_empty};
use crate::error::DomainError;
use crate::ids::PlayerId;
use crate::value_objects::{Email, Username};

/// Accounts at most this many days old count as new.
const NEW_PLAYER_DAYS: i64 = 7;

/// Unvalidated input for [`Player::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerDraft {
    pub username: String,
    pub email: Option<String>,
    pub id: Option<PlayerId>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl PlayerDraft {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: None,
            id: None,
            created_at: None,
            last_login: None,
            is_active: true,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_id(mut self, id: PlayerId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_last_login(mut self, last_login: DateTime<Utc>) -> Self {
        self.last_login = Some(last_login);
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// Field overrides for [`Player::clone_with`]. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    pub username: Option<String>,
    /// `Some(None)` clears the email.
    #[serde(default, deserialize_with = "crate::common::nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::common::nullable")]
    pub last_login: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
}

/// Persisted/wire shape of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// A registered player.
///
/// # Invariants
///
/// - `username` is 3-50 characters of letters, digits and underscores
/// - `email`, when present, looks like `local@domain.tld`
/// - an inactive player never has its `last_login` advanced
///
/// Two players are equal when their IDs match.
///
/// # Example
///
/// ```
/// use chrono::TimeZone;
/// use whatif_domain::Player;
///
/// let now = chrono::Utc.timestamp_opt(1_700_000_000, 0).unwrap();
/// let player = Player::create("new_player", Some("new@example.com".to_string()), now).unwrap();
///
/// assert!(player.can_start_new_run());
/// assert!(player.is_new_player(now));
/// assert_eq!(player.summary(), "new_player (Active)");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PlayerRecord", into = "PlayerRecord")]
pub struct Player {
    id: PlayerId,
    username: Username,
    email: Option<Email>,
    created_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
    is_active: bool,
}

impl Player {
    /// Validate `draft` and build a player.
    ///
    /// Username is checked before email. An empty email is treated as absent.
    pub fn new(draft: PlayerDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let username = Username::new(draft.username)?;
        let email = draft
            .email
            .and_then(some_if_not_empty)
            .map(Email::new)
            .transpose()?;

        Ok(Self {
            id: draft.id.unwrap_or_else(|| PlayerId::generate(now)),
            username,
            email,
            created_at: draft.created_at.unwrap_or(now),
            last_login: draft.last_login,
            is_active: draft.is_active,
        })
    }

    /// A fresh, active player with no login yet.
    pub fn create(
        username: impl Into<String>,
        email: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let mut draft = PlayerDraft::new(username);
        draft.email = email;
        Self::new(draft, now)
    }

    /// Rebuild a player from its persisted record, re-validating every field.
    pub fn from_data(record: PlayerRecord) -> Result<Self, DomainError> {
        let created_at = record.created_at;
        let draft = PlayerDraft {
            username: record.username,
            email: record.email,
            id: Some(record.id),
            created_at: Some(created_at),
            last_login: record.last_login,
            is_active: record.is_active,
        };
        Self::new(draft, created_at)
    }

    pub fn to_record(&self) -> PlayerRecord {
        PlayerRecord {
            id: self.id.clone(),
            username: self.username.as_str().to_string(),
            email: self.email.as_ref().map(|e| e.as_str().to_string()),
            created_at: self.created_at,
            last_login: self.last_login,
            is_active: self.is_active,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    #[inline]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    #[inline]
    pub fn email(&self) -> Option<&str> {
        self.email.as_ref().map(Email::as_str)
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn last_login(&self) -> Option<DateTime<Utc>> {
        self.last_login
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    // =========================================================================
    // Domain behavior
    // =========================================================================

    pub fn can_start_new_run(&self) -> bool {
        self.is_active
    }

    pub fn can_receive_meta_points(&self) -> bool {
        self.is_active
    }

    /// Record a login at `now`. Ignored for inactive players.
    pub fn update_last_login(&mut self, now: DateTime<Utc>) {
        if self.is_active {
            self.last_login = Some(now);
        }
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn reactivate(&mut self) {
        self.is_active = true;
    }

    /// Days since the account was created, rounded up.
    pub fn age_in_days(&self, now: DateTime<Utc>) -> i64 {
        day_count(self.created_at, now)
    }

    pub fn is_new_player(&self, now: DateTime<Utc>) -> bool {
        self.age_in_days(now) <= NEW_PLAYER_DAYS
    }

    /// `"<username> (Active)"` or `"<username> (Inactive)"`
    pub fn summary(&self) -> String {
        let status = if self.is_active { "Active" } else { "Inactive" };
        format!("{} ({})", self.username, status)
    }

    /// A copy with `update` applied, re-validated as a whole.
    ///
    /// `id` and `created_at` are never overridden.
    pub fn clone_with(&self, update: PlayerUpdate) -> Result<Self, DomainError> {
        let draft = PlayerDraft {
            username: update
                .username
                .unwrap_or_else(|| self.username.as_str().to_string()),
            email: update
                .email
                .unwrap_or_else(|| self.email().map(str::to_string)),
            id: Some(self.id.clone()),
            created_at: Some(self.created_at),
            last_login: update.last_login.unwrap_or(self.last_login),
            is_active: update.is_active.unwrap_or(self.is_active),
        };
        Self::new(draft, self.created_at)
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Player {}

impl TryFrom<PlayerRecord> for Player {
    type Error = DomainError;

    fn try_from(record: PlayerRecord) -> Result<Self, Self::Error> {
        Self::from_data(record)
    }
}

impl From<Player> for PlayerRecord {
    fn from(player: Player) -> Self {
        player.to_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn fixed_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn create_test_player() -> Player {
        Player::new(
            PlayerDraft::new("testuser").with_email("test@example.com"),
            fixed_time(),
        )
        .unwrap()
    }

    fn message(result: Result<Player, DomainError>) -> String {
        result
            .unwrap_err()
            .validation_message()
            .map(str::to_string)
            .unwrap_or_default()
    }

    mod construction {
        use super::*;

        #[test]
        fn new_sets_defaults() {
            let player = create_test_player();
            assert_eq!(player.username(), "testuser");
            assert_eq!(player.email(), Some("test@example.com"));
            assert!(player.is_active());
            assert!(player.last_login().is_none());
            assert_eq!(player.created_at(), fixed_time());
            assert!(player.id().as_str().starts_with("player_1700000000000_"));
        }

        #[test]
        fn empty_email_means_no_email() {
            let player = Player::create("testuser", Some(String::new()), fixed_time()).unwrap();
            assert_eq!(player.email(), None);
        }

        #[test]
        fn username_rules() {
            assert_eq!(
                message(Player::create("", None, fixed_time())),
                "Username must be between 3 and 50 characters"
            );
            assert_eq!(
                message(Player::create("ab", None, fixed_time())),
                "Username must be between 3 and 50 characters"
            );
            assert_eq!(
                message(Player::create("a".repeat(51), None, fixed_time())),
                "Username must be between 3 and 50 characters"
            );
            assert_eq!(
                message(Player::create("test-user", None, fixed_time())),
                "Username can only contain letters, numbers, and underscores"
            );
            assert!(Player::create("a".repeat(50), None, fixed_time()).is_ok());
        }

        #[test]
        fn email_rules() {
            assert_eq!(
                message(Player::create(
                    "testuser",
                    Some("invalid-email".to_string()),
                    fixed_time()
                )),
                "Invalid email format"
            );
            assert!(Player::create("testuser", Some("valid@email.com".to_string()), fixed_time()).is_ok());
        }

        #[test]
        fn username_checked_before_email() {
            assert_eq!(
                message(Player::create("x", Some("nope".to_string()), fixed_time())),
                "Username must be between 3 and 50 characters"
            );
        }
    }

    mod behavior {
        use super::*;

        #[test]
        fn active_player_can_play() {
            let player = create_test_player();
            assert!(player.can_start_new_run());
            assert!(player.can_receive_meta_points());
        }

        #[test]
        fn deactivated_player_cannot_play() {
            let mut player = create_test_player();
            player.deactivate();
            assert!(!player.is_active());
            assert!(!player.can_start_new_run());
            assert!(!player.can_receive_meta_points());

            player.reactivate();
            assert!(player.can_start_new_run());
        }

        #[test]
        fn login_updates_only_when_active() {
            let mut player = create_test_player();
            let later = fixed_time() + Duration::hours(1);
            player.update_last_login(later);
            assert_eq!(player.last_login(), Some(later));

            player.deactivate();
            player.update_last_login(later + Duration::hours(1));
            assert_eq!(player.last_login(), Some(later));
        }

        #[test]
        fn age_in_days_rounds_up() {
            let player = create_test_player();
            assert_eq!(player.age_in_days(fixed_time()), 0);
            assert_eq!(player.age_in_days(fixed_time() + Duration::seconds(1)), 1);
            assert_eq!(player.age_in_days(fixed_time() + Duration::days(3)), 3);
        }

        #[test]
        fn new_player_window_is_seven_days() {
            let player = create_test_player();
            assert!(player.is_new_player(fixed_time()));
            assert!(player.is_new_player(fixed_time() + Duration::days(7)));
            assert!(!player.is_new_player(fixed_time() + Duration::days(7) + Duration::seconds(1)));
        }

        #[test]
        fn ten_day_old_player_is_not_new() {
            let created = fixed_time() - Duration::days(10);
            let player = Player::new(
                PlayerDraft::new("olduser").with_created_at(created),
                fixed_time(),
            )
            .unwrap();
            assert!(!player.is_new_player(fixed_time()));
        }

        #[test]
        fn summary_reflects_status() {
            let mut player = create_test_player();
            assert_eq!(player.summary(), "testuser (Active)");
            player.deactivate();
            assert_eq!(player.summary(), "testuser (Inactive)");
        }

        #[test]
        fn equality_is_by_id() {
            let player = create_test_player();
            let renamed = player
                .clone_with(PlayerUpdate {
                    username: Some("renamed".to_string()),
                    ..PlayerUpdate::default()
                })
                .unwrap();
            assert_eq!(player, renamed);

            let other = Player::create("testuser", None, fixed_time()).unwrap();
            assert_ne!(player, other);
        }
    }

    mod clone_with {
        use super::*;

        #[test]
        fn overrides_fields_and_keeps_identity() {
            let player = create_test_player();
            let updated = player
                .clone_with(PlayerUpdate {
                    username: Some("updateduser".to_string()),
                    email: Some(Some("updated@example.com".to_string())),
                    ..PlayerUpdate::default()
                })
                .unwrap();

            assert_eq!(updated.username(), "updateduser");
            assert_eq!(updated.email(), Some("updated@example.com"));
            assert_eq!(updated.id(), player.id());
            assert_eq!(updated.created_at(), player.created_at());
            assert_eq!(player.username(), "testuser");
        }

        #[test]
        fn clears_email() {
            let updated = create_test_player()
                .clone_with(PlayerUpdate {
                    email: Some(None),
                    ..PlayerUpdate::default()
                })
                .unwrap();
            assert_eq!(updated.email(), None);
        }

        #[test]
        fn revalidates() {
            let result = create_test_player().clone_with(PlayerUpdate {
                username: Some("no spaces".to_string()),
                ..PlayerUpdate::default()
            });
            assert_eq!(
                message(result),
                "Username can only contain letters, numbers, and underscores"
            );
        }
    }

    mod persistence {
        use super::*;

        #[test]
        fn record_round_trip_keeps_every_field() {
            let mut player = create_test_player();
            player.update_last_login(fixed_time() + Duration::minutes(5));

            let restored = Player::from_data(player.to_record()).unwrap();
            assert_eq!(restored.to_record(), player.to_record());
        }

        #[test]
        fn json_uses_camel_case() {
            let value = serde_json::to_value(create_test_player()).unwrap();
            assert_eq!(value["username"], "testuser");
            assert_eq!(value["isActive"], true);
            assert!(value["lastLogin"].is_null());
            assert!(value.get("createdAt").is_some());

            let restored: Player = serde_json::from_value(value).unwrap();
            assert_eq!(restored.email(), Some("test@example.com"));
        }

        #[test]
        fn invalid_record_fails_on_load() {
            let mut record = create_test_player().to_record();
            record.email = Some("broken".to_string());
            assert_eq!(message(Player::from_data(record)), "Invalid email format");
        }
    }
}
