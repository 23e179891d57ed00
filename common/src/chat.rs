use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::{credential_key, Credential, CREDENTIAL_PREFIX};
use crate::storage::{get_json, set_json, KeyValueStore, StoreError};

/// How often the admin chat view re-reads storage, in milliseconds.
/// There is no push mechanism; polling emulates live updates.
pub const POLL_INTERVAL_MS: u32 = 5_000;

/// The two independent chat categories scoping a user's transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Direct,
    Support,
}

impl ChannelKind {
    fn key_prefix(self) -> &'static str {
        match self {
            ChannelKind::Direct => "direct_chat:",
            ChannelKind::Support => "support_chat:",
        }
    }

    /// Storage key for one user's transcript in this channel.
    pub fn storage_key(self, email: &str) -> String {
        format!("{}{email}", self.key_prefix())
    }

    pub fn label(self) -> &'static str {
        match self {
            ChannelKind::Direct => "Direct",
            ChannelKind::Support => "Support",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Millisecond timestamp at send time.
    pub id: u64,
    pub sender: Sender,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read: bool,
    pub sender_name: Option<String>,
}

/// One row in the admin's user list, derived by scanning transcripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveUser {
    pub email: String,
    pub display_name: Option<String>,
    pub last_activity: DateTime<Utc>,
    /// Unread messages from the user, i.e. awaiting an admin.
    pub unread_count: usize,
}

/// First user awaiting a reply, for preselecting a conversation when the
/// admin opens the panel. Relies on the unread-first ordering of
/// [`ChatLog::active_users`].
pub fn first_unread(users: &[ActiveUser]) -> Option<&ActiveUser> {
    users.iter().find(|u| u.unread_count > 0)
}

/// Chat transcripts over the key-value store, one list per user and channel.
pub struct ChatLog<S> {
    store: S,
}

impl<S: KeyValueStore> ChatLog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// One user's transcript, ordered by send time ascending.
    pub fn transcript(
        &self,
        email: &str,
        kind: ChannelKind,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let mut messages = self.raw(email, kind)?;
        messages.sort_by(|a, b| a.sent_at.cmp(&b.sent_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }

    /// Append a message with `read = false` and return it.
    pub fn append(
        &mut self,
        email: &str,
        kind: ChannelKind,
        sender: Sender,
        sender_name: Option<&str>,
        body: &str,
    ) -> Result<ChatMessage, StoreError> {
        let mut messages = self.raw(email, kind)?;
        let now = Utc::now();
        let mut id = now.timestamp_millis() as u64;
        if let Some(last) = messages.last() {
            if id <= last.id {
                id = last.id + 1;
            }
        }
        let message = ChatMessage {
            id,
            sender,
            body: body.to_string(),
            sent_at: now,
            read: false,
            sender_name: sender_name.map(str::to_string),
        };
        messages.push(message.clone());
        set_json(&mut self.store, &kind.storage_key(email), &messages)?;
        Ok(message)
    }

    /// Flip `read` on all unread messages from `from`. Returns how many
    /// messages changed; nothing is written when none did.
    pub fn mark_incoming_read(
        &mut self,
        email: &str,
        kind: ChannelKind,
        from: Sender,
    ) -> Result<usize, StoreError> {
        let mut messages = self.raw(email, kind)?;
        let mut changed = 0;
        for message in messages.iter_mut() {
            if message.sender == from && !message.read {
                message.read = true;
                changed += 1;
            }
        }
        if changed > 0 {
            set_json(&mut self.store, &kind.storage_key(email), &messages)?;
        }
        Ok(changed)
    }

    /// Unread messages from `from` in one user's transcript.
    pub fn unread_from(
        &self,
        email: &str,
        kind: ChannelKind,
        from: Sender,
    ) -> Result<usize, StoreError> {
        Ok(self
            .raw(email, kind)?
            .iter()
            .filter(|m| m.sender == from && !m.read)
            .count())
    }

    /// Every user with a non-empty transcript in `kind`, for the admin's
    /// user list. Sorted unread-first, then most recent activity first.
    /// Unread counts are taken from the admin's perspective (messages sent
    /// by the user).
    ///
    /// The direct list additionally carries every registered account, so
    /// the admin can open a conversation with someone who has not written
    /// yet. Support conversations only exist once the user starts one.
    pub fn active_users(&self, kind: ChannelKind) -> Result<Vec<ActiveUser>, StoreError> {
        let prefix = kind.key_prefix();
        let mut users = Vec::new();
        for key in self.store.keys() {
            let email = match key.strip_prefix(prefix) {
                Some(email) => email,
                None => continue,
            };
            let messages = self.raw(email, kind)?;
            let last_activity = match messages.iter().map(|m| m.sent_at).max() {
                Some(at) => at,
                None => continue,
            };
            let unread_count = messages
                .iter()
                .filter(|m| m.sender == Sender::User && !m.read)
                .count();
            let display_name = get_json::<Credential, _>(&self.store, &credential_key(email))?
                .map(|c| c.display_name);
            users.push(ActiveUser {
                email: email.to_string(),
                display_name,
                last_activity,
                unread_count,
            });
        }
        if kind == ChannelKind::Direct {
            for key in self.store.keys() {
                let email = match key.strip_prefix(CREDENTIAL_PREFIX) {
                    Some(email) => email,
                    None => continue,
                };
                if users.iter().any(|u| u.email == email) {
                    continue;
                }
                let display_name =
                    get_json::<Credential, _>(&self.store, &key)?.map(|c| c.display_name);
                users.push(ActiveUser {
                    email: email.to_string(),
                    display_name,
                    last_activity: Utc::now(),
                    unread_count: 0,
                });
            }
        }
        users.sort_by(|a, b| {
            let a_unread = a.unread_count > 0;
            let b_unread = b.unread_count > 0;
            b_unread
                .cmp(&a_unread)
                .then(b.last_activity.cmp(&a.last_activity))
                .then(a.email.cmp(&b.email))
        });
        Ok(users)
    }

    fn raw(&self, email: &str, kind: ChannelKind) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(get_json(&self.store, &kind.storage_key(email))?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn log() -> ChatLog<MemoryStore> {
        ChatLog::new(MemoryStore::new())
    }

    #[test]
    fn append_starts_unread_and_keeps_order() {
        let mut log = log();
        let first = log
            .append("a@b.com", ChannelKind::Support, Sender::User, Some("Ivan"), "hello")
            .unwrap();
        let second = log
            .append("a@b.com", ChannelKind::Support, Sender::Admin, None, "hi there")
            .unwrap();
        assert!(!first.read);
        assert!(second.id > first.id);

        let transcript = log.transcript("a@b.com", ChannelKind::Support).unwrap();
        assert_eq!(transcript, vec![first, second]);
    }

    #[test]
    fn channels_are_independent() {
        let mut log = log();
        log.append("a@b.com", ChannelKind::Support, Sender::User, None, "support q")
            .unwrap();
        log.append("a@b.com", ChannelKind::Direct, Sender::User, None, "direct q")
            .unwrap();

        assert_eq!(log.transcript("a@b.com", ChannelKind::Support).unwrap().len(), 1);
        assert_eq!(log.transcript("a@b.com", ChannelKind::Direct).unwrap().len(), 1);
        assert_eq!(
            log.transcript("a@b.com", ChannelKind::Support).unwrap()[0].body,
            "support q"
        );
    }

    #[test]
    fn mark_incoming_read_flips_only_the_other_party() {
        let mut log = log();
        for _ in 0..3 {
            log.append("a@b.com", ChannelKind::Support, Sender::Admin, None, "reply")
                .unwrap();
        }
        log.append("a@b.com", ChannelKind::Support, Sender::User, None, "question")
            .unwrap();

        // User opens the chat: admin messages become read, their own stays unread
        let changed = log
            .mark_incoming_read("a@b.com", ChannelKind::Support, Sender::Admin)
            .unwrap();
        assert_eq!(changed, 3);
        assert_eq!(
            log.unread_from("a@b.com", ChannelKind::Support, Sender::Admin).unwrap(),
            0
        );
        assert_eq!(
            log.unread_from("a@b.com", ChannelKind::Support, Sender::User).unwrap(),
            1
        );

        // Second call is a no-op
        let changed = log
            .mark_incoming_read("a@b.com", ChannelKind::Support, Sender::Admin)
            .unwrap();
        assert_eq!(changed, 0);
    }

    #[test]
    fn active_users_sorts_unread_before_recent() {
        let mut log = log();
        // quiet_user wrote most recently but everything is read
        log.append("noisy@b.com", ChannelKind::Support, Sender::User, None, "help")
            .unwrap();
        log.append("quiet@b.com", ChannelKind::Support, Sender::User, None, "thanks")
            .unwrap();
        log.mark_incoming_read("quiet@b.com", ChannelKind::Support, Sender::User)
            .unwrap();

        let users = log.active_users(ChannelKind::Support).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email, "noisy@b.com");
        assert_eq!(users[0].unread_count, 1);
        assert_eq!(users[1].email, "quiet@b.com");
        assert_eq!(users[1].unread_count, 0);
    }

    #[test]
    fn active_users_unread_drops_to_zero_after_marking_read() {
        let mut log = log();
        for _ in 0..3 {
            log.append("a@b.com", ChannelKind::Support, Sender::User, None, "ping")
                .unwrap();
        }
        assert_eq!(log.active_users(ChannelKind::Support).unwrap()[0].unread_count, 3);

        log.mark_incoming_read("a@b.com", ChannelKind::Support, Sender::User)
            .unwrap();
        assert_eq!(log.active_users(ChannelKind::Support).unwrap()[0].unread_count, 0);
    }

    #[test]
    fn direct_list_includes_registered_users_without_a_transcript() {
        let mut store = MemoryStore::new();
        crate::storage::set_json(
            &mut store,
            &credential_key("ivan@example.com"),
            &Credential {
                password: "secret1".into(),
                display_name: "Ivan".into(),
            },
        )
        .unwrap();

        let log = ChatLog::new(store);
        let users = log.active_users(ChannelKind::Direct).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "ivan@example.com");
        assert_eq!(users[0].display_name.as_deref(), Some("Ivan"));
        assert_eq!(users[0].unread_count, 0);
        // The support list only lists started conversations
        assert!(log.active_users(ChannelKind::Support).unwrap().is_empty());
    }

    #[test]
    fn direct_list_does_not_duplicate_users_with_a_transcript() {
        let mut store = MemoryStore::new();
        crate::storage::set_json(
            &mut store,
            &credential_key("ivan@example.com"),
            &Credential {
                password: "secret1".into(),
                display_name: "Ivan".into(),
            },
        )
        .unwrap();

        let mut log = ChatLog::new(store);
        log.append("ivan@example.com", ChannelKind::Direct, Sender::User, None, "hi")
            .unwrap();

        let users = log.active_users(ChannelKind::Direct).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].unread_count, 1);
    }

    #[test]
    fn first_unread_picks_the_user_awaiting_a_reply() {
        let mut log = log();
        log.append("quiet@b.com", ChannelKind::Support, Sender::User, None, "hi")
            .unwrap();
        log.mark_incoming_read("quiet@b.com", ChannelKind::Support, Sender::User)
            .unwrap();
        log.append("noisy@b.com", ChannelKind::Support, Sender::User, None, "help")
            .unwrap();

        let users = log.active_users(ChannelKind::Support).unwrap();
        assert_eq!(first_unread(&users).unwrap().email, "noisy@b.com");

        log.mark_incoming_read("noisy@b.com", ChannelKind::Support, Sender::User)
            .unwrap();
        let users = log.active_users(ChannelKind::Support).unwrap();
        assert!(first_unread(&users).is_none());
    }

    #[test]
    fn active_users_resolves_display_names_from_credentials() {
        let mut store = MemoryStore::new();
        crate::storage::set_json(
            &mut store,
            &credential_key("a@b.com"),
            &Credential {
                password: "secret1".into(),
                display_name: "Ivan".into(),
            },
        )
        .unwrap();

        let mut log = ChatLog::new(store);
        log.append("a@b.com", ChannelKind::Support, Sender::User, Some("Ivan"), "hi")
            .unwrap();
        log.append("stranger@b.com", ChannelKind::Support, Sender::User, None, "hi")
            .unwrap();

        let users = log.active_users(ChannelKind::Support).unwrap();
        let ivan = users.iter().find(|u| u.email == "a@b.com").unwrap();
        assert_eq!(ivan.display_name.as_deref(), Some("Ivan"));
        let stranger = users.iter().find(|u| u.email == "stranger@b.com").unwrap();
        assert_eq!(stranger.display_name, None);
    }
}
