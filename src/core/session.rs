//! In-memory chat sessions and their sidebar grouping.
//!
//! Sessions live only as long as the process. The store keeps them
//! newest-created-first; grouping is computed at render time from each
//! session's `updated_at`.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::core::message::Message;

pub const NEW_CHAT_TITLE: &str = "New chat";
pub const TITLE_MAX_CHARS: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: NEW_CHAT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends a user message. The first one also names the session.
    pub fn push_user_message(&mut self, message: Message, now: DateTime<Utc>) {
        if self.messages.is_empty() {
            self.title = derive_title(&message.content);
        }
        self.messages.push(message);
        self.updated_at = now;
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn message_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    /// Removes the message with `id`, returning whether anything was removed.
    pub fn remove_message(&mut self, id: &str) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        self.messages.len() != before
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// First `TITLE_MAX_CHARS` characters of `text`, with `...` when truncated.
pub fn derive_title(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Ordered list of sessions plus the active-session pointer.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Vec<ChatSession>,
    active_id: Option<String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatSession> {
        self.sessions.iter()
    }

    pub fn as_slice(&self) -> &[ChatSession] {
        &self.sessions
    }

    /// Creates a session at the front of the list and makes it active.
    pub fn create(&mut self, now: DateTime<Utc>) -> &ChatSession {
        let session = ChatSession::new(now);
        self.active_id = Some(session.id.clone());
        self.sessions.insert(0, session);
        &self.sessions[0]
    }

    pub fn get(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ChatSession> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active(&self) -> Option<&ChatSession> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    /// Activates `id` if it exists. Returns whether the selection changed.
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_none() || self.active_id.as_deref() == Some(id) {
            return false;
        }
        self.active_id = Some(id.to_string());
        true
    }

    /// Id of the session `offset` positions away from the active one in
    /// display order, clamped to the ends of the list.
    pub fn neighbor_of_active(&self, offset: isize) -> Option<&str> {
        if self.sessions.is_empty() {
            return None;
        }
        let current = self
            .active_id
            .as_deref()
            .and_then(|id| self.sessions.iter().position(|s| s.id == id));
        let target = match current {
            Some(index) => index
                .saturating_add_signed(offset)
                .min(self.sessions.len() - 1),
            None => 0,
        };
        Some(self.sessions[target].id.as_str())
    }

    /// Removes the session. Deleting the active session leaves none active.
    pub fn delete(&mut self, id: &str) -> Option<ChatSession> {
        let index = self.sessions.iter().position(|s| s.id == id)?;
        let removed = self.sessions.remove(index);
        if self.active_id.as_deref() == Some(id) {
            self.active_id = None;
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
        self.active_id = None;
    }
}

/// Sidebar recency buckets, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecencyBucket {
    Today,
    Yesterday,
    PreviousSevenDays,
    Older,
}

impl RecencyBucket {
    pub const ALL: [RecencyBucket; 4] = [
        RecencyBucket::Today,
        RecencyBucket::Yesterday,
        RecencyBucket::PreviousSevenDays,
        RecencyBucket::Older,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RecencyBucket::Today => "Today",
            RecencyBucket::Yesterday => "Yesterday",
            RecencyBucket::PreviousSevenDays => "Previous 7 Days",
            RecencyBucket::Older => "Older",
        }
    }

    /// Bucket for a session last updated `age` ago. Boundaries are strict:
    /// exactly 24h old is already "Yesterday".
    pub fn for_age(age: Duration) -> Self {
        if age < Duration::days(1) {
            RecencyBucket::Today
        } else if age < Duration::days(2) {
            RecencyBucket::Yesterday
        } else if age < Duration::days(7) {
            RecencyBucket::PreviousSevenDays
        } else {
            RecencyBucket::Older
        }
    }
}

/// Groups sessions by recency, skipping empty buckets and preserving the
/// input order inside each bucket.
pub fn group_sessions(
    now: DateTime<Utc>,
    sessions: &[ChatSession],
) -> Vec<(RecencyBucket, Vec<&ChatSession>)> {
    let mut groups: Vec<(RecencyBucket, Vec<&ChatSession>)> = RecencyBucket::ALL
        .iter()
        .map(|bucket| (*bucket, Vec::new()))
        .collect();

    for session in sessions {
        let bucket = RecencyBucket::for_age(now - session.updated_at);
        if let Some((_, members)) = groups.iter_mut().find(|(b, _)| *b == bucket) {
            members.push(session);
        }
    }

    groups.retain(|(_, members)| !members.is_empty());
    groups
}
