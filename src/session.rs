// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pending single-field edits, waiting for the user's next message.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};

use crate::config::Settings;
use crate::models::{EditableField, UserId};

pub type ChatId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub user: UserId,
    pub transaction_id: i64,
    pub field: EditableField,
    pub started_at: NaiveDateTime,
}

/// Outcome of [`EditSessions::take`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    Ready(PendingEdit),
    Expired(PendingEdit),
    Empty,
}

#[derive(Debug)]
pub struct EditSessions {
    pending: HashMap<ChatId, PendingEdit>,
    timeout: Duration,
}

impl Default for EditSessions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl EditSessions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let secs = i64::try_from(settings.edit_timeout_secs).unwrap_or(i64::MAX);
        Self::new(Duration::try_seconds(secs).unwrap_or(Duration::MAX))
    }

    /// Opens an edit for `chat`, replacing any edit already waiting there.
    pub fn begin(
        &mut self,
        chat: ChatId,
        user: UserId,
        transaction_id: i64,
        field: EditableField,
        now: NaiveDateTime,
    ) -> Option<PendingEdit> {
        self.pending.insert(
            chat,
            PendingEdit {
                user,
                transaction_id,
                field,
                started_at: now,
            },
        )
    }

    pub fn cancel(&mut self, chat: ChatId) -> Option<PendingEdit> {
        self.pending.remove(&chat)
    }

    /// Claims the edit waiting in `chat` for `user`. The edit is removed
    /// either way once it belongs to `user`.
    pub fn take(&mut self, chat: ChatId, user: UserId, now: NaiveDateTime) -> Claim {
        match self.pending.get(&chat) {
            Some(p) if p.user == user => {}
            _ => return Claim::Empty,
        }
        let Some(edit) = self.pending.remove(&chat) else {
            return Claim::Empty;
        };
        if self.is_expired(&edit, now) {
            log::warn!(
                "edit of transaction #{} in chat {} expired",
                edit.transaction_id,
                chat
            );
            return Claim::Expired(edit);
        }
        Claim::Ready(edit)
    }

    pub fn is_pending(&self, chat: ChatId, now: NaiveDateTime) -> bool {
        self.pending
            .get(&chat)
            .is_some_and(|p| !self.is_expired(p, now))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops every expired edit and returns how many were removed.
    pub fn purge_expired(&mut self, now: NaiveDateTime) -> usize {
        let before = self.pending.len();
        let timeout = self.timeout;
        self.pending.retain(|_, p| now - p.started_at <= timeout);
        before - self.pending.len()
    }

    fn is_expired(&self, edit: &PendingEdit, now: NaiveDateTime) -> bool {
        now - edit.started_at > self.timeout
    }
}
