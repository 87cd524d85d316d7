//! Optimistic chat thread for one case.
//!
//! Questions appear in the thread before the backend confirms them. Each
//! optimistic entry carries a process-unique token; when the answer lands the
//! entry is replaced in place (never appended beside), and on failure it is
//! removed entirely. Resolutions whose token no longer exists are discarded
//! silently: after a case switch the thread they would update is gone.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use crate::api::types::{ChatAnswer, ChatHistoryEntry};
use crate::error::SubmitError;

static NEXT_PENDING_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Correlation token for an optimistic entry. Tokens are issued from a
/// process-wide counter and never collide across cases or sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingToken(u64);

impl PendingToken {
    fn next() -> Self {
        Self(NEXT_PENDING_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identity issued to a confirmed entry.
///
/// The answer endpoint reports no row id, so an entry answered live keeps its
/// local token until the next history load brings the server id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmedId {
    Server(i64),
    Session(PendingToken),
}

/// Identity of a thread entry. The pending and confirmed spaces are disjoint
/// by construction, so provenance needs no separate flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEntryId {
    Pending(PendingToken),
    Confirmed(ConfirmedId),
}

/// One question/answer pair in the thread.
#[derive(Debug, Clone)]
pub struct ChatEntry {
    pub id: ChatEntryId,
    pub case_id: i64,
    pub question: String,
    pub answer: String,
    pub sources: Vec<String>,
    pub compliance_notice: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatEntry {
    pub fn is_pending(&self) -> bool {
        matches!(self.id, ChatEntryId::Pending(_))
    }

    fn from_history(case_id: i64, entry: ChatHistoryEntry) -> Self {
        Self {
            id: ChatEntryId::Confirmed(ConfirmedId::Server(entry.id)),
            case_id,
            question: entry.message,
            answer: entry.response,
            sources: entry.sources,
            compliance_notice: None,
            created_at: entry.created_at,
        }
    }
}

/// Ordered chat sequence under concurrent optimistic submission.
#[derive(Debug, Default)]
pub struct ChatThread {
    entries: Vec<ChatEntry>,
    in_flight: Option<PendingToken>,
}

impl ChatThread {
    /// Append an optimistic entry and return its token.
    ///
    /// At most one question may await its answer at a time; the guard lives
    /// here rather than in the presentation layer.
    pub fn submit(&mut self, case_id: i64, question: &str) -> Result<PendingToken, SubmitError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SubmitError::EmptyQuestion);
        }
        if self.in_flight.is_some() {
            return Err(SubmitError::QuestionPending);
        }

        let token = PendingToken::next();
        self.entries.push(ChatEntry {
            id: ChatEntryId::Pending(token),
            case_id,
            question: question.to_string(),
            answer: String::new(),
            sources: Vec::new(),
            compliance_notice: None,
            created_at: Utc::now(),
        });
        self.in_flight = Some(token);
        Ok(token)
    }

    /// Replace the pending entry for `token` in place with its answer.
    ///
    /// Returns `false` when no such entry exists (the thread was reset or
    /// reloaded since submission) — the resolution is then dropped without
    /// touching the sequence.
    pub fn resolve(&mut self, token: PendingToken, answer: &ChatAnswer) -> bool {
        let Some(index) = self.position_of(token) else {
            return false;
        };

        let entry = &mut self.entries[index];
        entry.id = ChatEntryId::Confirmed(ConfirmedId::Session(token));
        entry.answer = answer.response.clone();
        entry.sources = answer.sources.clone();
        entry.compliance_notice = answer.kvkk_warning.clone();

        if self.in_flight == Some(token) {
            self.in_flight = None;
        }
        true
    }

    /// Roll the pending entry for `token` back out of the sequence.
    ///
    /// Returns the question text so the caller can hand it back to the input
    /// field; `None` when the entry is already gone.
    pub fn reject(&mut self, token: PendingToken) -> Option<String> {
        let index = self.position_of(token)?;
        let entry = self.entries.remove(index);
        if self.in_flight == Some(token) {
            self.in_flight = None;
        }
        Some(entry.question)
    }

    /// Clear the thread (case switch).
    pub fn reset(&mut self) {
        self.entries.clear();
        self.in_flight = None;
    }

    /// Replace the thread wholesale with stored history.
    ///
    /// Any in-flight pending entry is dropped with it; a resolution arriving
    /// later finds no matching token and becomes a no-op.
    pub fn load_history(&mut self, case_id: i64, history: Vec<ChatHistoryEntry>) {
        self.entries = history
            .into_iter()
            .map(|entry| ChatEntry::from_history(case_id, entry))
            .collect();
        self.in_flight = None;
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn has_question_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    fn position_of(&self, token: PendingToken) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.id == ChatEntryId::Pending(token))
    }
}
