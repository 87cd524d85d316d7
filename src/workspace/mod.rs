//! Case workspace session: the tabbed coordinator over chat, documents and
//! draft generation for a single active case.
//!
//! One logical session owns the visible state. All I/O completions re-enter
//! through `&self` methods that re-check the session epoch captured before
//! the request suspended: a completion belonging to a superseded case is
//! state-mutation-cancelled (silently discarded), never applied. The state
//! lock is never held across an await.

pub mod chat;
pub mod documents;
pub mod templates;

use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::ApiClient;
use crate::api::types::{Case, DocumentRecord, DocumentUpload, TemplateDraft, TemplateType};
use crate::error::{ApiError, SessionError};
use chat::{ChatEntry, ChatThread};
use documents::DocumentSet;
use templates::DraftSession;

/// Sub-view selector for the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceTab {
    Chat,
    Documents,
    Templates,
}

/// Session lifecycle for the mounted workspace view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspacePhase {
    Uninitialized,
    Loading(i64),
    Ready(i64),
}

/// Failure category of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// A load call failed; previous data stays on screen.
    Fetch,
    /// A send/upload/delete/generate failed and was rolled back.
    Submission,
}

/// One user-visible error report, surfaced exactly once.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Result of opening a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Ready,
    /// Another `open_case` superseded this one while its loads were in flight.
    Superseded,
}

/// Result of submitting a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    Answered,
    /// The request failed; the optimistic entry was rolled back and the
    /// question text is returned for the input field.
    RolledBack { question: String },
    /// The completion belonged to a superseded session and was discarded.
    Superseded,
}

/// Result of a document-list refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    Failed,
    Superseded,
}

/// Result of a document upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { document_id: i64 },
    Failed,
    Superseded,
}

/// Result of a document delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The caller did not confirm; the endpoint was never contacted.
    NotConfirmed,
    Deleted,
    Failed,
    Superseded,
}

/// Result of a draft generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftOutcome {
    Generated,
    /// A generation was already running; no second request was issued.
    AlreadyGenerating,
    Failed,
    Superseded,
}

#[derive(Debug)]
struct WorkspaceState {
    epoch: u64,
    phase: WorkspacePhase,
    tab: WorkspaceTab,
    case: Option<Case>,
    chat: ChatThread,
    documents: DocumentSet,
    draft: DraftSession,
    notices: Vec<Notice>,
}

impl WorkspaceState {
    fn new() -> Self {
        Self {
            epoch: 0,
            phase: WorkspacePhase::Uninitialized,
            tab: WorkspaceTab::Chat,
            case: None,
            chat: ChatThread::default(),
            documents: DocumentSet::default(),
            draft: DraftSession::default(),
            notices: Vec::new(),
        }
    }

    fn ready_case_id(&self) -> Result<i64, SessionError> {
        match self.phase {
            WorkspacePhase::Ready(case_id) => Ok(case_id),
            _ => Err(SessionError::NoActiveCase),
        }
    }

    fn push_notice(&mut self, kind: NoticeKind, message: String) {
        self.notices.push(Notice { kind, message });
    }

    /// Clear every per-case collection and supersede in-flight completions.
    fn clear_for_case_switch(&mut self) {
        self.epoch += 1;
        self.case = None;
        self.chat.reset();
        self.documents.reset();
        self.draft.reset();
        self.notices.clear();
    }
}

/// Top-level coordinator for one case workspace view.
#[derive(Debug)]
pub struct CaseWorkspace {
    api: Arc<ApiClient>,
    state: Mutex<WorkspaceState>,
}

impl CaseWorkspace {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: Mutex::new(WorkspaceState::new()),
        }
    }

    /// Open a case, superseding whatever was open before.
    ///
    /// Case metadata, the document list and the chat history load
    /// concurrently. A metadata failure is fatal for the session (the caller
    /// is expected to navigate back to the case list); document and history
    /// failures degrade to an empty collection plus one notice.
    pub async fn open_case(&self, case_id: i64) -> Result<OpenOutcome, ApiError> {
        let epoch = {
            let mut state = self.state();
            state.clear_for_case_switch();
            state.phase = WorkspacePhase::Loading(case_id);
            state.tab = WorkspaceTab::Chat;
            state.epoch
        };

        let (case, documents, history) = tokio::join!(
            self.api.fetch_case(case_id),
            self.api.list_documents(case_id),
            self.api.chat_history(case_id),
        );

        let mut state = self.state();
        if state.epoch != epoch {
            tracing::debug!(case_id, "discarding superseded case load");
            return Ok(OpenOutcome::Superseded);
        }

        let case = match case {
            Ok(case) => case,
            Err(err) => {
                state.phase = WorkspacePhase::Uninitialized;
                return Err(err);
            }
        };

        match documents {
            Ok(records) => {
                let ticket = state.documents.begin_load();
                state.documents.apply_load(ticket, records);
            }
            Err(err) => {
                tracing::warn!(case_id, error = %err, "document load failed");
                state.push_notice(
                    NoticeKind::Fetch,
                    format!("Could not load the documents for this case: {err}"),
                );
            }
        }

        match history {
            Ok(entries) => state.chat.load_history(case_id, entries),
            Err(err) => {
                tracing::warn!(case_id, error = %err, "chat history load failed");
                state.push_notice(
                    NoticeKind::Fetch,
                    format!("Could not load the conversation history: {err}"),
                );
            }
        }

        state.case = Some(case);
        state.phase = WorkspacePhase::Ready(case_id);
        Ok(OpenOutcome::Ready)
    }

    /// Unmount the workspace: every collection clears and in-flight
    /// completions for the old case become orphaned.
    pub fn close_case(&self) {
        let mut state = self.state();
        state.clear_for_case_switch();
        state.phase = WorkspacePhase::Uninitialized;
        state.tab = WorkspaceTab::Chat;
    }

    /// Switch the visible tab. Leaving the templates tab discards the draft
    /// session; chat and document state are never reloaded or reset by a tab
    /// switch.
    pub fn switch_tab(&self, tab: WorkspaceTab) -> Result<(), SessionError> {
        let mut state = self.state();
        state.ready_case_id()?;
        if state.tab == WorkspaceTab::Templates && tab != WorkspaceTab::Templates {
            state.draft.reset();
        }
        state.tab = tab;
        Ok(())
    }

    /// Submit a question: optimistic append, then in-place resolution or
    /// rollback once the backend responds.
    pub async fn submit_question(&self, question: &str) -> Result<AskOutcome, SessionError> {
        let (epoch, case_id, token) = {
            let mut state = self.state();
            let case_id = state.ready_case_id()?;
            let token = state.chat.submit(case_id, question)?;
            (state.epoch, case_id, token)
        };

        let result = self.api.send_question(case_id, question.trim()).await;

        let mut state = self.state();
        if state.epoch != epoch {
            tracing::debug!(case_id, "discarding chat completion for a superseded session");
            return Ok(AskOutcome::Superseded);
        }

        match result {
            Ok(answer) => {
                if state.chat.resolve(token, &answer) {
                    Ok(AskOutcome::Answered)
                } else {
                    tracing::debug!(case_id, "chat completion found no pending entry to update");
                    Ok(AskOutcome::Superseded)
                }
            }
            Err(err) => {
                tracing::warn!(case_id, error = %err, "question submission failed");
                let question = state.chat.reject(token).unwrap_or_default();
                state.push_notice(
                    NoticeKind::Submission,
                    format!("Could not send the question: {err}"),
                );
                Ok(AskOutcome::RolledBack { question })
            }
        }
    }

    /// Re-fetch the document list. Only the most recent load for the current
    /// session may apply; anything else is discarded.
    pub async fn refresh_documents(&self) -> Result<RefreshOutcome, SessionError> {
        let (epoch, case_id, ticket) = {
            let mut state = self.state();
            let case_id = state.ready_case_id()?;
            let ticket = state.documents.begin_load();
            (state.epoch, case_id, ticket)
        };

        let result = self.api.list_documents(case_id).await;

        let mut state = self.state();
        if state.epoch != epoch {
            tracing::debug!(case_id, "discarding document load for a superseded session");
            return Ok(RefreshOutcome::Superseded);
        }

        match result {
            Ok(records) => {
                if state.documents.apply_load(ticket, records) {
                    Ok(RefreshOutcome::Applied)
                } else {
                    tracing::debug!(case_id, "discarding stale document load");
                    Ok(RefreshOutcome::Superseded)
                }
            }
            Err(err) => {
                tracing::warn!(case_id, error = %err, "document refresh failed");
                state.push_notice(
                    NoticeKind::Fetch,
                    format!("Could not refresh the document list: {err}"),
                );
                Ok(RefreshOutcome::Failed)
            }
        }
    }

    /// Upload a file to the active case and refresh the list on success.
    /// The newly created record starts un-indexed; indexing completion only
    /// becomes visible on a later load.
    pub async fn upload_document(&self, upload: DocumentUpload) -> Result<UploadOutcome, SessionError> {
        let filename = upload.filename.clone();
        let (epoch, case_id) = {
            let state = self.state();
            let case_id = state.ready_case_id()?;
            (state.epoch, case_id)
        };

        let result = self.api.upload_document(case_id, upload).await;

        let record = {
            let mut state = self.state();
            if state.epoch != epoch {
                tracing::debug!(case_id, "discarding upload completion for a superseded session");
                return Ok(UploadOutcome::Superseded);
            }
            match result {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(case_id, filename = %filename, error = %err, "upload failed");
                    state.push_notice(
                        NoticeKind::Submission,
                        format!("Could not upload '{filename}': {err}"),
                    );
                    return Ok(UploadOutcome::Failed);
                }
            }
        };

        tracing::debug!(case_id, document_id = record.id, "document uploaded");
        self.refresh_documents().await?;
        Ok(UploadOutcome::Uploaded {
            document_id: record.id,
        })
    }

    /// Delete a document. Deletion is irreversible, so the endpoint is only
    /// contacted once the caller has confirmed; the list refreshes on
    /// success.
    pub async fn delete_document(
        &self,
        document_id: i64,
        confirmed: bool,
    ) -> Result<DeleteOutcome, SessionError> {
        if !confirmed {
            return Ok(DeleteOutcome::NotConfirmed);
        }

        let (epoch, case_id) = {
            let state = self.state();
            let case_id = state.ready_case_id()?;
            (state.epoch, case_id)
        };

        let result = self.api.delete_document(document_id).await;

        {
            let mut state = self.state();
            if state.epoch != epoch {
                tracing::debug!(case_id, "discarding delete completion for a superseded session");
                return Ok(DeleteOutcome::Superseded);
            }
            if let Err(err) = result {
                tracing::warn!(case_id, document_id, error = %err, "document delete failed");
                state.push_notice(
                    NoticeKind::Submission,
                    format!("Could not delete the document: {err}"),
                );
                return Ok(DeleteOutcome::Failed);
            }
        }

        self.refresh_documents().await?;
        Ok(DeleteOutcome::Deleted)
    }

    /// Pick the draft template type; discards the previously generated draft.
    pub fn select_template_type(&self, template_type: TemplateType) {
        self.state().draft.select_type(template_type);
    }

    /// Generate a draft for the active case. A second invocation while one
    /// is running is a no-op; a failure keeps any prior draft for retry.
    pub async fn generate_draft(&self, context: Option<String>) -> Result<DraftOutcome, SessionError> {
        let (epoch, case_id, template_type, ticket) = {
            let mut state = self.state();
            let case_id = state.ready_case_id()?;
            let Some(ticket) = state.draft.begin_generate() else {
                return Ok(DraftOutcome::AlreadyGenerating);
            };
            (state.epoch, case_id, state.draft.template_type(), ticket)
        };

        let result = self
            .api
            .generate_template(case_id, template_type, context)
            .await;

        let mut state = self.state();
        if state.epoch != epoch {
            tracing::debug!(case_id, "discarding draft completion for a superseded session");
            return Ok(DraftOutcome::Superseded);
        }

        match result {
            Ok(draft) => {
                if state.draft.finish_generate(ticket, draft) {
                    Ok(DraftOutcome::Generated)
                } else {
                    tracing::debug!(case_id, "discarding draft for a discarded session");
                    Ok(DraftOutcome::Superseded)
                }
            }
            Err(err) => {
                tracing::warn!(case_id, error = %err, "draft generation failed");
                state.draft.fail_generate(ticket);
                state.push_notice(
                    NoticeKind::Submission,
                    format!("Could not generate the draft: {err}"),
                );
                Ok(DraftOutcome::Failed)
            }
        }
    }

    // --- Snapshot accessors for the presentation layer ---

    pub fn phase(&self) -> WorkspacePhase {
        self.state().phase
    }

    pub fn active_tab(&self) -> WorkspaceTab {
        self.state().tab
    }

    pub fn case(&self) -> Option<Case> {
        self.state().case.clone()
    }

    pub fn chat_entries(&self) -> Vec<ChatEntry> {
        self.state().chat.entries().to_vec()
    }

    pub fn question_in_flight(&self) -> bool {
        self.state().chat.has_question_in_flight()
    }

    pub fn documents(&self) -> Vec<DocumentRecord> {
        self.state().documents.records().to_vec()
    }

    pub fn template_type(&self) -> TemplateType {
        self.state().draft.template_type()
    }

    pub fn draft(&self) -> Option<TemplateDraft> {
        self.state().draft.draft().cloned()
    }

    pub fn draft_in_progress(&self) -> bool {
        self.state().draft.is_generating()
    }

    /// Drain pending notices. Each failure is reported exactly once: once
    /// taken, a notice is gone.
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.state().notices)
    }

    fn state(&self) -> MutexGuard<'_, WorkspaceState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
