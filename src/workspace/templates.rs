//! One-shot draft generation state, decoupled from the chat thread.
//!
//! A draft session lives for one case-tab visit: switching tab or case
//! discards it. Generation completions carry a ticket so a response landing
//! after the session was discarded cannot populate a fresh one.

use crate::api::types::{TemplateDraft, TemplateType};

/// Ticket tying a generation request to the session that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftTicket(u64);

/// Single-draft generation cycle: type selection → generation → display.
#[derive(Debug)]
pub struct DraftSession {
    template_type: TemplateType,
    draft: Option<TemplateDraft>,
    generating: bool,
    epoch: u64,
}

impl Default for DraftSession {
    fn default() -> Self {
        Self {
            template_type: TemplateType::Dilekce,
            draft: None,
            generating: false,
            epoch: 0,
        }
    }
}

impl DraftSession {
    /// Pick the template type. Discards any generated draft so what is shown
    /// always matches the selected type.
    pub fn select_type(&mut self, template_type: TemplateType) {
        self.template_type = template_type;
        self.draft = None;
        self.epoch += 1;
    }

    /// Start a generation. Returns `None` while one is already running, so a
    /// rapid second invocation never issues a duplicate request.
    pub fn begin_generate(&mut self) -> Option<DraftTicket> {
        if self.generating {
            return None;
        }
        self.generating = true;
        Some(DraftTicket(self.epoch))
    }

    /// Store a finished draft. Returns `false` when the session was reset or
    /// retyped since the ticket was issued; the draft is then dropped.
    pub fn finish_generate(&mut self, ticket: DraftTicket, draft: TemplateDraft) -> bool {
        if ticket.0 != self.epoch {
            return false;
        }
        self.draft = Some(draft);
        self.generating = false;
        true
    }

    /// Record a failed generation: the flag clears, any prior draft stays.
    /// Retrying is simply calling generate again.
    pub fn fail_generate(&mut self, ticket: DraftTicket) {
        if ticket.0 == self.epoch {
            self.generating = false;
        }
    }

    /// Discard the session (case switch or leaving the templates tab).
    pub fn reset(&mut self) {
        self.draft = None;
        self.generating = false;
        self.epoch += 1;
    }

    pub fn template_type(&self) -> TemplateType {
        self.template_type
    }

    pub fn draft(&self) -> Option<&TemplateDraft> {
        self.draft.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(text: &str) -> TemplateDraft {
        TemplateDraft {
            draft: text.to_string(),
            sources: vec!["contract.pdf".to_string()],
        }
    }

    #[test]
    fn begin_generate_blocks_a_second_request_until_completion() {
        let mut session = DraftSession::default();
        let ticket = session.begin_generate().expect("first generate starts");
        assert!(session.begin_generate().is_none(), "second call must no-op");

        assert!(session.finish_generate(ticket, draft("Sayın Mahkeme...")));
        assert!(!session.is_generating());
        assert!(session.begin_generate().is_some());
    }

    #[test]
    fn select_type_discards_the_previous_draft() {
        let mut session = DraftSession::default();
        let ticket = session.begin_generate().expect("generate starts");
        assert!(session.finish_generate(ticket, draft("dilekçe metni")));

        session.select_type(TemplateType::Sozlesme);
        assert_eq!(session.template_type(), TemplateType::Sozlesme);
        assert!(session.draft().is_none());
    }

    #[test]
    fn completions_for_a_discarded_session_are_dropped() {
        let mut session = DraftSession::default();
        let ticket = session.begin_generate().expect("generate starts");
        session.reset();

        assert!(!session.finish_generate(ticket, draft("geç gelen taslak")));
        assert!(session.draft().is_none());

        // A new generation started after the reset is unaffected by the old
        // failure path either.
        let fresh = session.begin_generate().expect("fresh generate starts");
        session.fail_generate(ticket);
        assert!(session.is_generating());
        assert!(session.finish_generate(fresh, draft("yeni taslak")));
    }

    #[test]
    fn failed_generation_keeps_the_prior_draft_for_retry() {
        let mut session = DraftSession::default();
        let first = session.begin_generate().expect("generate starts");
        assert!(session.finish_generate(first, draft("ilk taslak")));

        let second = session.begin_generate().expect("retry starts");
        session.fail_generate(second);
        assert!(!session.is_generating());
        assert_eq!(session.draft().map(|d| d.draft.as_str()), Some("ilk taslak"));
    }
}
