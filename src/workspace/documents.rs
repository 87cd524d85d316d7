//! Tracked document set for the active case.
//!
//! The set mirrors server-side truth and performs no indexing logic of its
//! own. Every fetch is stamped with a ticket; only the most recently issued
//! load may apply, so a fast case switch racing an in-flight load can never
//! paint a stale list. Load failures keep the previous set on screen.

use crate::api::types::DocumentRecord;

/// Ticket tying a fetch to the load that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Wholesale-replace document collection with stale-load discard.
#[derive(Debug, Default)]
pub struct DocumentSet {
    records: Vec<DocumentRecord>,
    issued_seq: u64,
}

impl DocumentSet {
    /// Stamp a new load. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued_seq += 1;
        LoadTicket(self.issued_seq)
    }

    /// Apply a completed load. Returns `false` (and leaves the set untouched)
    /// when the ticket is not the most recent one issued.
    pub fn apply_load(&mut self, ticket: LoadTicket, records: Vec<DocumentRecord>) -> bool {
        if ticket.0 != self.issued_seq {
            return false;
        }
        self.records = records;
        true
    }

    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    /// Clear the set (case switch). Outstanding tickets go stale with it.
    pub fn reset(&mut self) {
        self.records.clear();
        self.issued_seq += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: i64, filename: &str) -> DocumentRecord {
        DocumentRecord {
            id,
            case_id: 7,
            filename: filename.to_string(),
            file_path: format!("uploads/case_7/{filename}"),
            file_type: Some("application/pdf".to_string()),
            file_size: Some(1024),
            uploaded_at: Utc::now(),
            is_indexed: false,
        }
    }

    #[test]
    fn only_the_most_recent_load_applies() {
        let mut set = DocumentSet::default();
        let stale = set.begin_load();
        let fresh = set.begin_load();

        assert!(set.apply_load(fresh, vec![record(1, "contract.pdf")]));
        assert!(!set.apply_load(stale, vec![record(2, "old.pdf")]));

        assert_eq!(set.records().len(), 1);
        assert_eq!(set.records()[0].filename, "contract.pdf");
    }

    #[test]
    fn reset_invalidates_outstanding_tickets() {
        let mut set = DocumentSet::default();
        let ticket = set.begin_load();
        set.reset();

        assert!(!set.apply_load(ticket, vec![record(1, "contract.pdf")]));
        assert!(set.records().is_empty());
    }

    #[test]
    fn failed_loads_leave_the_previous_set_visible() {
        let mut set = DocumentSet::default();
        let first = set.begin_load();
        assert!(set.apply_load(first, vec![record(1, "contract.pdf")]));

        // A failed load never calls apply_load; the set keeps its records.
        let _abandoned = set.begin_load();
        assert_eq!(set.records().len(), 1);
    }
}
