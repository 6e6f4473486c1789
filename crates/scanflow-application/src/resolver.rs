//! Entity resolution.
//!
//! Two independent resolution flows (patients and test kits) share one
//! contract: a fetched candidate list, a case-insensitive substring search
//! over display fields, and a single confirmed selection. Re-opening a
//! resolver always starts from a fresh state, so no search text or prior
//! selection leaks across independent resolution attempts.

use scanflow_core::kit::TestKit;
use scanflow_core::patient::PatientRecord;

/// A record that can be offered for selection.
pub trait Candidate: Clone + Send {
    /// The fields the search box matches against.
    fn search_fields(&self) -> Vec<&str>;
}

impl Candidate for PatientRecord {
    /// Patients are matched by full name or email.
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.full_name, &self.email]
    }
}

impl Candidate for TestKit {
    /// Kits are matched by their display code.
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.code]
    }
}

/// One resolution attempt: candidates plus the user's search and pick.
///
/// The surrounding session treats "no candidates" and "fetch failed"
/// identically; a failed fetch simply opens an empty resolver, and a retry
/// is achieved by re-opening it (which re-fetches).
#[derive(Debug, Clone)]
pub struct EntityResolver<C: Candidate> {
    candidates: Vec<C>,
    query: String,
    selected: Option<C>,
}

impl<C: Candidate> EntityResolver<C> {
    /// Opens a fresh resolution attempt over the given candidates.
    ///
    /// Search text and selection always start empty.
    pub fn open(candidates: Vec<C>) -> Self {
        Self {
            candidates,
            query: String::new(),
            selected: None,
        }
    }

    /// All fetched candidates, unfiltered.
    pub fn candidates(&self) -> &[C] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Updates the search text.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Candidates matching the current search text.
    ///
    /// Case-insensitive substring match over each candidate's search
    /// fields; an empty query matches everything.
    pub fn filtered(&self) -> Vec<&C> {
        if self.query.is_empty() {
            return self.candidates.iter().collect();
        }
        let needle = self.query.to_lowercase();
        self.candidates
            .iter()
            .filter(|candidate| {
                candidate
                    .search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Marks a candidate as the pending selection.
    pub fn select(&mut self, candidate: C) {
        self.selected = Some(candidate);
    }

    pub fn selection(&self) -> Option<&C> {
        self.selected.as_ref()
    }

    /// Consumes the resolver, yielding the confirmed pick if there is one.
    pub fn confirm(self) -> Option<C> {
        self.selected
    }
}
