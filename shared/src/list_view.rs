use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{FetchError, PageError};
use crate::model::{Center, FetchTicket, TicketCounter};
use crate::PAGE_SIZE;

/// Where the centers collection is in its fetch lifecycle. A failed fetch
/// leaves the collection absent, which is not the same as empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Collection {
    #[default]
    Idle,
    Loading {
        ticket: FetchTicket,
    },
    Loaded(Vec<Center>),
    Failed {
        error: FetchError,
    },
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListBody {
    Loading,
    Failed,
    NoMatches,
    Rows,
}

#[derive(Debug, Clone)]
pub struct ListView {
    collection: Collection,
    search_term: String,
    current_page: usize,
    page_size: usize,
    tickets: TicketCounter,
}

impl Default for ListView {
    fn default() -> Self {
        Self::with_page_size(PAGE_SIZE)
    }
}

impl ListView {
    /// `page_size` is clamped to at least one row.
    #[must_use]
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            collection: Collection::Idle,
            search_term: String::new(),
            current_page: 0,
            page_size: page_size.max(1),
            tickets: TicketCounter::default(),
        }
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.clamp_page();
    }

    /// Starts a (re)load. Any earlier in-flight ticket stops matching.
    pub fn begin_load(&mut self) -> FetchTicket {
        let ticket = self.tickets.issue();
        self.collection = Collection::Loading { ticket };
        ticket
    }

    pub fn apply_centers(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Center>, FetchError>,
    ) -> bool {
        if !matches!(self.collection, Collection::Loading { ticket: t } if t == ticket) {
            warn!(ticket = ticket.value(), "discarding stale centers result");
            return false;
        }
        match result {
            Ok(centers) => self.set_collection(centers),
            Err(error) => {
                warn!(code = error.kind().code(), %error, "centers fetch failed");
                self.collection = Collection::Failed { error };
            }
        }
        true
    }

    pub fn set_collection(&mut self, centers: Vec<Center>) {
        debug!(count = centers.len(), "centers loaded");
        self.collection = Collection::Loaded(centers);
        self.clamp_page();
    }

    /// Unmount: drops the collection and view state, keeps the ticket
    /// counter so in-flight results are discarded.
    pub fn reset(&mut self) {
        self.collection = Collection::Idle;
        self.search_term.clear();
        self.current_page = 0;
    }

    #[instrument(skip(self), level = "debug")]
    pub fn set_search_term(&mut self, term: &str) {
        if self.search_term != term {
            self.search_term = term.to_string();
            self.current_page = 0;
        }
    }

    pub fn set_page(&mut self, index: usize) -> Result<(), PageError> {
        let page_count = self.page_count();
        if index >= page_count.max(1) {
            return Err(PageError::OutOfRange { index, page_count });
        }
        self.current_page = index;
        Ok(())
    }

    fn clamp_page(&mut self) {
        if self.current_page >= self.page_count().max(1) {
            debug!(page = self.current_page, "page out of range after reload, resetting");
            self.current_page = 0;
        }
    }

    #[must_use]
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.collection, Collection::Loading { .. })
    }

    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        match &self.collection {
            Collection::Failed { error } => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub fn filtered(&self) -> Vec<&Center> {
        let Collection::Loaded(centers) = &self.collection else {
            return Vec::new();
        };
        let folded = self.search_term.to_lowercase();
        centers.iter().filter(|c| c.matches(&folded)).collect()
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.filtered().len().div_ceil(self.page_size)
    }

    #[must_use]
    pub fn shows_pagination(&self) -> bool {
        self.filtered().len() > self.page_size
    }

    /// Centers on the current page; empty when nothing matches or the page is
    /// out of range.
    #[must_use]
    pub fn page_window(&self) -> Vec<&Center> {
        self.filtered()
            .into_iter()
            .skip(self.current_page * self.page_size)
            .take(self.page_size)
            .collect()
    }

    /// 1-based running number of the `index`th row on the current page.
    #[must_use]
    pub fn row_number(&self, index: usize) -> usize {
        self.current_page * self.page_size + index + 1
    }

    #[must_use]
    pub fn body(&self) -> ListBody {
        match &self.collection {
            Collection::Idle | Collection::Loading { .. } => ListBody::Loading,
            Collection::Failed { .. } => ListBody::Failed,
            Collection::Loaded(_) if self.filtered().is_empty() => ListBody::NoMatches,
            Collection::Loaded(_) => ListBody::Rows,
        }
    }
}
