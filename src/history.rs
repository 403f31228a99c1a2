//! Paging through past detection results.
//!
//! DESIGN
//! ======
//! The server does the windowing: each page asks for exactly
//! `skip = page * page_size`, `limit = page_size`. [`visible`] only re-slices
//! when a server ignores the window and returns more rows than asked for,
//! and says so in the log.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::gate::RequestGate;
use crate::types::DetectionResult;

pub const PAGE_SIZE_OPTIONS: [u32; 3] = [5, 10, 25];
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const HISTORY_LOAD_FAILED: &str = "Failed to load detection history";

/// The `skip`/`limit` pair sent to the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    pub limit: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pager {
    page: u32,
    page_size: u32,
}

impl Default for Pager {
    fn default() -> Self {
        Self { page: 0, page_size: DEFAULT_PAGE_SIZE }
    }
}

impl Pager {
    /// # Errors
    ///
    /// Returns `Validation` for a zero page size.
    pub fn new(page: u32, page_size: u32) -> Result<Self, ApiError> {
        check_page_size(page_size)?;
        Ok(Self { page, page_size })
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub fn window(&self) -> PageWindow {
        PageWindow { skip: u64::from(self.page) * u64::from(self.page_size), limit: self.page_size }
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page;
    }

    pub fn next_page(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Change the page size and return to the first page.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a zero page size; the pager is unchanged.
    pub fn set_page_size(&mut self, page_size: u32) -> Result<(), ApiError> {
        check_page_size(page_size)?;
        self.page_size = page_size;
        self.page = 0;
        Ok(())
    }
}

fn check_page_size(page_size: u32) -> Result<(), ApiError> {
    if page_size == 0 {
        return Err(ApiError::validation("Page size must be at least 1"));
    }
    Ok(())
}

/// Rows to display for `window` out of what the server returned.
#[must_use]
pub fn visible<T>(window: PageWindow, rows: &[T]) -> &[T] {
    let limit = window.limit as usize;
    if rows.len() <= limit {
        return rows;
    }
    tracing::warn!(
        returned = rows.len(),
        skip = window.skip,
        limit = window.limit,
        "server ignored page window; re-slicing locally"
    );
    // An offset past the end means the server applied `skip` but not `limit`.
    let start = usize::try_from(window.skip).ok().filter(|&skip| skip < rows.len()).unwrap_or(0);
    let end = start.saturating_add(limit).min(rows.len());
    &rows[start..end]
}

// =============================================================================
// VIEW
// =============================================================================

/// History screen state: pager, current rows, inline error slot.
#[derive(Debug, Default)]
pub struct HistoryView {
    pager: Pager,
    rows: Vec<DetectionResult>,
    window: Option<PageWindow>,
    error: Option<String>,
    gate: RequestGate,
}

impl HistoryView {
    #[must_use]
    pub fn new(pager: Pager) -> Self {
        Self { pager, ..Self::default() }
    }

    #[must_use]
    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }

    /// Rows for the current window.
    #[must_use]
    pub fn rows(&self) -> &[DetectionResult] {
        match self.window {
            Some(window) => visible(window, &self.rows),
            None => &self.rows,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn unmount(&mut self) {
        self.gate.unmount();
    }

    /// Fetch the pager's current window, superseding any earlier fetch.
    pub async fn refresh(&mut self, client: &ApiClient) {
        let (ticket, window) = self.begin();
        let outcome = client.list_detections(window).await;
        self.settle(ticket, window, outcome);
    }

    fn begin(&mut self) -> (crate::gate::Ticket, PageWindow) {
        self.error = None;
        (self.gate.begin_superseding(), self.pager.window())
    }

    fn settle(
        &mut self,
        ticket: crate::gate::Ticket,
        window: PageWindow,
        outcome: Result<Vec<DetectionResult>, ApiError>,
    ) -> bool {
        if !self.gate.finish(ticket) {
            tracing::debug!("discarding stale history response");
            return false;
        }
        match outcome {
            Ok(rows) => {
                self.rows = rows;
                self.window = Some(window);
            }
            Err(e) => {
                tracing::warn!(error = %e, "history fetch failed");
                self.rows.clear();
                self.window = None;
                self.error = Some(match e {
                    ApiError::Validation(message)
                    | ApiError::AuthFailure { message }
                    | ApiError::Request { message, .. } => message,
                    _ => HISTORY_LOAD_FAILED.to_owned(),
                });
            }
        }
        true
    }
}
