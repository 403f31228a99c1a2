//! Text and image analysis forms.
//!
//! DESIGN
//! ======
//! `begin` and `settle` bracket one submission. While a ticket is
//! outstanding `can_submit` is false, so a second concurrent submission is
//! impossible. Settling replaces result and error wholesale; the input is
//! never touched, so a failed attempt can be retried as-is.

#[cfg(test)]
#[path = "analysis_test.rs"]
mod analysis_test;

use crate::api::{ApiClient, EMPTY_TEXT_MESSAGE, ImageUpload, MISSING_IMAGE_MESSAGE};
use crate::error::ApiError;
use crate::gate::{RequestGate, Ticket};
use crate::types::DetectionResult;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("a submission is already in progress")]
    Busy,

    #[error("form is no longer mounted")]
    Unmounted,

    #[error("{0}")]
    Invalid(String),
}

/// The single artifact a form submits.
pub trait AnalysisInput {
    type Payload;

    /// Check the input and produce what will be sent.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when there is nothing to submit.
    fn prepare(&self) -> Result<Self::Payload, ApiError>;

    fn reset(&mut self);
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextInput {
    pub text: String,
}

impl AnalysisInput for TextInput {
    type Payload = String;

    fn prepare(&self) -> Result<String, ApiError> {
        if self.text.trim().is_empty() {
            return Err(ApiError::validation(EMPTY_TEXT_MESSAGE));
        }
        Ok(self.text.clone())
    }

    fn reset(&mut self) {
        self.text.clear();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageInput {
    pub file: Option<ImageUpload>,
}

impl AnalysisInput for ImageInput {
    type Payload = ImageUpload;

    fn prepare(&self) -> Result<ImageUpload, ApiError> {
        self.file.clone().ok_or_else(|| ApiError::validation(MISSING_IMAGE_MESSAGE))
    }

    fn reset(&mut self) {
        self.file = None;
    }
}

#[derive(Debug, Default)]
pub struct AnalysisForm<I> {
    input: I,
    result: Option<DetectionResult>,
    error: Option<String>,
    gate: RequestGate,
}

pub type TextAnalysisForm = AnalysisForm<TextInput>;
pub type ImageAnalysisForm = AnalysisForm<ImageInput>;

impl<I: AnalysisInput> AnalysisForm<I> {
    pub fn new(input: I) -> Self {
        Self { input, result: None, error: None, gate: RequestGate::new() }
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn result(&self) -> Option<&DetectionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.gate.is_busy()
    }

    /// Whether the submit trigger is enabled.
    pub fn can_submit(&self) -> bool {
        !self.gate.is_busy() && self.gate.is_mounted()
    }

    /// Start a submission: validate, clear the error slot, take a ticket.
    ///
    /// # Errors
    ///
    /// `Busy` while a previous submission is outstanding, `Unmounted` after
    /// [`AnalysisForm::unmount`], `Invalid` when the input fails validation
    /// (the message is also placed in the error slot).
    pub fn begin(&mut self) -> Result<(Ticket, I::Payload), FormError> {
        if !self.gate.is_mounted() {
            return Err(FormError::Unmounted);
        }
        if self.gate.is_busy() {
            return Err(FormError::Busy);
        }
        self.error = None;
        let payload = match self.input.prepare() {
            Ok(payload) => payload,
            Err(e) => {
                let message = e.to_string();
                self.error = Some(message.clone());
                return Err(FormError::Invalid(message));
            }
        };
        let ticket = self.gate.try_begin().ok_or(FormError::Busy)?;
        Ok((ticket, payload))
    }

    /// Apply a settled submission. Returns `false` if it was discarded.
    pub fn settle(&mut self, ticket: Ticket, outcome: Result<DetectionResult, ApiError>) -> bool {
        if !self.gate.finish(ticket) {
            tracing::debug!("discarding stale analysis response");
            return false;
        }
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.error = None;
            }
            Err(e) => {
                self.result = None;
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Reset input, result and error.
    pub fn clear(&mut self) {
        self.input.reset();
        self.result = None;
        self.error = None;
    }

    pub fn unmount(&mut self) {
        self.gate.unmount();
    }
}

impl AnalysisForm<TextInput> {
    /// Validate and submit the text, then apply the outcome.
    ///
    /// # Errors
    ///
    /// See [`AnalysisForm::begin`]. Request failures are not errors here;
    /// they land in the error slot.
    pub async fn submit(&mut self, client: &ApiClient) -> Result<(), FormError> {
        let (ticket, text) = self.begin()?;
        let outcome = client.analyze_text(&text).await;
        self.settle(ticket, outcome);
        Ok(())
    }
}

impl AnalysisForm<ImageInput> {
    /// Validate and upload the image, then apply the outcome.
    ///
    /// # Errors
    ///
    /// See [`AnalysisForm::begin`]. Request failures are not errors here;
    /// they land in the error slot.
    pub async fn submit(&mut self, client: &ApiClient) -> Result<(), FormError> {
        let (ticket, upload) = self.begin()?;
        let outcome = client.analyze_image(&upload).await;
        self.settle(ticket, outcome);
        Ok(())
    }
}
