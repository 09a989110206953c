//! Modal form lifecycle.
//!
//! `Closed -> Open(prefill?) -> Submitting -> Closed | Open(errors)`.
//! The modal owns the form values, the field-level errors and the alert text;
//! it never talks to the network itself.

use crate::error::AppError;
use crate::validation::{check_required, FieldErrors, FormModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Closed,
    Open,
    Submitting,
}

#[derive(Debug, Clone)]
pub struct Modal<F> {
    phase: ModalPhase,
    initial: F,
    form: F,
    prefill_key: Option<String>,
    field_errors: FieldErrors,
    alert: Option<String>,
}

impl<F: FormModel> Default for Modal<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FormModel> Modal<F> {
    pub fn new() -> Self {
        Self {
            phase: ModalPhase::Closed,
            initial: F::default(),
            form: F::default(),
            prefill_key: None,
            field_errors: FieldErrors::new(),
            alert: None,
        }
    }

    pub fn phase(&self) -> ModalPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != ModalPhase::Closed
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    /// Mutable access for editing fields while the modal is open.
    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Identity of the record the form was seeded from, for update modals.
    pub fn prefill_key(&self) -> Option<&str> {
        self.prefill_key.as_deref()
    }

    fn clear_feedback(&mut self) {
        self.field_errors = FieldErrors::new();
        self.alert = None;
    }

    /// Open an empty create form.
    pub fn open(&mut self) {
        self.initial = F::default();
        self.form = self.initial.clone();
        self.prefill_key = None;
        self.clear_feedback();
        self.phase = ModalPhase::Open;
    }

    /// Open an update form seeded from the record identified by `key`.
    ///
    /// The form is re-seeded unless the modal is already open for the same
    /// record, in which case in-progress edits are kept. Opening during a
    /// submit abandons that submit: its result no longer applies here.
    pub fn open_with(&mut self, key: impl Into<String>, prefill: F) {
        let key = key.into();
        let reseed =
            self.phase != ModalPhase::Open || self.prefill_key.as_deref() != Some(key.as_str());
        if reseed {
            self.initial = prefill;
            self.form = self.initial.clone();
            self.clear_feedback();
        }
        self.prefill_key = Some(key);
        self.phase = ModalPhase::Open;
    }

    /// Run local presence checks and enter `Submitting`.
    ///
    /// # Returns
    /// A snapshot of the form to send.
    ///
    /// # Errors
    /// - [`AppError::FormClosed`] when the modal is not open.
    /// - [`AppError::MissingFields`] when required fields are blank; the
    ///   modal stays open with those field errors and the alert populated.
    pub fn begin_submit(&mut self) -> Result<F, AppError> {
        if self.phase != ModalPhase::Open {
            return Err(AppError::FormClosed);
        }
        if let Err(errors) = check_required(&self.form) {
            let err = AppError::MissingFields(errors.clone());
            self.alert = Some(err.alert_message());
            self.field_errors = errors;
            return Err(err);
        }
        self.clear_feedback();
        self.phase = ModalPhase::Submitting;
        Ok(self.form.clone())
    }

    /// Apply the outcome of the submit request.
    ///
    /// Success closes the modal and resets the form; failure reopens it with
    /// the errors while keeping what the user typed.
    pub fn complete(&mut self, outcome: Result<(), AppError>) {
        if self.phase != ModalPhase::Submitting {
            return;
        }
        match outcome {
            Ok(()) => self.reset_closed(),
            Err(err) => {
                self.field_errors = err.field_errors().cloned().unwrap_or_default();
                self.alert = Some(err.alert_message());
                self.phase = ModalPhase::Open;
            }
        }
    }

    /// Explicit cancel: close and restore the initial values.
    pub fn cancel(&mut self) {
        self.reset_closed();
    }

    fn reset_closed(&mut self) {
        self.form = self.initial.clone();
        self.clear_feedback();
        self.phase = ModalPhase::Closed;
    }
}
