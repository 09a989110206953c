//! Modal mutation flow: validate locally, send once, publish on success.

use crate::api::{Backend, Mutation};
use finesdesk_core::envelope::Normalized;
use finesdesk_core::{
    AppError, FormModel, Invalidation, InvalidationBus, Modal, ModalPhase, Record,
    RequestTicket, RequestTracker, Resource,
};
use serde::Serialize;
use std::future::Future;
use tracing::{info, warn};

/// Send `mutation` and publish an invalidation when it succeeds.
///
/// No retries: a failed mutation is reported once and left to the user.
///
/// # Returns
/// The normalized success response.
///
/// # Errors
/// Returns transport failures and backend rejections.
pub async fn run_mutation<B: Backend>(
    backend: &B,
    bus: &InvalidationBus,
    mutation: Mutation,
) -> Result<Normalized, AppError> {
    let outcome = backend
        .mutate(&mutation)
        .await
        .and_then(Normalized::into_result);
    match outcome {
        Ok(response) => {
            let change = mutation.change(&response);
            info!(
                resource = %mutation.resource,
                method = %mutation.method,
                "mutation succeeded"
            );
            bus.publish(Invalidation {
                resource: mutation.resource,
                change,
            });
            Ok(response)
        }
        Err(err) => {
            warn!(
                resource = %mutation.resource,
                method = %mutation.method,
                "mutation failed: {}",
                err
            );
            Err(err)
        }
    }
}

/// Delete `record` after the user confirmed.
///
/// # Errors
/// Returns the backend error; nothing is published on failure.
pub async fn delete_record<R: Record, B: Backend>(
    backend: &B,
    bus: &InvalidationBus,
    record: &R,
) -> Result<Option<String>, AppError> {
    let response = run_mutation(
        backend,
        bus,
        Mutation::delete(R::RESOURCE, record.record_id()),
    )
    .await?;
    Ok(response.message)
}

/// A submit in flight. Await it, then hand the result to
/// [`MutationFlow::finish`].
pub struct PendingSubmit {
    ticket: RequestTicket,
    future: std::pin::Pin<Box<dyn Future<Output = Result<Normalized, AppError>> + Send>>,
}

impl PendingSubmit {
    pub async fn wait(self) -> SubmitDone {
        let outcome = self.future.await;
        SubmitDone {
            ticket: self.ticket,
            outcome,
        }
    }
}

pub struct SubmitDone {
    ticket: RequestTicket,
    outcome: Result<Normalized, AppError>,
}

/// Create/update dialog for one resource.
pub struct MutationFlow<F: FormModel, B: Backend> {
    resource: Resource,
    backend: B,
    bus: InvalidationBus,
    modal: Modal<F>,
    target: Option<String>,
    tracker: RequestTracker,
}

impl<F, B> MutationFlow<F, B>
where
    F: FormModel + Serialize + Send + 'static,
    B: Backend,
{
    pub fn new(resource: Resource, backend: B, bus: InvalidationBus) -> Self {
        Self {
            resource,
            backend,
            bus,
            modal: Modal::new(),
            target: None,
            tracker: RequestTracker::new(),
        }
    }

    pub fn modal(&self) -> &Modal<F> {
        &self.modal
    }

    /// Editable form while the dialog is open.
    pub fn form_mut(&mut self) -> &mut F {
        self.modal.form_mut()
    }

    /// Id of the record being edited; `None` for create dialogs.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn open_create(&mut self) {
        self.abandon_submit();
        self.target = None;
        self.modal.open();
    }

    /// Open the dialog seeded from `record`.
    pub fn open_update<R>(&mut self, record: &R)
    where
        R: Record,
        F: for<'a> From<&'a R>,
    {
        self.abandon_submit();
        let id = record.record_id();
        self.modal.open_with(id.clone(), F::from(record));
        self.target = Some(id);
    }

    /// Validate and dispatch the form.
    ///
    /// # Errors
    /// Returns [`AppError::MissingFields`] without sending anything when a
    /// required field is blank, [`AppError::FormClosed`] when the dialog is not
    /// open, and [`AppError::Decode`] if the form cannot be serialized.
    pub fn start_submit(&mut self) -> Result<PendingSubmit, AppError> {
        let form = self.modal.begin_submit()?;
        let body = match serde_json::to_value(&form) {
            Ok(body) => body,
            Err(err) => {
                let err = AppError::Decode(err.to_string());
                self.modal.complete(Err(err.clone()));
                return Err(err);
            }
        };
        let mutation = match self.target.clone() {
            Some(id) => Mutation::update(self.resource, id, body),
            None => Mutation::create(self.resource, body),
        };
        let backend = self.backend.clone();
        let bus = self.bus.clone();
        Ok(PendingSubmit {
            ticket: self.tracker.issue(),
            future: Box::pin(async move { run_mutation(&backend, &bus, mutation).await }),
        })
    }

    /// Apply a finished submit to the dialog.
    ///
    /// Results that arrive after [`MutationFlow::cancel`] leave the dialog
    /// alone; the invalidation for a successful write has still been sent.
    pub fn finish(&mut self, done: SubmitDone) -> Result<Option<String>, AppError> {
        if done.ticket.is_current() {
            self.modal
                .complete(done.outcome.as_ref().map(|_| ()).map_err(Clone::clone));
            if done.outcome.is_ok() {
                self.target = None;
            }
        }
        done.outcome.map(|response| response.message)
    }

    /// Validate, send, and apply in one step.
    ///
    /// # Returns
    /// The backend's success message, if any.
    ///
    /// # Errors
    /// Returns local validation failures and backend errors; on error the
    /// dialog stays open with the form intact.
    pub async fn submit(&mut self) -> Result<Option<String>, AppError> {
        let pending = self.start_submit()?;
        let done = pending.wait().await;
        self.finish(done)
    }

    /// Close the dialog, discarding any in-flight result.
    pub fn cancel(&mut self) {
        self.tracker.cancel();
        self.tracker = RequestTracker::new();
        self.modal.cancel();
        self.target = None;
    }

    // Reopening mid-submit must not let the old request land on the new form.
    fn abandon_submit(&mut self) {
        if self.modal.phase() == ModalPhase::Submitting {
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::test_support::StubBackend;
    use finesdesk_core::models::{Student, StudentForm};
    use finesdesk_core::Change;
    use serde_json::json;

    type StudentFlow = MutationFlow<StudentForm, StubBackend>;

    fn flow(backend: &StubBackend, bus: &InvalidationBus) -> StudentFlow {
        MutationFlow::new(Resource::Students, backend.clone(), bus.clone())
    }

    fn fill(form: &mut StudentForm) {
        form.student_id = "2024-0200".to_string();
        form.first_name = "Iris".to_string();
        form.last_name = "Ramos".to_string();
        form.year_level = "4th Year".to_string();
    }

    fn student() -> Student {
        Student {
            id: 31,
            student_id: "2024-0031".to_string(),
            first_name: "Noel".to_string(),
            last_name: "Aquino".to_string(),
            email: Some("noel@school.edu".to_string()),
            year_level: "3rd Year".to_string(),
            section: None,
        }
    }

    #[tokio::test]
    async fn blank_required_field_sends_nothing() {
        let backend = StubBackend::default();
        let bus = InvalidationBus::new();
        let mut create = flow(&backend, &bus);
        create.open_create();
        create.form_mut().first_name = "Iris".to_string();

        let err = create.submit().await.expect_err("missing fields");
        assert!(matches!(err, AppError::MissingFields(_)));
        assert!(backend.sent().is_empty());
        assert_eq!(create.modal().phase(), ModalPhase::Open);
        assert!(create.modal().field_errors().contains("last_name"));
        assert_eq!(create.modal().form().first_name, "Iris");
    }

    #[tokio::test]
    async fn successful_create_closes_and_publishes_created_id() {
        let backend = StubBackend::default();
        backend.reply_with(
            201,
            json!({ "success": true, "message": "Student added.", "data": { "id": 77 } }),
        );
        let bus = InvalidationBus::new();
        let notices = bus.subscribe(&[Resource::Students]);
        let mut create = flow(&backend, &bus);
        create.open_create();
        fill(create.form_mut());

        let message = create.submit().await.expect("submit");
        assert_eq!(message.as_deref(), Some("Student added."));
        assert_eq!(create.modal().phase(), ModalPhase::Closed);

        let sent = backend.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Post);
        let body = sent[0].body.as_ref().expect("body");
        assert_eq!(body["last_name"], json!("Ramos"));

        let notice = notices.try_recv().expect("notice");
        assert_eq!(
            notice.change,
            Change::Created {
                id: Some("77".to_string())
            }
        );
    }

    #[tokio::test]
    async fn backend_validation_keeps_dialog_open_without_publishing() {
        let backend = StubBackend::default();
        backend.reply_with(
            422,
            json!({ "success": false, "errors": { "email": ["already taken"] } }),
        );
        let bus = InvalidationBus::new();
        let notices = bus.subscribe(&[Resource::Students]);
        let mut edit = flow(&backend, &bus);
        edit.open_update(&student());
        edit.form_mut().email = "taken@school.edu".to_string();

        let err = edit.submit().await.expect_err("rejected");
        assert_eq!(err.alert_message(), "email: already taken");
        assert_eq!(edit.modal().phase(), ModalPhase::Open);
        assert_eq!(edit.modal().alert(), Some("email: already taken"));
        assert_eq!(edit.modal().form().email, "taken@school.edu");
        assert_eq!(edit.target(), Some("31"));
        assert!(notices.try_recv().is_err());

        let sent = backend.sent();
        assert_eq!(sent[0].method, Method::Put);
        assert_eq!(sent[0].id.as_deref(), Some("31"));
    }

    #[tokio::test]
    async fn cancelled_submit_does_not_touch_the_dialog() {
        let backend = StubBackend::default();
        let bus = InvalidationBus::new();
        let notices = bus.subscribe(&[Resource::Students]);
        let mut create = flow(&backend, &bus);
        create.open_create();
        fill(create.form_mut());

        let pending = create.start_submit().expect("start");
        create.cancel();
        create.open_create();
        let done = pending.wait().await;
        assert!(create.finish(done).is_ok());

        assert_eq!(create.modal().phase(), ModalPhase::Open);
        assert_eq!(create.modal().form(), &StudentForm::default());
        assert!(notices.try_recv().is_ok());
    }

    #[tokio::test]
    async fn reopening_for_another_record_drops_the_pending_submit() {
        let backend = StubBackend::default();
        backend.reply_with(
            422,
            json!({ "success": false, "errors": { "email": ["already taken"] } }),
        );
        let bus = InvalidationBus::new();
        let mut edit = flow(&backend, &bus);
        edit.open_update(&student());
        let pending = edit.start_submit().expect("start");

        let other = Student {
            id: 32,
            first_name: "Ben".to_string(),
            ..student()
        };
        edit.open_update(&other);
        assert_eq!(edit.modal().phase(), ModalPhase::Open);
        assert_eq!(edit.target(), Some("32"));

        let done = pending.wait().await;
        assert!(edit.finish(done).is_err());
        assert_eq!(backend.sent()[0].id.as_deref(), Some("31"));
        assert_eq!(edit.modal().phase(), ModalPhase::Open);
        assert_eq!(edit.target(), Some("32"));
        assert_eq!(edit.modal().form().first_name, "Ben");
        assert_eq!(edit.modal().alert(), None);
    }

    #[tokio::test]
    async fn reopening_create_after_a_successful_pending_submit_stays_open() {
        let backend = StubBackend::default();
        let bus = InvalidationBus::new();
        let mut create = flow(&backend, &bus);
        create.open_create();
        fill(create.form_mut());
        let pending = create.start_submit().expect("start");

        create.open_create();
        create.form_mut().first_name = "Lia".to_string();
        let done = pending.wait().await;
        assert!(create.finish(done).is_ok());

        assert_eq!(create.modal().phase(), ModalPhase::Open);
        assert_eq!(create.modal().form().first_name, "Lia");
    }

    #[tokio::test]
    async fn delete_publishes_deleted_id() {
        let backend = StubBackend::default();
        let bus = InvalidationBus::new();
        let notices = bus.subscribe(&[Resource::Students]);

        delete_record(&backend, &bus, &student())
            .await
            .expect("delete");
        assert_eq!(backend.sent()[0].segments(), vec!["api", "students", "31"]);
        assert_eq!(
            notices.try_recv().expect("notice").change,
            Change::Deleted {
                id: "31".to_string()
            }
        );
    }

    #[tokio::test]
    async fn failed_delete_publishes_nothing() {
        let backend = StubBackend::default();
        backend.reply_with(
            409,
            json!({ "success": false, "message": "Cannot delete a student with unpaid fines." }),
        );
        let bus = InvalidationBus::new();
        let notices = bus.subscribe(&[Resource::Students]);

        let err = delete_record(&backend, &bus, &student())
            .await
            .expect_err("conflict");
        assert_eq!(
            err.alert_message(),
            "Cannot delete a student with unpaid fines."
        );
        assert!(notices.try_recv().is_err());
    }
}
