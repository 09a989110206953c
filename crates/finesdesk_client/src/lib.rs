//! REST client layer for FinesDesk: backend seam, list views, mutation
//! dialogs and role-scoped pages.

/// Backend trait and mutation descriptors.
pub mod api;
/// Dashboard loader.
pub mod dashboard;
/// `reqwest` backend.
pub mod http;
/// List page controller.
pub mod list_view;
/// Modal mutation flow.
pub mod mutation;
/// Role-scoped pages.
pub mod pages;
#[cfg(test)]
pub(crate) mod test_support;

pub use api::{fetch_records, Backend, Method, Mutation};
pub use dashboard::load_dashboard;
pub use http::HttpBackend;
pub use list_view::{Applied, Fetched, ListView};
pub use mutation::{delete_record, run_mutation, MutationFlow, PendingSubmit, SubmitDone};
pub use pages::{
    AbsencesPage, AdminsPage, EventsPage, FinesPage, ManagePage, Managed, MyRecordsPage,
    SecretariesPage, StudentsPage,
};
