//! End-to-end tests: client pages driving the stub API over real HTTP.

use finesdesk_client::{
    load_dashboard, AbsencesPage, AdminsPage, FinesPage, HttpBackend, ListView, MyRecordsPage,
    StudentsPage,
};
use finesdesk_core::models::{Event, FineForm, FineStatus, Role, Session, SessionUser, StudentForm};
use finesdesk_core::{AppError, InvalidationBus, ModalPhase};
use finesdesk_server::seed::demo_store;
use finesdesk_server::{AppState, Config, EmbeddedServer, Store};
use std::time::Duration;

fn start(store: Store) -> (EmbeddedServer, HttpBackend) {
    let config = Config {
        port: 0,
        ..Config::default()
    };
    let server = EmbeddedServer::start(AppState::new(config, store), false).expect("server");
    let backend = HttpBackend::new(&server.url(), Duration::from_secs(5)).expect("backend");
    (server, backend)
}

fn session(role: Role, student_id: Option<&str>) -> Session {
    Session::new(SessionUser {
        id: 1,
        name: "Tester".to_string(),
        email: None,
        role,
        student_id: student_id.map(str::to_string),
    })
}

fn student_form(student_id: &str, email: &str) -> StudentForm {
    StudentForm {
        student_id: student_id.to_string(),
        first_name: "Gia".to_string(),
        last_name: "Mendoza".to_string(),
        email: email.to_string(),
        year_level: "2nd Year".to_string(),
        section: "B".to_string(),
    }
}

async fn add_student(page: &mut StudentsPage<HttpBackend>, form: StudentForm) {
    page.create.open_create();
    *page.create.form_mut() = form;
    page.create.submit().await.expect("create student");
}

#[tokio::test]
async fn created_then_deleted_student_disappears_after_sync() {
    let (_server, backend) = start(Store::default());
    let bus = InvalidationBus::new();
    let admin = session(Role::Admin, None);
    let mut page = StudentsPage::open(&admin, backend, &bus).expect("page");

    assert_eq!(page.list.refresh().await, Ok(0));
    add_student(&mut page, student_form("2024-0300", "gia@school.edu")).await;
    assert_eq!(page.create.modal().phase(), ModalPhase::Closed);

    assert_eq!(page.list.sync().await, Ok(true));
    let created = page.list.records()[0].clone();
    assert_eq!(created.student_id, "2024-0300");

    let message = page.delete(&created).await.expect("delete");
    assert_eq!(message.as_deref(), Some("Student deleted."));
    assert_eq!(page.list.sync().await, Ok(true));
    assert!(page.list.records().iter().all(|s| s.id != created.id));
}

#[tokio::test]
async fn duplicate_email_surfaces_as_field_alert() {
    let (_server, backend) = start(Store::default());
    let bus = InvalidationBus::new();
    let admin = session(Role::Admin, None);
    let mut page = StudentsPage::open(&admin, backend, &bus).expect("page");
    add_student(&mut page, student_form("2024-0001", "dup@school.edu")).await;

    page.create.open_create();
    *page.create.form_mut() = student_form("2024-0002", "dup@school.edu");
    let err = page.create.submit().await.expect_err("duplicate email");

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(page.create.modal().alert(), Some("email: already taken"));
    assert_eq!(page.create.modal().phase(), ModalPhase::Open);
    assert_eq!(page.create.modal().form().student_id, "2024-0002");
}

#[tokio::test]
async fn fine_payment_refreshes_list_and_rejects_second_payment() {
    let (_server, backend) = start(Store::default());
    let bus = InvalidationBus::new();
    let admin = session(Role::Admin, None);
    let mut students = StudentsPage::open(&admin, backend.clone(), &bus).expect("students");
    add_student(&mut students, student_form("2024-0010", "")).await;

    let mut fines = FinesPage::open(&admin, backend, &bus).expect("fines");
    fines.create.open_create();
    *fines.create.form_mut() = FineForm {
        student_id: "2024-0010".to_string(),
        violation: "No uniform".to_string(),
        amount: "30".to_string(),
    };
    fines.create.submit().await.expect("issue fine");
    fines.list.sync().await.expect("sync");
    let fine = fines.list.records()[0].clone();
    assert_eq!(fine.status, FineStatus::Unpaid);
    assert_eq!(fine.student_name, "Gia Mendoza");

    fines.pay(&fine).await.expect("pay");
    assert_eq!(fines.list.sync().await, Ok(true));
    assert_eq!(fines.list.records()[0].status, FineStatus::Paid);

    let err = fines.pay(&fine).await.expect_err("already paid");
    assert_eq!(err, AppError::Rejected("Fine is already paid.".to_string()));
    assert_eq!(fines.list.sync().await, Ok(false));
}

#[tokio::test]
async fn pages_respect_session_roles() {
    let (_server, backend) = start(Store::default());
    let bus = InvalidationBus::new();

    let secretary = session(Role::Secretary, None);
    assert!(matches!(
        AdminsPage::open(&secretary, backend.clone(), &bus),
        Err(AppError::Forbidden(_))
    ));
    assert!(AbsencesPage::open(&secretary, backend.clone(), &bus).is_ok());
    assert!(matches!(
        MyRecordsPage::open(&secretary, backend.clone(), &bus),
        Err(AppError::Forbidden(_))
    ));

    let student = session(Role::Student, Some("2024-0001"));
    assert!(matches!(
        StudentsPage::open(&student, backend.clone(), &bus),
        Err(AppError::Forbidden(_))
    ));
    let anonymous_student = session(Role::Student, None);
    assert!(MyRecordsPage::open(&anonymous_student, backend, &bus).is_err());
}

#[tokio::test]
async fn student_sees_only_own_records() {
    let store = demo_store(11).expect("demo");
    let owner = store
        .fines()
        .first()
        .map(|fine| fine.student_id.clone())
        .expect("demo data has fines");
    let (_server, backend) = start(store);
    let bus = InvalidationBus::new();

    let student = session(Role::Student, Some(&owner));
    let mut page = MyRecordsPage::open(&student, backend, &bus).expect("page");
    page.refresh().await.expect("refresh");

    assert!(!page.fines.records().is_empty());
    assert!(page.fines.records().iter().all(|f| f.student_id == owner));
    let absences = page.absences.records();
    assert!(absences.iter().all(|a| a.student_id == owner));
}

#[tokio::test]
async fn events_decode_from_bare_array_and_filter_by_month() {
    let (_server, backend) = start(demo_store(3).expect("demo"));
    let bus = InvalidationBus::new();
    let mut events: ListView<Event, HttpBackend> = ListView::new(backend, &bus);

    assert_eq!(events.refresh().await, Ok(6));
    assert_eq!(
        events.filter_options(),
        vec!["August", "September", "October"]
    );
}

#[tokio::test]
async fn dashboard_totals_match_server_data() {
    let store = demo_store(5).expect("demo");
    let students = store.students().len();
    let unpaid = store
        .fines()
        .iter()
        .filter(|fine| fine.status == FineStatus::Unpaid)
        .count();
    let (_server, backend) = start(store);

    let stats = load_dashboard(&session(Role::Secretary, None), &backend)
        .await
        .expect("dashboard");
    assert_eq!(stats.total_students, students);
    assert_eq!(stats.total_events, 6);
    assert_eq!(stats.unpaid_fines, unpaid);

    let denied = load_dashboard(&session(Role::Student, Some("2024-0001")), &backend).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("listener");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let backend =
        HttpBackend::new(&format!("http://{}", addr), Duration::from_secs(2)).expect("backend");
    let bus = InvalidationBus::new();
    let admin = session(Role::Admin, None);
    let mut page = StudentsPage::open(&admin, backend, &bus).expect("page");
    let err = page.list.refresh().await.expect_err("no server");
    assert!(matches!(err, AppError::Transport(_)));
    assert!(page.list.records().is_empty());
}
