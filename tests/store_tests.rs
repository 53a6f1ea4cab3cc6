use rtimeclock::core::clock::ClockLogic;
use rtimeclock::core::directory::DirectoryLogic;
use rtimeclock::core::report::ReportLogic;
use rtimeclock::core::status::derive_status;
use rtimeclock::db::directory::{assign_user, insert_company, insert_department, insert_user};
use rtimeclock::db::initialize::init_db;
use rtimeclock::db::migrate::applied_versions;
use rtimeclock::db::queries::{append_event_checked, load_events_by_user_date};
use rtimeclock::db::store::EventStore;
use rtimeclock::errors::AppError;
use rtimeclock::models::action::ClockAction::{self, *};
use rtimeclock::models::event::NewClockEvent;
use rtimeclock::models::role::{Capability, Role};
use rtimeclock::models::state::ClockState;

mod common;
use common::{FixedClockStore, at, day, memory_store};

#[test]
fn test_migrations_are_recorded() {
    let (pool, _) = memory_store(Role::User);
    let versions = applied_versions(&pool.conn).unwrap();

    assert_eq!(versions.len(), 3);
    assert!(versions[0].contains("create_directory"));
}

#[test]
fn test_init_db_reports_applied_migrations_once() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();

    let first = init_db(&conn).unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first[2].0, "20260915_0003_add_event_source");

    assert!(init_db(&conn).unwrap().is_empty());
}

#[test]
fn test_append_and_reload_round_trip() {
    let (mut pool, session) = memory_store(Role::User);
    let tenancy = session.tenancy().unwrap().clone();

    let new = NewClockEvent::new(session.user_id, &tenancy, ClockIn, Some("  early start "));
    let stored = append_event_checked(&mut pool.conn, &new, at("09:00:00"), None).unwrap();

    let loaded = load_events_by_user_date(&pool.conn, session.user_id, &day()).unwrap();
    assert_eq!(loaded, vec![stored.clone()]);
    assert_eq!(stored.notes.as_deref(), Some("early start"));
    assert_eq!(stored.department_ids, tenancy.department_ids);
    assert_eq!(stored.source, "cli");
}

#[test]
fn test_blank_notes_are_dropped() {
    let (_, session) = memory_store(Role::User);
    let new = NewClockEvent::new(session.user_id, session.tenancy().unwrap(), ClockIn, Some("   "));
    assert_eq!(new.notes, None);
}

#[test]
fn test_stale_expected_last_is_a_conflict() {
    let (mut pool, session) = memory_store(Role::User);
    let tenancy = session.tenancy().unwrap().clone();

    let first = NewClockEvent::new(session.user_id, &tenancy, ClockIn, None);
    append_event_checked(&mut pool.conn, &first, at("09:00"), None).unwrap();

    // a second writer that still believes the day is empty
    let second = NewClockEvent::new(session.user_id, &tenancy, ClockIn, None);
    let err = append_event_checked(&mut pool.conn, &second, at("09:00:01"), None).unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let loaded = load_events_by_user_date(&pool.conn, session.user_id, &day()).unwrap();
    assert_eq!(loaded.len(), 1);
}

#[test]
fn test_events_sharing_a_timestamp_keep_insert_order() {
    let (mut pool, session) = memory_store(Role::User);
    let tenancy = session.tenancy().unwrap().clone();

    let a = NewClockEvent::new(session.user_id, &tenancy, ClockIn, None);
    let a = append_event_checked(&mut pool.conn, &a, at("09:00"), None).unwrap();
    let b = NewClockEvent::new(session.user_id, &tenancy, BreakStart, None);
    append_event_checked(&mut pool.conn, &b, at("09:00"), Some(a.id)).unwrap();

    let loaded = load_events_by_user_date(&pool.conn, session.user_id, &day()).unwrap();
    let actions: Vec<ClockAction> = loaded.iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![ClockIn, BreakStart]);
}

#[test]
fn test_record_walks_through_a_day() {
    let (pool, session) = memory_store(Role::User);
    let mut store = FixedClockStore {
        pool,
        now: at("09:00"),
    };

    let steps = [
        (ClockIn, "09:00", ClockState::Working),
        (BreakStart, "12:00", ClockState::OnBreak),
        (BreakEnd, "12:30", ClockState::Working),
        (ClockOut, "17:00", ClockState::Idle),
    ];
    for (action, time, expected) in steps {
        store.now = at(time);
        let rec = ClockLogic::record(&mut store, &session, action, None).unwrap();
        assert_eq!(rec.status.state, expected);
        assert_eq!(rec.event.timestamp, at(time));
    }

    let status = ClockLogic::current_status(&mut store, &session).unwrap();
    assert_eq!(status.available_actions, vec![ClockIn, RemoteStart]);
}

#[test]
fn test_record_rejects_unavailable_action_without_writing() {
    let (pool, session) = memory_store(Role::User);
    let mut store = FixedClockStore {
        pool,
        now: at("09:00"),
    };
    ClockLogic::record(&mut store, &session, ClockIn, None).unwrap();

    store.now = at("10:00");
    let err = ClockLogic::record(&mut store, &session, BreakEnd, None).unwrap_err();
    assert!(matches!(err, AppError::InvalidAction { .. }));

    assert_eq!(store.load_day(session.user_id, day()).unwrap().len(), 1);
}

#[test]
fn test_record_requires_tenancy_and_capability() {
    let (pool, mut session) = memory_store(Role::User);
    let mut store = FixedClockStore {
        pool,
        now: at("09:00"),
    };

    session.tenancy = None;
    let err = ClockLogic::record(&mut store, &session, ClockIn, None).unwrap_err();
    assert!(matches!(err, AppError::MissingTenancy(_)));

    session.role = Role::Superadmin;
    let err = ClockLogic::record(&mut store, &session, ClockIn, None).unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied(_)));
}

#[test]
fn test_role_capabilities() {
    use Capability::*;

    assert!(!Role::Superadmin.can(TrackTime));
    assert!(Role::Superadmin.can(ManageCompanies));
    for cap in [TrackTime, ManageCompanies, ManageDepartments, ManageUsers, ViewOwnReport] {
        assert!(Role::Owner.can(cap));
    }
    assert!(Role::Admin.can(ManageUsers));
    assert!(!Role::Admin.can(ManageDepartments));
    assert!(Role::User.can(TrackTime));
    assert!(!Role::User.can(ManageUsers));

    assert!(Role::Admin.can_create(Role::User));
    assert!(!Role::Admin.can_create(Role::Admin));
    assert!(!Role::User.can_create(Role::User));
}

#[test]
fn test_parsing_rejects_unknown_kinds() {
    assert_eq!("Clock_In".parse::<ClockAction>().unwrap(), ClockIn);
    assert!(matches!(
        "lunch".parse::<ClockAction>(),
        Err(AppError::InvalidEventKind(_))
    ));
    assert!(matches!("boss".parse::<Role>(), Err(AppError::InvalidRole(_))));
}

#[test]
fn test_scoped_management() {
    let (pool, alice) = memory_store(Role::User);
    let conn = &pool.conn;
    let dept = alice.tenancy.as_ref().unwrap().department_ids[0];

    let owner = insert_user(conn, "olivia", Role::Owner).unwrap();
    let other = insert_company(conn, "Other", None, Some(owner.id)).unwrap();
    let other_dept = insert_department(conn, other.id, "Ops").unwrap();

    let admin = insert_user(conn, "adam", Role::Admin).unwrap();
    assign_user(conn, admin.id, dept).unwrap();
    let outsider = insert_user(conn, "oscar", Role::User).unwrap();
    assign_user(conn, outsider.id, other_dept.id).unwrap();

    let alice_row = rtimeclock::db::directory::get_user_by_name(conn, "alice").unwrap();
    let admin_session = DirectoryLogic::open_session(conn, Some("adam")).unwrap();
    let owner_session = DirectoryLogic::open_session(conn, Some("olivia")).unwrap();

    // admin shares Sales with alice, not Ops with oscar
    assert!(DirectoryLogic::can_manage(conn, &admin_session, &alice_row).unwrap());
    assert!(!DirectoryLogic::can_manage(conn, &admin_session, &outsider).unwrap());

    // olivia owns "Other" only
    assert!(DirectoryLogic::can_manage(conn, &owner_session, &outsider).unwrap());
    assert!(!DirectoryLogic::can_manage(conn, &owner_session, &alice_row).unwrap());

    assert!(!DirectoryLogic::can_manage(conn, &alice, &outsider).unwrap());

    // reports follow the same rule
    assert!(ReportLogic::resolve_subject(conn, &admin_session, Some("alice")).is_ok());
    assert!(matches!(
        ReportLogic::resolve_subject(conn, &admin_session, Some("oscar")),
        Err(AppError::PermissionDenied(_))
    ));
}

#[test]
fn test_sessions_of_unknown_or_inactive_users() {
    let (pool, alice) = memory_store(Role::User);
    let conn = &pool.conn;

    assert!(matches!(
        DirectoryLogic::open_session(conn, None),
        Err(AppError::NotAuthenticated(_))
    ));
    assert!(matches!(
        DirectoryLogic::open_session(conn, Some("nobody")),
        Err(AppError::NotAuthenticated(_))
    ));

    let root = insert_user(conn, "root", Role::Superadmin).unwrap();
    let root = DirectoryLogic::open_session(conn, Some(&root.name)).unwrap();
    assert!(root.tenancy.is_none());

    DirectoryLogic::set_active(conn, &root, &alice.name, false).unwrap();
    assert!(matches!(
        DirectoryLogic::open_session(conn, Some("alice")),
        Err(AppError::NotAuthenticated(_))
    ));
}

#[test]
fn test_only_the_first_user_needs_no_session() {
    let (pool, _) = memory_store(Role::User);
    let err = DirectoryLogic::add_user(&pool.conn, None, "mallory", Role::Superadmin).unwrap_err();
    assert!(matches!(err, AppError::NotAuthenticated(_)));
}

#[test]
fn test_report_days_cover_only_days_with_events() {
    let (pool, session) = memory_store(Role::User);
    let mut store = FixedClockStore {
        pool,
        now: at("09:00"),
    };
    ClockLogic::record(&mut store, &session, ClockIn, None).unwrap();

    let subject = ReportLogic::resolve_subject(&store.pool.conn, &session, None).unwrap();
    let days = ReportLogic::days(
        &store.pool.conn,
        &subject,
        day().pred_opt().unwrap(),
        day().succ_opt().unwrap(),
        at("11:00"),
    )
    .unwrap();

    assert_eq!(days.len(), 1);
    assert_eq!(days[0].summary.total_work_seconds, 2 * 3600);
    assert!(days[0].summary.open);
}

#[test]
fn test_clock_stepping_back_keeps_append_order() {
    let (mut pool, session) = memory_store(Role::User);
    let tenancy = session.tenancy().unwrap().clone();

    // the second event lands in a repeated wall-clock hour
    let inn = NewClockEvent::new(session.user_id, &tenancy, ClockIn, None);
    let inn = append_event_checked(&mut pool.conn, &inn, at("02:50"), None).unwrap();
    let out = NewClockEvent::new(session.user_id, &tenancy, ClockOut, None);
    let out = append_event_checked(&mut pool.conn, &out, at("02:10"), Some(inn.id)).unwrap();

    let loaded = load_events_by_user_date(&pool.conn, session.user_id, &day()).unwrap();
    let actions: Vec<ClockAction> = loaded.iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![ClockIn, ClockOut]);
    assert_eq!(derive_status(&loaded).state, ClockState::Idle);

    // the next writer must name the clock-out as the last event
    let again = NewClockEvent::new(session.user_id, &tenancy, ClockIn, None);
    let err = append_event_checked(&mut pool.conn, &again, at("02:20"), Some(inn.id)).unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    append_event_checked(&mut pool.conn, &again, at("02:20"), Some(out.id)).unwrap();
}

#[test]
fn test_stored_unknown_action_is_reported() {
    let (pool, session) = memory_store(Role::User);

    pool.conn
        .execute(
            "INSERT INTO clock_events
                (user_id, company_id, department_ids, action, timestamp, date)
             VALUES (?1, 1, '[1]', 'lunch', '2026-10-16T12:00:00.000', '2026-10-16')",
            [session.user_id],
        )
        .unwrap();

    let err = load_events_by_user_date(&pool.conn, session.user_id, &day()).unwrap_err();
    match err {
        AppError::InvalidEventKind(kind) => assert_eq!(kind, "lunch"),
        other => panic!("unexpected error: {other}"),
    }
}
