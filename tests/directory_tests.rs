use rtimeclock::core::directory::DirectoryLogic;
use rtimeclock::db::directory::{
    assign_user, find_company, insert_company, insert_department, insert_user, list_departments,
    tenancy_of_user,
};
use rtimeclock::db::pool::DbPool;
use rtimeclock::db::queries::{append_event_checked, load_events_by_user_date};
use rtimeclock::errors::AppError;
use rtimeclock::models::action::ClockAction;
use rtimeclock::models::event::NewClockEvent;
use rtimeclock::models::role::Role;
use rtimeclock::models::session::Session;

mod common;
use common::{at, day};

/// `root` Superadmin; `olivia` owns Acme with department Sales, where
/// `otto` (Owner), `adam` (Admin) and `alice` (User) work; `otto` owns
/// Other with department Ops; `bob` (User) has no department.
struct Directory {
    pool: DbPool,
    acme: i64,
    sales: i64,
    other: i64,
    ops: i64,
}

impl Directory {
    fn new() -> Self {
        let pool = DbPool::open(":memory:").unwrap();
        let conn = &pool.conn;

        insert_user(conn, "root", Role::Superadmin).unwrap();
        let olivia = insert_user(conn, "olivia", Role::Owner).unwrap();
        let otto = insert_user(conn, "otto", Role::Owner).unwrap();
        let adam = insert_user(conn, "adam", Role::Admin).unwrap();
        let alice = insert_user(conn, "alice", Role::User).unwrap();
        insert_user(conn, "bob", Role::User).unwrap();

        let acme = insert_company(conn, "Acme", Some("Retail"), Some(olivia.id)).unwrap();
        let sales = insert_department(conn, acme.id, "Sales").unwrap();
        let other = insert_company(conn, "Other", None, Some(otto.id)).unwrap();
        let ops = insert_department(conn, other.id, "Ops").unwrap();

        for user in [&otto, &adam, &alice] {
            assign_user(conn, user.id, sales.id).unwrap();
        }

        Directory {
            pool,
            acme: acme.id,
            sales: sales.id,
            other: other.id,
            ops: ops.id,
        }
    }

    fn session(&self, name: &str) -> Session {
        DirectoryLogic::open_session(&self.pool.conn, Some(name)).unwrap()
    }
}

fn denied<T: std::fmt::Debug>(result: Result<T, AppError>) -> bool {
    matches!(result, Err(AppError::PermissionDenied(_)))
}

#[test]
fn test_admin_cannot_change_activation() {
    let d = Directory::new();
    let adam = d.session("adam");

    assert!(denied(DirectoryLogic::set_active(&d.pool.conn, &adam, "olivia", false)));
    assert!(denied(DirectoryLogic::set_active(&d.pool.conn, &adam, "root", false)));
    assert!(denied(DirectoryLogic::set_active(&d.pool.conn, &adam, "alice", false)));

    // everybody can still log in
    for name in ["root", "olivia", "alice"] {
        assert!(DirectoryLogic::open_session(&d.pool.conn, Some(name)).is_ok());
    }
}

#[test]
fn test_admin_cannot_pull_higher_roles_into_department() {
    let d = Directory::new();
    let adam = d.session("adam");

    assert!(denied(DirectoryLogic::assign(&d.pool.conn, &adam, "root", d.sales)));
    assert!(tenancy_of_user(&d.pool.conn, d.session("root").user_id).unwrap().is_none());

    // a lower role without any department can be placed
    assert!(DirectoryLogic::assign(&d.pool.conn, &adam, "bob", d.sales).unwrap());
}

#[test]
fn test_nobody_manages_equal_or_higher_roles() {
    let d = Directory::new();
    let conn = &d.pool.conn;
    let olivia = d.session("olivia");
    let adam = d.session("adam");

    let otto = rtimeclock::db::directory::get_user_by_name(conn, "otto").unwrap();
    let adam_row = rtimeclock::db::directory::get_user_by_name(conn, "adam").unwrap();
    let olivia_row = rtimeclock::db::directory::get_user_by_name(conn, "olivia").unwrap();

    assert!(!DirectoryLogic::can_manage(conn, &olivia, &otto).unwrap());
    assert!(DirectoryLogic::can_manage(conn, &olivia, &adam_row).unwrap());
    assert!(!DirectoryLogic::can_manage(conn, &adam, &olivia_row).unwrap());
    assert!(!DirectoryLogic::can_manage(conn, &adam, &adam_row).unwrap());

    assert!(denied(DirectoryLogic::set_active(conn, &olivia, "otto", false)));
    assert!(DirectoryLogic::set_active(conn, &olivia, "alice", false).is_ok());
    assert!(DirectoryLogic::set_active(conn, &d.session("root"), "olivia", false).is_ok());
}

#[test]
fn test_assigning_a_placed_user_needs_management_rights() {
    let d = Directory::new();
    let otto = d.session("otto");

    // alice already works in Sales, which otto does not own
    assert!(denied(DirectoryLogic::assign(&d.pool.conn, &otto, "alice", d.ops)));
    assert!(DirectoryLogic::assign(&d.pool.conn, &otto, "bob", d.ops).unwrap());
}

#[test]
fn test_unassign() {
    let d = Directory::new();
    let conn = &d.pool.conn;
    let olivia = d.session("olivia");
    let alice_id = d.session("alice").user_id;

    assert!(denied(DirectoryLogic::unassign(conn, &d.session("adam"), "otto", d.sales)));

    assert!(DirectoryLogic::unassign(conn, &olivia, "alice", d.sales).unwrap());
    assert!(tenancy_of_user(conn, alice_id).unwrap().is_none());
    // alice left Acme, so only a Superadmin still manages her
    assert!(denied(DirectoryLogic::unassign(conn, &olivia, "alice", d.sales)));
    assert!(!DirectoryLogic::unassign(conn, &d.session("root"), "alice", d.sales).unwrap());
}

#[test]
fn test_update_company() {
    let d = Directory::new();
    let conn = &d.pool.conn;

    assert!(denied(DirectoryLogic::update_company(
        conn,
        &d.session("otto"),
        d.acme,
        Some("Mine"),
        None
    )));
    assert!(matches!(
        DirectoryLogic::update_company(conn, &d.session("olivia"), d.acme, Some("  "), None),
        Err(AppError::Other(_))
    ));

    let c = DirectoryLogic::update_company(conn, &d.session("olivia"), d.acme, Some(" Acme Ltd "), None)
        .unwrap();
    assert_eq!(c.name, "Acme Ltd");
    assert_eq!(c.industry.as_deref(), Some("Retail"));

    let c = DirectoryLogic::update_company(conn, &d.session("root"), d.acme, None, Some("Food"))
        .unwrap();
    assert_eq!(c.name, "Acme Ltd");
    assert_eq!(c.industry.as_deref(), Some("Food"));
}

#[test]
fn test_delete_company_requires_superadmin_and_no_active_users() {
    let mut d = Directory::new();
    let root = d.session("root");
    let alice = d.session("alice");

    let tenancy = alice.tenancy().unwrap().clone();
    let ev = NewClockEvent::new(alice.user_id, &tenancy, ClockAction::ClockIn, None);
    append_event_checked(&mut d.pool.conn, &ev, at("09:00"), None).unwrap();

    let conn = &d.pool.conn;
    assert!(denied(DirectoryLogic::delete_company(conn, &d.session("olivia"), d.acme)));
    assert!(matches!(
        DirectoryLogic::delete_company(conn, &root, d.acme),
        Err(AppError::InUse(_))
    ));

    for name in ["otto", "adam", "alice"] {
        DirectoryLogic::set_active(conn, &root, name, false).unwrap();
    }
    DirectoryLogic::delete_company(conn, &root, d.acme).unwrap();

    assert!(find_company(conn, d.acme).unwrap().is_none());
    assert!(list_departments(conn, Some(d.acme)).unwrap().is_empty());
    assert!(load_events_by_user_date(conn, alice.user_id, &day()).unwrap().is_empty());
    assert!(find_company(conn, d.other).unwrap().is_some());
    assert!(matches!(
        DirectoryLogic::delete_company(conn, &root, d.acme),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn test_rename_and_delete_department() {
    let d = Directory::new();
    let conn = &d.pool.conn;
    let olivia = d.session("olivia");

    assert!(denied(DirectoryLogic::rename_department(conn, &d.session("otto"), d.sales, "X")));
    assert!(denied(DirectoryLogic::rename_department(conn, &d.session("adam"), d.sales, "X")));
    assert!(DirectoryLogic::rename_department(conn, &olivia, d.sales, " ").is_err());

    let dept = DirectoryLogic::rename_department(conn, &olivia, d.sales, "Field Sales").unwrap();
    assert_eq!(dept.name, "Field Sales");

    let alice_id = d.session("alice").user_id;
    DirectoryLogic::delete_department(conn, &olivia, d.sales).unwrap();
    assert!(tenancy_of_user(conn, alice_id).unwrap().is_none());
    assert!(matches!(
        DirectoryLogic::delete_department(conn, &olivia, d.sales),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn test_members() {
    let d = Directory::new();
    let conn = &d.pool.conn;

    let names = |users: Vec<rtimeclock::models::directory::User>| {
        users.into_iter().map(|u| u.name).collect::<Vec<_>>()
    };

    let sales = DirectoryLogic::department_members(conn, &d.session("olivia"), d.sales).unwrap();
    assert_eq!(names(sales), vec!["adam", "alice", "otto"]);

    let acme = DirectoryLogic::company_members(conn, &d.session("alice"), d.acme).unwrap();
    assert_eq!(names(acme), vec!["adam", "alice", "otto"]);

    assert!(matches!(
        DirectoryLogic::department_members(conn, &d.session("bob"), d.sales),
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        DirectoryLogic::company_members(conn, &d.session("alice"), d.other),
        Err(AppError::NotFound(_))
    ));
}
