#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rtimeclock::db::directory::{assign_user, insert_company, insert_department, insert_user};
use rtimeclock::db::pool::DbPool;
use rtimeclock::db::queries::{append_event_checked, load_events_by_user_date};
use rtimeclock::db::store::EventStore;
use rtimeclock::errors::AppResult;
use rtimeclock::models::action::ClockAction;
use rtimeclock::models::event::{ClockEvent, NewClockEvent};
use rtimeclock::models::role::Role;
use rtimeclock::models::session::{Session, Tenancy};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn rtc() -> Command {
    cargo_bin_cmd!("rtimeclock")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rtimeclock.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rtimeclock_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Initialize the DB and build a small directory through the CLI:
///
/// - `root`  Superadmin
/// - `olivia` Owner of company 1 "Acme"
/// - department 1 "Sales" in Acme
/// - `alice` and `adam` (Admin) assigned to Sales, `bob` without department
pub fn init_directory(db_path: &str) {
    rtc()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    let steps: &[&[&str]] = &[
        &["user", "add", "root", "--role", "superadmin"],
        &["-u", "root", "user", "add", "olivia", "--role", "owner"],
        &["-u", "root", "company", "add", "Acme", "--owner", "olivia"],
        &["-u", "olivia", "dept", "add", "Sales", "--company", "1"],
        &["-u", "olivia", "user", "add", "alice", "--role", "user"],
        &["-u", "olivia", "user", "add", "adam", "--role", "admin"],
        &["-u", "olivia", "user", "add", "bob", "--role", "user"],
        &["-u", "olivia", "user", "assign", "alice", "--dept", "1"],
        &["-u", "olivia", "user", "assign", "adam", "--dept", "1"],
    ];

    for step in steps {
        rtc()
            .args(["--db", db_path])
            .args(*step)
            .assert()
            .success();
    }
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
}

pub fn at(hms: &str) -> NaiveDateTime {
    let t = NaiveTime::parse_from_str(hms, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(hms, "%H:%M"))
        .expect("valid time");
    day().and_time(t)
}

/// An in-memory event, as the store would return it.
pub fn ev(id: i64, action: ClockAction, hms: &str) -> ClockEvent {
    ClockEvent {
        id,
        user_id: 1,
        company_id: 1,
        department_ids: vec![1],
        action,
        timestamp: at(hms),
        date: day(),
        notes: None,
        source: "cli".to_string(),
    }
}

/// Build a history from `(action, "HH:MM")` pairs, ids ascending.
pub fn history(steps: &[(ClockAction, &str)]) -> Vec<ClockEvent> {
    steps
        .iter()
        .enumerate()
        .map(|(i, (a, t))| ev(i as i64 + 1, *a, t))
        .collect()
}

/// In-memory store with one company, one department and one user of
/// `role` assigned to it. Returns the store and that user's session.
pub fn memory_store(role: Role) -> (DbPool, Session) {
    let pool = DbPool::open(":memory:").expect("open in-memory db");
    let user = insert_user(&pool.conn, "alice", role).expect("insert user");
    let company = insert_company(&pool.conn, "Acme", None, None).expect("insert company");
    let dept = insert_department(&pool.conn, company.id, "Sales").expect("insert dept");
    assign_user(&pool.conn, user.id, dept.id).expect("assign");

    let session = Session {
        user_id: user.id,
        name: user.name,
        role,
        tenancy: Some(Tenancy {
            company_id: company.id,
            department_ids: vec![dept.id],
        }),
    };
    (pool, session)
}

/// Event store whose clock is set by the test.
pub struct FixedClockStore {
    pub pool: DbPool,
    pub now: NaiveDateTime,
}

impl EventStore for FixedClockStore {
    fn load_day(&mut self, user_id: i64, date: NaiveDate) -> AppResult<Vec<ClockEvent>> {
        load_events_by_user_date(&self.pool.conn, user_id, &date)
    }

    fn append(
        &mut self,
        event: &NewClockEvent,
        expected_last: Option<i64>,
    ) -> AppResult<ClockEvent> {
        append_event_checked(&mut self.pool.conn, event, self.now, expected_last)
    }

    fn today(&self) -> NaiveDate {
        self.now.date()
    }
}
