//! Queries over the directory tables (users, companies, departments).

use crate::errors::{AppError, AppResult};
use crate::models::directory::{Company, Department, User};
use crate::models::role::Role;
use crate::models::session::Tenancy;
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_user(row: &Row) -> rusqlite::Result<User> {
    let role_str: String = row.get("role")?;
    let role = Role::from_db_str(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidRole(role_str.clone())),
        )
    })?;

    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        role,
        active: row.get::<_, i32>("active")? == 1,
        created_at: row.get("created_at")?,
    })
}

fn map_company(row: &Row) -> rusqlite::Result<Company> {
    Ok(Company {
        id: row.get("id")?,
        name: row.get("name")?,
        industry: row.get("industry")?,
        owner_id: row.get("owner_id")?,
    })
}

fn map_department(row: &Row) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get("id")?,
        company_id: row.get("company_id")?,
        name: row.get("name")?,
    })
}

fn collect<T>(rows: impl Iterator<Item = rusqlite::Result<T>>) -> AppResult<Vec<T>> {
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------
// Users
// ---------------------------

pub fn count_users(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
}

pub fn find_user_by_name(conn: &Connection, name: &str) -> AppResult<Option<User>> {
    Ok(conn
        .query_row("SELECT * FROM users WHERE name = ?1", [name], map_user)
        .optional()?)
}

pub fn get_user_by_name(conn: &Connection, name: &str) -> AppResult<User> {
    find_user_by_name(conn, name)?.ok_or_else(|| AppError::NotFound(format!("user '{}'", name)))
}

pub fn insert_user(conn: &Connection, name: &str, role: Role) -> AppResult<User> {
    if find_user_by_name(conn, name)?.is_some() {
        return Err(AppError::AlreadyExists(format!("user '{}'", name)));
    }

    let created_at = Local::now().to_rfc3339();
    conn.execute(
        "INSERT INTO users (name, role, active, created_at) VALUES (?1, ?2, 1, ?3)",
        params![name, role.to_db_str(), created_at],
    )?;

    Ok(User {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        role,
        active: true,
        created_at,
    })
}

pub fn set_user_active(conn: &Connection, user_id: i64, active: bool) -> AppResult<()> {
    conn.execute(
        "UPDATE users SET active = ?1 WHERE id = ?2",
        params![if active { 1 } else { 0 }, user_id],
    )?;
    Ok(())
}

pub fn list_users(conn: &Connection) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare("SELECT * FROM users ORDER BY name ASC")?;
    let rows = stmt.query_map([], map_user)?;
    collect(rows)
}

// ---------------------------
// Companies
// ---------------------------

pub fn insert_company(
    conn: &Connection,
    name: &str,
    industry: Option<&str>,
    owner_id: Option<i64>,
) -> AppResult<Company> {
    conn.execute(
        "INSERT INTO companies (name, industry, owner_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![name, industry, owner_id, Local::now().to_rfc3339()],
    )?;

    Ok(Company {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        industry: industry.map(str::to_string),
        owner_id,
    })
}

pub fn find_company(conn: &Connection, id: i64) -> AppResult<Option<Company>> {
    Ok(conn
        .query_row("SELECT * FROM companies WHERE id = ?1", [id], map_company)
        .optional()?)
}

pub fn list_companies(conn: &Connection) -> AppResult<Vec<Company>> {
    let mut stmt = conn.prepare("SELECT * FROM companies ORDER BY id ASC")?;
    let rows = stmt.query_map([], map_company)?;
    collect(rows)
}

/// Update name and/or industry; `None` leaves the column as it is.
pub fn update_company(
    conn: &Connection,
    id: i64,
    name: Option<&str>,
    industry: Option<&str>,
) -> AppResult<()> {
    conn.execute(
        "UPDATE companies
         SET name = COALESCE(?1, name), industry = COALESCE(?2, industry)
         WHERE id = ?3",
        params![name, industry, id],
    )?;
    Ok(())
}

/// Delete a company with its departments, assignments and clock events.
pub fn delete_company(conn: &Connection, id: i64) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM clock_events WHERE company_id = ?1", [id])?;
    tx.execute(
        "DELETE FROM user_departments
         WHERE department_id IN (SELECT id FROM departments WHERE company_id = ?1)",
        [id],
    )?;
    tx.execute("DELETE FROM departments WHERE company_id = ?1", [id])?;
    tx.execute("DELETE FROM companies WHERE id = ?1", [id])?;
    tx.commit()?;
    Ok(())
}

pub fn companies_owned_by(conn: &Connection, owner_id: i64) -> AppResult<Vec<Company>> {
    let mut stmt = conn.prepare("SELECT * FROM companies WHERE owner_id = ?1 ORDER BY id ASC")?;
    let rows = stmt.query_map([owner_id], map_company)?;
    collect(rows)
}

/// Companies reached through the user's department assignments, deduplicated.
pub fn companies_of_user(conn: &Connection, user_id: i64) -> AppResult<Vec<Company>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT c.* FROM companies c
         JOIN departments d ON d.company_id = c.id
         JOIN user_departments ud ON ud.department_id = d.id
         WHERE ud.user_id = ?1
         ORDER BY c.id ASC",
    )?;
    let rows = stmt.query_map([user_id], map_company)?;
    collect(rows)
}

// ---------------------------
// Departments
// ---------------------------

pub fn insert_department(conn: &Connection, company_id: i64, name: &str) -> AppResult<Department> {
    conn.execute(
        "INSERT INTO departments (company_id, name, created_at) VALUES (?1, ?2, ?3)",
        params![company_id, name, Local::now().to_rfc3339()],
    )?;

    Ok(Department {
        id: conn.last_insert_rowid(),
        company_id,
        name: name.to_string(),
    })
}

pub fn find_department(conn: &Connection, id: i64) -> AppResult<Option<Department>> {
    Ok(conn
        .query_row("SELECT * FROM departments WHERE id = ?1", [id], map_department)
        .optional()?)
}

pub fn rename_department(conn: &Connection, id: i64, name: &str) -> AppResult<()> {
    conn.execute(
        "UPDATE departments SET name = ?1 WHERE id = ?2",
        params![name, id],
    )?;
    Ok(())
}

/// Delete a department and its assignments. Past clock events keep their tags.
pub fn delete_department(conn: &Connection, id: i64) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM user_departments WHERE department_id = ?1", [id])?;
    tx.execute("DELETE FROM departments WHERE id = ?1", [id])?;
    tx.commit()?;
    Ok(())
}

pub fn list_departments(conn: &Connection, company_id: Option<i64>) -> AppResult<Vec<Department>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM departments
         WHERE ?1 IS NULL OR company_id = ?1
         ORDER BY company_id ASC, id ASC",
    )?;
    let rows = stmt.query_map([company_id], map_department)?;
    collect(rows)
}

// ---------------------------
// Assignments
// ---------------------------

pub fn assign_user(conn: &Connection, user_id: i64, department_id: i64) -> AppResult<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO user_departments (user_id, department_id, assigned_at)
         VALUES (?1, ?2, ?3)",
        params![user_id, department_id, Local::now().to_rfc3339()],
    )?;
    Ok(inserted > 0)
}

pub fn unassign_user(conn: &Connection, user_id: i64, department_id: i64) -> AppResult<bool> {
    let removed = conn.execute(
        "DELETE FROM user_departments WHERE user_id = ?1 AND department_id = ?2",
        params![user_id, department_id],
    )?;
    Ok(removed > 0)
}

pub fn users_of_department(conn: &Connection, department_id: i64) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT u.* FROM users u
         JOIN user_departments ud ON ud.user_id = u.id
         WHERE ud.department_id = ?1
         ORDER BY u.name ASC",
    )?;
    let rows = stmt.query_map([department_id], map_user)?;
    collect(rows)
}

/// Users in any department of the company, deduplicated.
pub fn users_of_company(conn: &Connection, company_id: i64) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT u.* FROM users u
         JOIN user_departments ud ON ud.user_id = u.id
         JOIN departments d ON d.id = ud.department_id
         WHERE d.company_id = ?1
         ORDER BY u.name ASC",
    )?;
    let rows = stmt.query_map([company_id], map_user)?;
    collect(rows)
}

/// Departments of a user in assignment order.
pub fn departments_of_user(conn: &Connection, user_id: i64) -> AppResult<Vec<Department>> {
    let mut stmt = conn.prepare(
        "SELECT d.* FROM departments d
         JOIN user_departments ud ON ud.department_id = d.id
         WHERE ud.user_id = ?1
         ORDER BY ud.rowid ASC",
    )?;
    let rows = stmt.query_map([user_id], map_department)?;
    collect(rows)
}

/// Tenancy of a user: all their departments, and the company of the
/// first one. `None` when the user has no department.
pub fn tenancy_of_user(conn: &Connection, user_id: i64) -> AppResult<Option<Tenancy>> {
    let depts = departments_of_user(conn, user_id)?;
    let Some(first) = depts.first() else {
        return Ok(None);
    };

    Ok(Some(Tenancy {
        company_id: first.company_id,
        department_ids: depts.iter().map(|d| d.id).collect(),
    }))
}

/// Whether `user_id` is assigned to a department of a company owned by `owner_id`.
pub fn user_in_owned_company(conn: &Connection, owner_id: i64, user_id: i64) -> AppResult<bool> {
    let mut stmt = conn.prepare(
        "SELECT 1 FROM user_departments ud
         JOIN departments d ON d.id = ud.department_id
         JOIN companies c ON c.id = d.company_id
         WHERE ud.user_id = ?1 AND c.owner_id = ?2
         LIMIT 1",
    )?;
    Ok(stmt.exists(params![user_id, owner_id])?)
}

/// Whether the two users share at least one department.
pub fn users_share_department(conn: &Connection, a: i64, b: i64) -> AppResult<bool> {
    let mut stmt = conn.prepare(
        "SELECT 1 FROM user_departments x
         JOIN user_departments y ON y.department_id = x.department_id
         WHERE x.user_id = ?1 AND y.user_id = ?2
         LIMIT 1",
    )?;
    Ok(stmt.exists(params![a, b])?)
}
