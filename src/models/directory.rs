//! Directory rows: companies, departments and users.

use super::role::Role;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub industry: Option<String>,
    pub owner_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Department {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub role: Role,
    pub active: bool,
    pub created_at: String,
}
