//! Directory management and the scoped permission rules around it.

use crate::db::directory as q;
use crate::errors::{AppError, AppResult};
use crate::models::directory::{Company, Department, User};
use crate::models::role::{Capability, Role};
use crate::models::session::Session;
use rusqlite::Connection;

pub struct DirectoryLogic;

impl DirectoryLogic {
    /// Resolve the session for `name`. Unknown and inactive users are not
    /// authenticated; a missing tenancy is not an error here.
    pub fn open_session(conn: &Connection, name: Option<&str>) -> AppResult<Session> {
        let name = name.ok_or_else(|| {
            AppError::NotAuthenticated(
                "no user given (use --user NAME or set `user` in the configuration)".into(),
            )
        })?;

        let user = q::find_user_by_name(conn, name)?
            .ok_or_else(|| AppError::NotAuthenticated(format!("unknown user '{}'", name)))?;

        if !user.active {
            return Err(AppError::NotAuthenticated(format!(
                "user '{}' is deactivated",
                name
            )));
        }

        let tenancy = q::tenancy_of_user(conn, user.id)?;

        Ok(Session {
            user_id: user.id,
            name: user.name,
            role: user.role,
            tenancy,
        })
    }

    /// Whether the session may manage `target` (view reports, (de)activate, assign).
    /// Nobody manages themselves or a user of equal or higher role.
    pub fn can_manage(conn: &Connection, session: &Session, target: &User) -> AppResult<bool> {
        if target.id == session.user_id || !session.role.outranks(target.role) {
            return Ok(false);
        }
        match session.role {
            Role::Superadmin => Ok(true),
            Role::Owner => q::user_in_owned_company(conn, session.user_id, target.id),
            Role::Admin => q::users_share_department(conn, session.user_id, target.id),
            Role::User => Ok(false),
        }
    }

    fn require_manage(conn: &Connection, session: &Session, target: &User) -> AppResult<()> {
        if Self::can_manage(conn, session, target)? {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(format!(
                "'{}' cannot manage user '{}'",
                session.name, target.name
            )))
        }
    }

    /// Create a user. Without a session this only works for the very first
    /// user of the database.
    pub fn add_user(
        conn: &Connection,
        session: Option<&Session>,
        name: &str,
        role: Role,
    ) -> AppResult<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Other("user name cannot be empty".into()));
        }

        match session {
            None => {
                if q::count_users(conn)? > 0 {
                    return Err(AppError::NotAuthenticated(
                        "only the first user can be created without --user".into(),
                    ));
                }
            }
            Some(s) => {
                s.require(Capability::ManageUsers)?;
                if !s.role.can_create(role) {
                    return Err(AppError::PermissionDenied(format!(
                        "{} '{}' cannot create a user with role {}",
                        s.role, s.name, role
                    )));
                }
            }
        }

        q::insert_user(conn, name, role)
    }

    pub fn set_active(
        conn: &Connection,
        session: &Session,
        name: &str,
        active: bool,
    ) -> AppResult<User> {
        session.require(Capability::ManageUsers)?;
        if !matches!(session.role, Role::Superadmin | Role::Owner) {
            return Err(AppError::PermissionDenied(format!(
                "{} '{}' cannot activate or deactivate users",
                session.role, session.name
            )));
        }
        let mut target = q::get_user_by_name(conn, name)?;

        if target.id == session.user_id {
            return Err(AppError::PermissionDenied(
                "you cannot change your own activation".into(),
            ));
        }
        Self::require_manage(conn, session, &target)?;

        q::set_user_active(conn, target.id, active)?;
        target.active = active;
        Ok(target)
    }

    /// Department `department_id`, if the session may move users in or out of it:
    /// Owners for their companies, Admins for their own departments.
    fn managed_department(
        conn: &Connection,
        session: &Session,
        department_id: i64,
    ) -> AppResult<Department> {
        let dept = q::find_department(conn, department_id)?
            .ok_or_else(|| AppError::NotFound(format!("department {}", department_id)))?;

        let allowed = match session.role {
            Role::Superadmin => true,
            Role::Owner => Self::owns_company(conn, session, dept.company_id)?,
            Role::Admin => q::departments_of_user(conn, session.user_id)?
                .iter()
                .any(|d| d.id == dept.id),
            Role::User => false,
        };
        if !allowed {
            return Err(AppError::PermissionDenied(format!(
                "'{}' cannot change the members of department '{}'",
                session.name, dept.name
            )));
        }
        Ok(dept)
    }

    /// Assign a user to a department. Returns false when already assigned.
    ///
    /// The target must be manageable by the session, or still without any
    /// department and of a lower role.
    pub fn assign(
        conn: &Connection,
        session: &Session,
        name: &str,
        department_id: i64,
    ) -> AppResult<bool> {
        session.require(Capability::ManageUsers)?;
        let target = q::get_user_by_name(conn, name)?;
        let dept = Self::managed_department(conn, session, department_id)?;

        let unplaced = q::departments_of_user(conn, target.id)?.is_empty()
            && session.role.outranks(target.role);
        if !unplaced {
            Self::require_manage(conn, session, &target)?;
        }

        q::assign_user(conn, target.id, dept.id)
    }

    /// Remove a user from a department. Returns false when not assigned.
    pub fn unassign(
        conn: &Connection,
        session: &Session,
        name: &str,
        department_id: i64,
    ) -> AppResult<bool> {
        session.require(Capability::ManageUsers)?;
        let target = q::get_user_by_name(conn, name)?;
        let dept = Self::managed_department(conn, session, department_id)?;
        Self::require_manage(conn, session, &target)?;

        q::unassign_user(conn, target.id, dept.id)
    }

    fn owns_company(conn: &Connection, session: &Session, company_id: i64) -> AppResult<bool> {
        Ok(q::companies_owned_by(conn, session.user_id)?
            .iter()
            .any(|c| c.id == company_id))
    }

    pub fn add_company(
        conn: &Connection,
        session: &Session,
        name: &str,
        industry: Option<&str>,
        owner: Option<&str>,
    ) -> AppResult<Company> {
        session.require(Capability::ManageCompanies)?;

        let owner_id = match (session.role, owner) {
            (Role::Owner, None) => Some(session.user_id),
            (Role::Owner, Some(_)) => {
                return Err(AppError::PermissionDenied(
                    "an Owner always owns the companies they create".into(),
                ));
            }
            (_, Some(owner_name)) => {
                let owner = q::get_user_by_name(conn, owner_name)?;
                if owner.role != Role::Owner {
                    return Err(AppError::InvalidRole(format!(
                        "'{}' is {}, a company owner must be Owner",
                        owner.name, owner.role
                    )));
                }
                Some(owner.id)
            }
            (_, None) => None,
        };

        q::insert_company(conn, name.trim(), industry, owner_id)
    }

    pub fn add_department(
        conn: &Connection,
        session: &Session,
        company_id: i64,
        name: &str,
    ) -> AppResult<Department> {
        session.require(Capability::ManageDepartments)?;

        if q::find_company(conn, company_id)?.is_none() {
            return Err(AppError::NotFound(format!("company {}", company_id)));
        }
        if session.role == Role::Owner && !Self::owns_company(conn, session, company_id)? {
            return Err(AppError::PermissionDenied(format!(
                "'{}' does not own company {}",
                session.name, company_id
            )));
        }

        q::insert_department(conn, company_id, name.trim())
    }

    /// Superadmins edit any company, Owners the ones they own.
    pub fn update_company(
        conn: &Connection,
        session: &Session,
        company_id: i64,
        name: Option<&str>,
        industry: Option<&str>,
    ) -> AppResult<Company> {
        session.require(Capability::ManageCompanies)?;
        if q::find_company(conn, company_id)?.is_none() {
            return Err(AppError::NotFound(format!("company {}", company_id)));
        }
        if session.role != Role::Superadmin && !Self::owns_company(conn, session, company_id)? {
            return Err(AppError::PermissionDenied(format!(
                "'{}' does not own company {}",
                session.name, company_id
            )));
        }

        let name = name.map(str::trim);
        if name.is_some_and(str::is_empty) {
            return Err(AppError::Other("company name cannot be empty".into()));
        }
        q::update_company(conn, company_id, name, industry.map(str::trim))?;

        q::find_company(conn, company_id)?
            .ok_or_else(|| AppError::NotFound(format!("company {}", company_id)))
    }

    /// Superadmin only, and only once every member of the company is inactive.
    /// Removes the company's departments, assignments and clock events.
    pub fn delete_company(conn: &Connection, session: &Session, company_id: i64) -> AppResult<Company> {
        if session.role != Role::Superadmin {
            return Err(AppError::PermissionDenied(
                "only a Superadmin can delete companies".into(),
            ));
        }
        let company = q::find_company(conn, company_id)?
            .ok_or_else(|| AppError::NotFound(format!("company {}", company_id)))?;

        let active = q::users_of_company(conn, company_id)?
            .into_iter()
            .filter(|u| u.active)
            .count();
        if active > 0 {
            return Err(AppError::InUse(format!(
                "company '{}' still has {} active user(s); deactivate them first",
                company.name, active
            )));
        }

        q::delete_company(conn, company_id)?;
        Ok(company)
    }

    /// Department `department_id`, if the session may edit or delete it.
    fn editable_department(
        conn: &Connection,
        session: &Session,
        department_id: i64,
    ) -> AppResult<Department> {
        session.require(Capability::ManageDepartments)?;
        let dept = q::find_department(conn, department_id)?
            .ok_or_else(|| AppError::NotFound(format!("department {}", department_id)))?;

        if session.role == Role::Owner && !Self::owns_company(conn, session, dept.company_id)? {
            return Err(AppError::PermissionDenied(format!(
                "'{}' does not own company {}",
                session.name, dept.company_id
            )));
        }
        Ok(dept)
    }

    pub fn rename_department(
        conn: &Connection,
        session: &Session,
        department_id: i64,
        name: &str,
    ) -> AppResult<Department> {
        let mut dept = Self::editable_department(conn, session, department_id)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Other("department name is required".into()));
        }

        q::rename_department(conn, dept.id, name)?;
        dept.name = name.to_string();
        Ok(dept)
    }

    /// Delete a department; its members lose that assignment.
    pub fn delete_department(
        conn: &Connection,
        session: &Session,
        department_id: i64,
    ) -> AppResult<Department> {
        let dept = Self::editable_department(conn, session, department_id)?;
        q::delete_department(conn, dept.id)?;
        Ok(dept)
    }

    /// Members of a department the session can see.
    pub fn department_members(
        conn: &Connection,
        session: &Session,
        department_id: i64,
    ) -> AppResult<Vec<User>> {
        if !Self::accessible_departments(conn, session, None)?
            .iter()
            .any(|d| d.id == department_id)
        {
            return Err(AppError::NotFound(format!("department {}", department_id)));
        }
        q::users_of_department(conn, department_id)
    }

    /// Members of any department of a company the session can see.
    pub fn company_members(
        conn: &Connection,
        session: &Session,
        company_id: i64,
    ) -> AppResult<Vec<User>> {
        if !Self::accessible_companies(conn, session)?
            .iter()
            .any(|c| c.id == company_id)
        {
            return Err(AppError::NotFound(format!("company {}", company_id)));
        }
        q::users_of_company(conn, company_id)
    }

    /// Companies the session may see.
    pub fn accessible_companies(conn: &Connection, session: &Session) -> AppResult<Vec<Company>> {
        match session.role {
            Role::Superadmin => q::list_companies(conn),
            Role::Owner => q::companies_owned_by(conn, session.user_id),
            Role::Admin | Role::User => q::companies_of_user(conn, session.user_id),
        }
    }

    /// Departments of the companies the session may see, optionally one company only.
    pub fn accessible_departments(
        conn: &Connection,
        session: &Session,
        company_id: Option<i64>,
    ) -> AppResult<Vec<Department>> {
        let companies = Self::accessible_companies(conn, session)?;
        if let Some(id) = company_id
            && !companies.iter().any(|c| c.id == id)
        {
            return Err(AppError::NotFound(format!("company {}", id)));
        }

        Ok(q::list_departments(conn, company_id)?
            .into_iter()
            .filter(|d| companies.iter().any(|c| c.id == d.company_id))
            .collect())
    }

    /// Users the session may see: the ones it manages, plus itself.
    pub fn visible_users(conn: &Connection, session: &Session) -> AppResult<Vec<User>> {
        let mut out = Vec::new();
        for user in q::list_users(conn)? {
            if user.id == session.user_id || Self::can_manage(conn, session, &user)? {
                out.push(user);
            }
        }
        Ok(out)
    }
}
