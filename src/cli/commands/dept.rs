use crate::cli::commands::{open_pool, open_session};
use crate::cli::commands::user::users_table;
use crate::cli::parser::DeptCommand;
use crate::config::Config;
use crate::core::directory::DirectoryLogic;
use crate::db::log::ttlog_soft;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;

/// Handle the `dept` subcommands
pub fn handle(action: &DeptCommand, cfg: &Config) -> AppResult<()> {
    let pool = open_pool(cfg)?;
    let session = open_session(&pool, cfg)?;

    match action {
        DeptCommand::Add { name, company } => {
            let dept = DirectoryLogic::add_department(&pool.conn, &session, *company, name)?;

            ttlog_soft(
                &pool.conn,
                "dept_add",
                &dept.name,
                &format!(
                    "Created department {} (id {}) in company {}",
                    dept.name, dept.id, dept.company_id
                ),
            );
            success(format!(
                "Department '{}' created in company {} (id {}).",
                dept.name, dept.company_id, dept.id
            ));
        }

        DeptCommand::List { company } => {
            let depts = DirectoryLogic::accessible_departments(&pool.conn, &session, *company)?;
            if depts.is_empty() {
                info("No departments found.");
                return Ok(());
            }

            let mut table = Table::new(&["ID", "COMPANY", "NAME"]);
            for d in &depts {
                table.add_row(vec![d.id.to_string(), d.company_id.to_string(), d.name.clone()]);
            }
            print!("{}", table.render());
        }

        DeptCommand::Edit { id, name } => {
            let dept = DirectoryLogic::rename_department(&pool.conn, &session, *id, name)?;

            ttlog_soft(
                &pool.conn,
                "dept_edit",
                &dept.name,
                &format!("Renamed department {} to {}", dept.id, dept.name),
            );
            success(format!("Department {} renamed to '{}'.", dept.id, dept.name));
        }

        DeptCommand::Delete { id } => {
            let dept = DirectoryLogic::delete_department(&pool.conn, &session, *id)?;

            ttlog_soft(
                &pool.conn,
                "dept_delete",
                &dept.name,
                &format!(
                    "Deleted department {} (id {}) of company {}",
                    dept.name, dept.id, dept.company_id
                ),
            );
            success(format!("Department '{}' deleted.", dept.name));
        }

        DeptCommand::Members { id } => {
            let users = DirectoryLogic::department_members(&pool.conn, &session, *id)?;
            if users.is_empty() {
                info(format!("Department {} has no users.", id));
                return Ok(());
            }
            print!("{}", users_table(&users).render());
        }
    }

    Ok(())
}
