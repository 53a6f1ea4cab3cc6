use crate::cli::commands::{open_pool, open_session};
use crate::cli::parser::UserCommand;
use crate::config::Config;
use crate::core::directory::DirectoryLogic;
use crate::db::directory::count_users;
use crate::db::log::ttlog_soft;
use crate::errors::AppResult;
use crate::models::directory::User;
use crate::models::role::Role;
use crate::ui::messages::{info, success};
use crate::utils::colors::{GREY, RESET};
use crate::utils::table::Table;

/// Users as a table, also used by the `members` listings.
pub(crate) fn users_table(users: &[User]) -> Table {
    let mut table = Table::new(&["ID", "NAME", "ROLE", "ACTIVE", "CREATED"]);
    for u in users {
        table.add_row(vec![
            u.id.to_string(),
            u.name.clone(),
            u.role.to_string(),
            if u.active { "yes" } else { "no" }.to_string(),
            u.created_at.clone(),
        ]);
    }
    table
}

/// Handle the `user` subcommands
pub fn handle(action: &UserCommand, cfg: &Config) -> AppResult<()> {
    let pool = open_pool(cfg)?;

    match action {
        UserCommand::Add { name, role } => {
            let role: Role = role.parse()?;

            // the very first user bootstraps the directory without a session
            let session = if count_users(&pool.conn)? == 0 || cfg.user.is_none() {
                None
            } else {
                Some(open_session(&pool, cfg)?)
            };

            let user = DirectoryLogic::add_user(&pool.conn, session.as_ref(), name, role)?;

            ttlog_soft(
                &pool.conn,
                "user_add",
                &user.name,
                &format!("Created user {} (id {}) with role {}", user.name, user.id, user.role),
            );
            success(format!(
                "User '{}' created with role {} (id {}).",
                user.name, user.role, user.id
            ));
        }

        UserCommand::List => {
            let session = open_session(&pool, cfg)?;
            let users = DirectoryLogic::visible_users(&pool.conn, &session)?;

            if users.is_empty() {
                info("No users found.");
                return Ok(());
            }

            print!("{}", users_table(&users).render());
        }

        UserCommand::Assign { name, dept } => {
            let session = open_session(&pool, cfg)?;
            if DirectoryLogic::assign(&pool.conn, &session, name, *dept)? {
                ttlog_soft(
                    &pool.conn,
                    "assign",
                    name,
                    &format!("Assigned {} to department {}", name, dept),
                );
                success(format!("User '{}' assigned to department {}.", name, dept));
            } else {
                info(format!(
                    "{GREY}User '{}' is already in department {}.{RESET}",
                    name, dept
                ));
            }
        }

        UserCommand::Unassign { name, dept } => {
            let session = open_session(&pool, cfg)?;
            if DirectoryLogic::unassign(&pool.conn, &session, name, *dept)? {
                ttlog_soft(
                    &pool.conn,
                    "unassign",
                    name,
                    &format!("Removed {} from department {}", name, dept),
                );
                success(format!("User '{}' removed from department {}.", name, dept));
            } else {
                info(format!(
                    "{GREY}User '{}' is not in department {}.{RESET}",
                    name, dept
                ));
            }
        }

        UserCommand::Activate { name } | UserCommand::Deactivate { name } => {
            let active = matches!(action, UserCommand::Activate { .. });
            let session = open_session(&pool, cfg)?;
            let user = DirectoryLogic::set_active(&pool.conn, &session, name, active)?;

            let (op, verb) = if active {
                ("activate", "activated")
            } else {
                ("deactivate", "deactivated")
            };
            ttlog_soft(
                &pool.conn,
                op,
                &user.name,
                &format!("User {} {} by {}", user.name, verb, session.name),
            );
            success(format!("User '{}' {}.", user.name, verb));
        }
    }

    Ok(())
}
