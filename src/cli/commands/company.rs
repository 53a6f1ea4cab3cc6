use crate::cli::commands::{open_pool, open_session};
use crate::cli::commands::user::users_table;
use crate::cli::parser::CompanyCommand;
use crate::config::Config;
use crate::core::directory::DirectoryLogic;
use crate::db::log::ttlog_soft;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;

/// Handle the `company` subcommands
pub fn handle(action: &CompanyCommand, cfg: &Config) -> AppResult<()> {
    let pool = open_pool(cfg)?;
    let session = open_session(&pool, cfg)?;

    match action {
        CompanyCommand::Add {
            name,
            industry,
            owner,
        } => {
            let company = DirectoryLogic::add_company(
                &pool.conn,
                &session,
                name,
                industry.as_deref(),
                owner.as_deref(),
            )?;

            ttlog_soft(
                &pool.conn,
                "company_add",
                &company.name,
                &format!("Created company {} (id {})", company.name, company.id),
            );
            success(format!(
                "Company '{}' created (id {}).",
                company.name, company.id
            ));
        }

        CompanyCommand::List => {
            let companies = DirectoryLogic::accessible_companies(&pool.conn, &session)?;
            if companies.is_empty() {
                info("No companies found.");
                return Ok(());
            }

            let mut table = Table::new(&["ID", "NAME", "INDUSTRY", "OWNER"]);
            for c in &companies {
                table.add_row(vec![
                    c.id.to_string(),
                    c.name.clone(),
                    c.industry.clone().unwrap_or_else(|| "-".into()),
                    c.owner_id.map(|o| o.to_string()).unwrap_or_else(|| "-".into()),
                ]);
            }
            print!("{}", table.render());
        }

        CompanyCommand::Edit { id, name, industry } => {
            if name.is_none() && industry.is_none() {
                info("Nothing to do: use --name or --industry.");
                return Ok(());
            }
            let company = DirectoryLogic::update_company(
                &pool.conn,
                &session,
                *id,
                name.as_deref(),
                industry.as_deref(),
            )?;

            ttlog_soft(
                &pool.conn,
                "company_edit",
                &company.name,
                &format!("Updated company {} (id {})", company.name, company.id),
            );
            success(format!("Company {} updated: '{}'.", company.id, company.name));
        }

        CompanyCommand::Delete { id } => {
            let company = DirectoryLogic::delete_company(&pool.conn, &session, *id)?;

            ttlog_soft(
                &pool.conn,
                "company_delete",
                &company.name,
                &format!("Deleted company {} (id {})", company.name, company.id),
            );
            success(format!("Company '{}' deleted.", company.name));
        }

        CompanyCommand::Members { id } => {
            let users = DirectoryLogic::company_members(&pool.conn, &session, *id)?;
            if users.is_empty() {
                info(format!("Company {} has no users.", id));
                return Ok(());
            }
            print!("{}", users_table(&users).render());
        }
    }

    Ok(())
}
