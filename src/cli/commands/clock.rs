use crate::cli::commands::{open_pool, open_session};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::clock::ClockLogic;
use crate::db::log::ttlog_soft;
use crate::errors::AppResult;
use crate::models::action::ClockAction;
use crate::ui::messages::success;
use crate::utils::colors::{RESET, color_for_state};

/// Handle the `clock` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Clock { action, notes } = cmd {
        let action: ClockAction = action.parse()?;

        let mut pool = open_pool(cfg)?;
        let session = open_session(&pool, cfg)?;

        let recorded = ClockLogic::record(&mut pool, &session, action, notes.as_deref())?;
        let ev = &recorded.event;

        ttlog_soft(
            &pool.conn,
            "clock",
            &session.name,
            &format!("{} at {} (event {})", ev.action, ev.timestamp_str(), ev.id),
        );

        let state = recorded.status.state;
        success(format!(
            "{} at {} for {}, now {}{}{}.",
            action.label(),
            ev.time_str(),
            session.name,
            color_for_state(state),
            state.describe(),
            RESET
        ));
    }

    Ok(())
}
