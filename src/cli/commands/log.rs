use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::log::LogLogic;
use crate::errors::AppResult;
use crate::ui::messages::info;

use super::open_pool;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Log { print } = cmd {
        if !*print {
            info("Nothing to do: use --print to show the internal log.");
            return Ok(());
        }
        let mut pool = open_pool(cfg)?;
        LogLogic::print_log(&mut pool)?;
    }

    Ok(())
}
