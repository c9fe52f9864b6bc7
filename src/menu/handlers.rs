use crate::component::FunForge;
use crate::config::Config;
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_fun_forge(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let mut forge = FunForge::new(config.clone(), Arc::clone(shutdown_signal));

    if let Err(e) = forge.run() {
        eprintln!("{} {}", style(t!("main_menu.error_prefix")).red().bold(), e);
    }

    // 路徑歷史可能已更新
    config.settings = forge.into_config().settings;

    pause(term)?;
    Ok(())
}
