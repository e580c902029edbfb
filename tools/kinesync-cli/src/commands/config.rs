//! Show or save the effective configuration.

use kinesync_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, write: bool) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    if write {
        config.save()?;
        println!("Saved to {}", config_file_path().display());
    }
    Ok(())
}
