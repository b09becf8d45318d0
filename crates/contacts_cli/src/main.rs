//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `contacts_core` linkage and, given a config path, that the
//!   configured store opens and migrates.
//! - Keep output deterministic for quick local sanity checks.

use contacts_core::db::open_db_from_config;
use contacts_core::{
    ContactFilter, ContactRepository, CoreConfig, SqliteContactRepository,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("contacts_core ping={}", contacts_core::ping());
    println!("contacts_core version={}", contacts_core::core_version());

    let Some(config_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match count_stored_contacts(&config_path) {
        Ok(active) => {
            println!("contacts_core active_contacts={active}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("contacts_core store check failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn count_stored_contacts(config_path: &str) -> Result<u64, Box<dyn std::error::Error>> {
    let config = CoreConfig::load(config_path)?;
    config.init_logging()?;
    let conn = open_db_from_config(&config)?;
    let repo = SqliteContactRepository::new(&conn);
    Ok(repo.count_contacts(&ContactFilter::default())?)
}
