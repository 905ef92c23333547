//! CLI smoke probe for `contacts_core` linkage.
//!
//! Opens a throwaway in-memory store and prints deterministic facts about
//! it; it is not a user-facing contacts CLI.

use contacts_core::db::migrations::latest_version;
use contacts_core::{ContactRepository, CoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("contacts_core version={}", contacts_core::core_version());
    println!("contacts_core schema_version={}", latest_version());

    match CoreConfig::in_memory().open_repository() {
        Ok(repo) => {
            println!("contacts_core store=ok contacts={}", repo.snapshot().len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("contacts_core store=error error={err}");
            ExitCode::FAILURE
        }
    }
}
