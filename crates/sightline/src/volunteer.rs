// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sightline volunteer` administration commands.
//!
//! Stand-in for the onboarding flow: records are created here with their
//! consent flag and languages, and availability can be flipped by hand.

use clap::Subcommand;

use sightline_config::SightlineConfig;
use sightline_core::{SightlineError, UserId, VolunteerDirectory, VolunteerRecord};
use sightline_storage::SqliteVolunteerDirectory;

#[derive(Subcommand, Debug)]
pub enum VolunteerCommand {
    /// Create or replace a volunteer record.
    Add {
        /// Volunteer user id.
        id: String,
        /// Record that the volunteer consented to be matched.
        #[arg(long)]
        consent: bool,
        /// Mark the volunteer available right away.
        #[arg(long)]
        available: bool,
        /// Spoken language (repeatable).
        #[arg(long = "language")]
        languages: Vec<String>,
    },
    /// List every volunteer record.
    List,
    /// Set a volunteer's availability flag.
    SetAvailable {
        id: String,
        #[arg(action = clap::ArgAction::Set)]
        available: bool,
    },
}

pub async fn run(
    config: &SightlineConfig,
    command: VolunteerCommand,
) -> Result<(), SightlineError> {
    let directory = SqliteVolunteerDirectory::new(config.storage.clone());
    directory.initialize().await?;
    let result = execute(&directory, command).await;
    directory.close().await?;
    result
}

async fn execute(
    directory: &dyn VolunteerDirectory,
    command: VolunteerCommand,
) -> Result<(), SightlineError> {
    match command {
        VolunteerCommand::Add {
            id,
            consent,
            available,
            languages,
        } => {
            let record = VolunteerRecord {
                user_id: UserId::parse(&id)?,
                is_available: available,
                consent_given: consent,
                languages,
            };
            directory.upsert(&record).await?;
            println!("saved {}", format_record(&record));
        }
        VolunteerCommand::List => {
            let records = directory.list().await?;
            if records.is_empty() {
                println!("no volunteers");
            }
            for record in &records {
                println!("{}", format_record(record));
            }
        }
        VolunteerCommand::SetAvailable { id, available } => {
            let user_id = UserId::parse(&id)?;
            if !directory.set_available(&user_id, available).await? {
                return Err(SightlineError::NotFound(format!(
                    "no volunteer record for {user_id}"
                )));
            }
            println!("{user_id}: available={available}");
        }
    }
    Ok(())
}

fn format_record(record: &VolunteerRecord) -> String {
    format!(
        "{} available={} consent={} languages=[{}]",
        record.user_id,
        record.is_available,
        record.consent_given,
        record.languages.join(",")
    )
}
