use crate::domain::model::{LeaveStatus, RecordType};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "timetable-admin")]
#[command(about = "Import timetable spreadsheets and send leave notifications")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "timetable.toml")]
    pub config: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate an uploaded CSV/TSV file and import it when every row is valid
    Import {
        /// lecture, lecture_template, invigilation or faculty_leave_master
        #[arg(long = "type")]
        record_type: RecordType,

        #[arg(short, long)]
        file: String,

        /// Validate only, do not write to the database
        #[arg(long)]
        dry_run: bool,

        /// Write the validation report as JSON to this path
        #[arg(long)]
        report: Option<String>,
    },

    /// Notify a faculty member about a leave application status
    NotifyLeave {
        #[arg(long)]
        email: String,

        #[arg(long)]
        leave_type: String,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// pending, approved or rejected
        #[arg(long)]
        status: LeaveStatus,

        #[arg(long)]
        remarks: Option<String>,
    },

    /// Send an arbitrary push notification to a faculty member's devices
    Push {
        #[arg(long)]
        email: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        body: String,

        /// Extra data entries as key=value (repeatable)
        #[arg(long = "data", value_parser = parse_key_value)]
        data: Vec<(String, String)>,
    },

    /// Print the realtime-database key for an email
    EmailKey {
        #[arg(long)]
        email: String,
    },

    /// Decode a realtime-database key back to its email
    KeyEmail {
        #[arg(long)]
        key: String,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
