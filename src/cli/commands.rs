use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ticketlog")]
#[command(version, about = "A local support ticket log with reminders and autosave")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding entries.json and settings.json
    /// (defaults to $TICKETLOG_DIR, then the platform data directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log a new ticket
    Add(AddArgs),

    /// List tickets, newest first unless a sort column is given
    List {
        /// Column to sort by (done, timestamp, caller, title, description,
        /// additional_notes, assignment_group, state)
        #[arg(long, short = 's', value_name = "COLUMN")]
        sort: Option<String>,

        /// Reverse the order
        #[arg(long, short = 'r')]
        reverse: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show tickets containing a term in any field (case-insensitive)
    Search {
        term: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change fields of a ticket
    Edit {
        /// Row number from `list` or the exact ticket timestamp
        selector: String,

        #[command(flatten)]
        fields: FieldArgs,

        /// Mark as done (true) or pending (false)
        #[arg(long, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        done: Option<bool>,
    },

    /// Toggle the done flag of a ticket
    Done {
        /// Row number from `list` or the exact ticket timestamp
        selector: String,
    },

    /// Delete one or more tickets
    Delete {
        /// Row numbers from `list` or exact ticket timestamps
        #[arg(required = true)]
        selectors: Vec<String>,
    },

    /// Export all tickets to CSV
    Export {
        /// Destination file (defaults to Ticket_Export_<time>.csv in the
        /// current directory)
        path: Option<PathBuf>,
    },

    /// Show or change settings
    Settings {
        /// Turn reminders on or off
        #[arg(long, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        reminders: Option<bool>,

        /// Reminder interval amount
        #[arg(long, value_name = "AMOUNT")]
        interval: Option<i64>,

        /// Unit for --interval (minutes, hours)
        #[arg(long, default_value = "minutes")]
        unit: String,

        /// View mode the shell starts in (full, compact)
        #[arg(long, value_name = "MODE")]
        view: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive session with reminders and autosave
    Shell,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Ticket title
    pub title: String,

    /// Person who reported the issue
    #[arg(long, short = 'c')]
    pub caller: Option<String>,

    /// Longer description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Additional notes
    #[arg(long, short = 'n')]
    pub notes: Option<String>,

    /// Assignment group
    #[arg(long, short = 'g')]
    pub group: Option<String>,

    /// State (new, in_progress, on_hold, resolved, cancelled)
    #[arg(long, default_value = "new")]
    pub state: String,
}

#[derive(Args, Debug, Default)]
pub struct FieldArgs {
    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New caller
    #[arg(long)]
    pub caller: Option<String>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// New additional notes
    #[arg(long)]
    pub notes: Option<String>,

    /// New assignment group
    #[arg(long)]
    pub group: Option<String>,

    /// New state
    #[arg(long)]
    pub state: Option<String>,
}
