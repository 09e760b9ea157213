use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use crate::entity::{Entry, EntryFields, EntryState};
use crate::error::{Result, TicketError};
use crate::export;
use crate::presenter::Presenter;
use crate::settings::{IntervalUnit, SharedSettings, ViewMode, SETTINGS_FILE};
use crate::storage::{EntryStore, SharedStore, ENTRIES_FILE};
use crate::view::{self, SortColumn};

use super::commands::{AddArgs, FieldArgs};
use super::output::{settings_summary, TerminalPresenter};
use super::selector::Selector;
use super::shell;

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "TICKETLOG_DIR";

/// Pick the data directory: the flag, then `$TICKETLOG_DIR`, then the
/// platform data directory. The directory is created if needed.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    let dir = flag
        .or_else(|| env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .or_else(|| dirs::data_dir().map(|d| d.join("ticketlog")))
        .ok_or(TicketError::DataDirNotFound)?;

    fs::create_dir_all(&dir)?;
    debug!(dir = %dir.display(), "using data directory");
    Ok(dir)
}

fn open_store(dir: &Path) -> Result<EntryStore> {
    EntryStore::open(dir.join(ENTRIES_FILE))
}

pub(crate) fn parse_state(s: &str) -> Result<EntryState> {
    s.parse().map_err(|_| TicketError::InvalidState(s.to_string()))
}

fn print_json(entries: &[&Entry]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(entries)?);
    Ok(())
}

fn render(store: &EntryStore, view: &[&Entry]) {
    TerminalPresenter::stdout().render(view, store.stats(), store.last_saved());
}

pub fn handle_add(dir: &Path, args: AddArgs) -> Result<()> {
    let mut store = open_store(dir)?;

    let fields = EntryFields {
        caller: args.caller.unwrap_or_default(),
        title: args.title,
        description: args.description.unwrap_or_default(),
        additional_notes: args.notes.unwrap_or_default(),
        assignment_group: args.group.unwrap_or_default(),
        state: parse_state(&args.state)?,
    };
    let entry = Entry::new(fields);
    let timestamp = entry.timestamp.clone();
    store.add(entry)?;

    println!("✔ New Ticket Added Successfully. ({})", timestamp);
    Ok(())
}

pub fn handle_list(dir: &Path, sort: Option<String>, reverse: bool, json: bool) -> Result<()> {
    let store = open_store(dir)?;

    let view = match sort {
        Some(column) => {
            let column: SortColumn = column.parse()?;
            view::sort_entries(store.entries(), column, reverse)
        }
        None => {
            let mut view = store.display_order();
            if reverse {
                view.reverse();
            }
            view
        }
    };

    if json {
        print_json(&view)
    } else {
        render(&store, &view);
        Ok(())
    }
}

pub fn handle_search(dir: &Path, term: String, json: bool) -> Result<()> {
    let store = open_store(dir)?;
    let view = store.filter(&term);

    if json {
        print_json(&view)
    } else {
        render(&store, &view);
        Ok(())
    }
}

pub fn handle_edit(
    dir: &Path,
    selector: String,
    changes: FieldArgs,
    done: Option<bool>,
) -> Result<()> {
    let mut store = open_store(dir)?;
    let selector: Selector = selector.parse()?;
    let id = selector.resolve(&store, &store.display_order())?;

    let (mut fields, current_done) = match store.get(id) {
        Some(entry) => (entry.fields(), entry.done),
        None => return Err(TicketError::EntryNotFound(id.to_string())),
    };
    if let Some(title) = changes.title {
        fields.title = title;
    }
    if let Some(caller) = changes.caller {
        fields.caller = caller;
    }
    if let Some(description) = changes.description {
        fields.description = description;
    }
    if let Some(notes) = changes.notes {
        fields.additional_notes = notes;
    }
    if let Some(group) = changes.group {
        fields.assignment_group = group;
    }
    if let Some(state) = changes.state {
        fields.state = parse_state(&state)?;
    }

    store.edit(id, fields, done.unwrap_or(current_done))?;
    println!("✔ Ticket Updated Successfully.");
    Ok(())
}

pub fn handle_done(dir: &Path, selector: String) -> Result<()> {
    let mut store = open_store(dir)?;
    let selector: Selector = selector.parse()?;
    let id = selector.resolve(&store, &store.display_order())?;

    match store.toggle_done(id)? {
        Some(true) => println!("☑ Marked as done."),
        Some(false) => println!("☐ Marked as pending."),
        None => return Err(TicketError::EntryNotFound(id.to_string())),
    }
    Ok(())
}

pub fn handle_delete(dir: &Path, selectors: Vec<String>) -> Result<()> {
    let mut store = open_store(dir)?;

    // Resolve every selector against the same table before removing anything.
    let ids = {
        let view = store.display_order();
        let mut ids = HashSet::new();
        for raw in &selectors {
            let selector: Selector = raw.parse()?;
            ids.insert(selector.resolve(&store, &view)?);
        }
        ids
    };

    let removed = store.delete(&ids)?;
    println!("✖ Ticket(s) Deleted Successfully. ({} removed)", removed);
    Ok(())
}

pub fn handle_export(dir: &Path, path: Option<PathBuf>) -> Result<()> {
    let store = open_store(dir)?;
    let path = match path {
        Some(path) => path,
        None => env::current_dir()?.join(export::default_file_name(&Local::now().naive_local())),
    };

    let rows = export::write_csv(store.entries(), &path)?;
    println!("Exported {} tickets to {}", rows, path.display());
    Ok(())
}

pub async fn handle_settings(
    dir: &Path,
    reminders: Option<bool>,
    interval: Option<i64>,
    unit: String,
    view: Option<String>,
    json: bool,
) -> Result<()> {
    let settings = SharedSettings::open(dir.join(SETTINGS_FILE))?;

    let unit: IntervalUnit = unit.parse()?;
    let view: Option<ViewMode> = view.map(|v| v.parse()).transpose()?;

    let current = if reminders.is_some() || interval.is_some() || view.is_some() {
        settings
            .update(|s| {
                if let Some(enabled) = reminders {
                    s.reminders_enabled = enabled;
                }
                if let Some(amount) = interval {
                    s.set_interval(amount, unit);
                }
                if let Some(mode) = view {
                    s.default_view_mode = mode;
                }
            })
            .await?
    } else {
        settings.snapshot().await
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&current)?);
    } else {
        println!("{}", settings_summary(&current));
    }
    Ok(())
}

pub async fn handle_shell(dir: &Path) -> Result<()> {
    let store = SharedStore::new(open_store(dir)?);
    let settings = SharedSettings::open(dir.join(SETTINGS_FILE))?;

    shell::run_shell(store, settings, TerminalPresenter::stdout()).await
}
