//! The interactive session: a line-oriented command loop sharing the store
//! with the reminder and autosave timers.

use std::collections::HashSet;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::entity::{Entry, EntryFields, EntryId};
use crate::error::{Result, TicketError};
use crate::export;
use crate::presenter::{status_line, Presenter};
use crate::settings::{IntervalUnit, SharedSettings, ViewMode};
use crate::storage::{EntryStore, SharedStore, StoreStats, UndoOutcome};
use crate::timers::{spawn_autosave, spawn_reminder, Reminder, AUTOSAVE_PERIOD};
use crate::view::SortColumn;

use super::handlers::parse_state;
use super::output::settings_summary;
use super::selector::Selector;

const PROMPT: &str = "ticketlog> ";

pub const HELP: &str = "\
Commands:
  list | ls                        show all tickets, newest first
  add <title> [| caller | group | state]
  edit <row> <field> <value>       field: title, caller, description, notes, group, state, done
  done <row>                       toggle the done flag
  delete <row> [<row> ...]         delete tickets (undo restores them)
  undo                             restore the last delete
  search <term>                    show tickets containing <term>
  clear                            clear the search
  sort <column>                    sort by a column, again to reverse
  export [path]                    write all tickets to CSV
  save                             save now
  view                             switch between full and compact view
  stats                            show totals
  remind on|off                    turn reminders on or off
  interval <n> [minutes|hours]     set the reminder interval
  settings                         show settings
  help                             show this help
  quit | exit                      save and leave";

/// What the loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// State of one interactive session.
pub struct Session<P: Presenter> {
    store: SharedStore,
    settings: SharedSettings,
    presenter: P,
    view_mode: ViewMode,
    /// Entries of the table last shown, in row order.
    rows: Vec<EntryId>,
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" | "done" => Some(true),
        "false" | "no" | "n" | "off" | "0" | "pending" => Some(false),
        _ => None,
    }
}

impl<P: Presenter> Session<P> {
    pub async fn new(store: SharedStore, settings: SharedSettings, presenter: P) -> Self {
        let view_mode = settings.snapshot().await.default_view_mode;
        Self {
            store,
            settings,
            presenter,
            view_mode,
            rows: Vec::new(),
        }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Draw the initial table.
    pub async fn start(&mut self) {
        let shared = self.store.clone();
        let store = shared.lock().await;
        self.refresh(&store);
    }

    pub fn remind(&mut self, reminder: Reminder) {
        self.presenter.notify_pending(reminder.pending);
    }

    pub fn report(&mut self, error: &TicketError) {
        self.presenter.status(&format!("Error: {}", error));
    }

    fn show(&mut self, store: &EntryStore, view: Vec<&Entry>) {
        self.present(view, store.stats(), store.last_saved());
    }

    fn present(&mut self, view: Vec<&Entry>, stats: StoreStats, last_saved: Option<&str>) {
        self.rows = view.iter().map(|e| e.id).collect();
        self.presenter.render(&view, stats, last_saved);
    }

    /// Redisplay after a mutation: the whole store, newest first, honoring
    /// the view mode.
    fn refresh(&mut self, store: &EntryStore) {
        let view = store.display_order();
        match self.view_mode {
            ViewMode::Full => self.show(store, view),
            ViewMode::Compact => {
                self.rows = view.iter().map(|e| e.id).collect();
                self.presenter
                    .status(&status_line(store.stats(), store.last_saved()));
            }
        }
    }

    fn resolve(&self, store: &EntryStore, raw: &str) -> Result<EntryId> {
        let selector: Selector = raw.parse()?;
        let view: Vec<&Entry> = self.rows.iter().filter_map(|id| store.get(*id)).collect();
        selector.resolve(store, &view)
    }

    /// Run one command line.
    pub async fn execute(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command.to_lowercase().as_str() {
            "" => {}
            "quit" | "exit" => return Ok(Flow::Quit),
            "help" | "?" => self.presenter.status(HELP),
            "list" | "ls" | "clear" => {
                let shared = self.store.clone();
                let store = shared.lock().await;
                let view = store.display_order();
                self.show(&store, view);
            }
            "add" => self.add(rest).await?,
            "edit" => self.edit(rest).await?,
            "done" => self.toggle_done(rest).await?,
            "delete" | "del" | "rm" => self.delete(rest).await?,
            "undo" => self.undo(false).await?,
            "z" => self.undo(true).await?,
            "search" | "find" => {
                let shared = self.store.clone();
                let store = shared.lock().await;
                let view = store.filter(rest);
                self.show(&store, view);
            }
            "sort" => {
                let column: SortColumn = rest.parse()?;
                let shared = self.store.clone();
                let mut store = shared.lock().await;
                // Sorting only reorders the view, so the status bar can be read first.
                let stats = store.stats();
                let last_saved = store.last_saved().map(str::to_string);
                let view = store.sort_by(column);
                self.present(view, stats, last_saved.as_deref());
            }
            "export" => self.export(rest).await?,
            "save" => {
                let shared = self.store.clone();
                let mut store = shared.lock().await;
                store.save()?;
                let message = format!("Saved at {}", store.last_saved().unwrap_or_default());
                self.presenter.status(&message);
            }
            "view" => {
                self.view_mode = self.view_mode.toggled();
                self.presenter
                    .status(&format!("View mode: {}", self.view_mode));
                let shared = self.store.clone();
                let store = shared.lock().await;
                self.refresh(&store);
            }
            "stats" => {
                let store = self.store.lock().await;
                let line = status_line(store.stats(), store.last_saved());
                drop(store);
                self.presenter.status(&line);
            }
            "remind" | "reminders" => {
                let enabled = parse_bool(rest)
                    .ok_or_else(|| TicketError::InvalidSetting(format!("reminders '{}'", rest)))?;
                let settings = self.settings.update(|s| s.reminders_enabled = enabled).await?;
                self.presenter.status(&settings_summary(&settings));
            }
            "interval" => {
                let mut parts = rest.split_whitespace();
                let amount = parts
                    .next()
                    .and_then(|n| n.parse::<i64>().ok())
                    .ok_or_else(|| TicketError::InvalidSetting(format!("interval '{}'", rest)))?;
                let unit: IntervalUnit = match parts.next() {
                    Some(unit) => unit.parse()?,
                    None => IntervalUnit::Minutes,
                };
                let settings = self.settings.update(|s| s.set_interval(amount, unit)).await?;
                self.presenter.status(&settings_summary(&settings));
            }
            "settings" => {
                let settings = self.settings.snapshot().await;
                self.presenter.status(&settings_summary(&settings));
            }
            other => self
                .presenter
                .status(&format!("Unknown command '{}'. Type 'help' for a list.", other)),
        }

        Ok(Flow::Continue)
    }

    async fn add(&mut self, rest: &str) -> Result<()> {
        let mut parts = rest.split('|').map(str::trim);
        let mut fields = EntryFields::titled(parts.next().unwrap_or_default());
        fields.caller = parts.next().unwrap_or_default().to_string();
        fields.assignment_group = parts.next().unwrap_or_default().to_string();
        if let Some(state) = parts.next().filter(|s| !s.is_empty()) {
            fields.state = parse_state(state)?;
        }

        let shared = self.store.clone();
        let mut store = shared.lock().await;
        store.add(Entry::new(fields))?;
        self.presenter.status("✔ New Ticket Added Successfully.");
        self.refresh(&store);
        Ok(())
    }

    async fn edit(&mut self, rest: &str) -> Result<()> {
        let mut parts = rest.splitn(3, char::is_whitespace);
        let row = parts.next().unwrap_or_default();
        let field = parts.next().unwrap_or_default().to_lowercase();
        let value = parts.next().unwrap_or_default().trim();

        let shared = self.store.clone();
        let mut store = shared.lock().await;
        let id = self.resolve(&store, row)?;
        let (mut fields, mut done) = match store.get(id) {
            Some(entry) => (entry.fields(), entry.done),
            None => return Err(TicketError::EntryNotFound(row.to_string())),
        };

        match field.as_str() {
            "title" => fields.title = value.to_string(),
            "caller" => fields.caller = value.to_string(),
            "description" => fields.description = value.to_string(),
            "notes" | "additional_notes" => fields.additional_notes = value.to_string(),
            "group" | "assignment_group" => fields.assignment_group = value.to_string(),
            "state" => fields.state = parse_state(value)?,
            "done" => {
                done = parse_bool(value)
                    .ok_or_else(|| TicketError::InvalidSetting(format!("done '{}'", value)))?
            }
            _ => return Err(TicketError::InvalidColumn(field)),
        }

        store.edit(id, fields, done)?;
        self.presenter.status("✔ Ticket Updated Successfully.");
        self.refresh(&store);
        Ok(())
    }

    async fn toggle_done(&mut self, rest: &str) -> Result<()> {
        let shared = self.store.clone();
        let mut store = shared.lock().await;
        let id = self.resolve(&store, rest)?;
        store
            .toggle_done(id)?
            .ok_or_else(|| TicketError::EntryNotFound(rest.to_string()))?;
        self.refresh(&store);
        Ok(())
    }

    async fn delete(&mut self, rest: &str) -> Result<()> {
        if rest.is_empty() {
            return Err(TicketError::InvalidSelector(String::new()));
        }

        let shared = self.store.clone();
        let mut store = shared.lock().await;
        let ids = rest
            .split_whitespace()
            .map(|raw| self.resolve(&store, raw))
            .collect::<Result<HashSet<_>>>()?;

        if store.delete(&ids)? > 0 {
            self.presenter.status("✖ Ticket(s) Deleted Successfully.");
        }
        self.refresh(&store);
        Ok(())
    }

    async fn undo(&mut self, quiet: bool) -> Result<()> {
        let shared = self.store.clone();
        let mut store = shared.lock().await;
        match store.undo()? {
            UndoOutcome::Restored(count) => {
                self.presenter
                    .status(&format!("↶ Restored {} ticket(s).", count));
                self.refresh(&store);
            }
            UndoOutcome::NothingToUndo => {
                if !quiet {
                    self.presenter.status("Nothing to undo.");
                }
            }
        }
        Ok(())
    }

    async fn export(&mut self, rest: &str) -> Result<()> {
        let path = if rest.is_empty() {
            std::env::current_dir()?.join(export::default_file_name(&Local::now().naive_local()))
        } else {
            PathBuf::from(rest)
        };

        let store = self.store.lock().await;
        let rows = export::write_csv(store.entries(), &path)?;
        drop(store);
        self.presenter
            .status(&format!("Exported {} tickets to {}", rows, path.display()));
        Ok(())
    }
}

fn prompt() {
    let mut out = std::io::stdout();
    let _ = write!(out, "{}", PROMPT);
    let _ = out.flush();
}

/// Read commands from `input` until `quit`, end of input, or `shutdown`
/// completes, showing reminders between commands.
///
/// `shutdown` is polled as one future for the whole loop, so a request that
/// arrives while a command runs is seen on the next turn.
pub async fn drive<P, R, F>(
    session: &mut Session<P>,
    input: R,
    reminders: &mut mpsc::UnboundedReceiver<Reminder>,
    shutdown: F,
) -> Result<()>
where
    P: Presenter,
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut lines = input.lines();
    loop {
        prompt();
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => match session.execute(&line).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => session.report(&e),
                },
                None => break,
            },
            Some(reminder) = reminders.recv() => session.remind(reminder),
            () = &mut shutdown => break,
        }
    }
    Ok(())
}

/// Run the interactive loop on stdin until `quit`, end of input, or Ctrl-C.
///
/// Starts the reminder and autosave timers for the lifetime of the loop and
/// saves once more on the way out.
pub async fn run_shell<P: Presenter>(
    store: SharedStore,
    settings: SharedSettings,
    presenter: P,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let reminder = spawn_reminder(store.clone(), settings.clone(), tx);
    let autosave = spawn_autosave(store.clone(), AUTOSAVE_PERIOD);

    let mut session = Session::new(store.clone(), settings, presenter).await;
    session.start().await;
    info!("interactive session started");

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    let outcome = drive(
        &mut session,
        BufReader::new(tokio::io::stdin()),
        &mut rx,
        ctrl_c,
    )
    .await;

    reminder.abort();
    autosave.abort();
    store.save().await?;
    info!("interactive session ended");
    outcome
}
