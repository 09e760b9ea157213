mod commands;
mod handlers;
mod output;
mod selector;
mod shell;

pub use commands::{AddArgs, Cli, Commands, FieldArgs};
pub use handlers::{
    handle_add, handle_delete, handle_done, handle_edit, handle_export, handle_list,
    handle_search, handle_settings, handle_shell, resolve_data_dir, DATA_DIR_ENV,
};
pub use output::{settings_summary, TerminalPresenter};
pub use selector::Selector;
pub use shell::{drive, run_shell, Flow, Session, HELP};
