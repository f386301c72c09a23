mod account;
mod init;
pub use account::{cmd_login, cmd_logout, cmd_status, cmd_sync};
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::lock::NotebookLock;
use crate::io::notebook_io::{self, NOTEBOOK_DIR};
use crate::model::note::{Note, NoteDraft, NoteId};
use crate::ops::note_ops::{self, NoteError};
use crate::ops::selection::delete_prompt;
use crate::ops::session::Session;
use crate::ops::{export, search};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let dir = cli.notebook_dir.as_deref();
    let root = || notebook_root(dir);

    match cli.command {
        None => Err("no command given (try `ql --help`)".into()),
        Some(cmd) => match cmd {
            // Init is handled in main.rs before notebook discovery
            Commands::Init(args) => cmd_init(args),

            // Read commands
            Commands::List(args) => cmd_list(&root()?, args, json),
            Commands::Show(args) => cmd_show(&root()?, args, json),
            Commands::Search(args) => cmd_search(&root()?, args, json),
            Commands::Status => cmd_status(&root()?, json),

            // Write commands
            Commands::New(args) => cmd_new(&root()?, args, json),
            Commands::Edit(args) => cmd_edit(&root()?, args, json),
            Commands::Pin(args) => cmd_pin(&root()?, args, true, json),
            Commands::Unpin(args) => cmd_pin(&root()?, args, false, json),
            Commands::Rm(args) => cmd_rm(&root()?, args),

            // Selection
            Commands::Select(args) => cmd_select(&root()?, args, json),
            Commands::Bulk(args) => cmd_bulk(&root()?, args, json),

            Commands::Export(args) => cmd_export(&root()?, args, json),

            // Server
            Commands::Login(args) => cmd_login(&root()?, args),
            Commands::Logout => cmd_logout(&root()?),
            Commands::Sync => cmd_sync(&root()?),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Find the notebook from `-C` or the current directory.
pub fn notebook_root(dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let start = match dir {
        Some(dir) => std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        None => std::env::current_dir()?,
    };
    Ok(notebook_io::discover_notebook(&start)?)
}

fn lock_notebook(root: &Path) -> Result<NotebookLock, Box<dyn std::error::Error>> {
    Ok(NotebookLock::acquire_default(&root.join(NOTEBOOK_DIR))?)
}

/// Open the notebook, reporting a guest-note handoff on stderr.
pub(super) fn open_session(root: &Path) -> Result<Session, Box<dyn std::error::Error>> {
    let (session, outcome) = Session::open(root)?;
    if let Some(outcome) = &outcome
        && let Some(msg) = format_handoff(outcome)
    {
        if outcome.is_success() {
            eprintln!("{}", msg);
        } else {
            eprintln!("warning: {}", msg);
        }
    }
    Ok(session)
}

/// Ask on stderr; anything but `y` declines.
fn confirm(prompt: &str) -> Result<bool, Box<dyn std::error::Error>> {
    eprint!("{} [y/n] ", prompt);
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_notes<'a>(
    session: &Session,
    notes: impl IntoIterator<Item = &'a Note>,
    json: bool,
) -> CmdResult {
    if json {
        let out: Vec<NoteJson> = notes
            .into_iter()
            .map(|n| note_to_json(n, &session.selection))
            .collect();
        return print_json(&out);
    }
    for line in format_note_list(notes, &session.selection, session.current) {
        println!("{}", line);
    }
    Ok(())
}

/// Print the note a write command produced
fn print_saved(session: &Session, id: NoteId, verb: &str, json: bool) -> CmdResult {
    let note = session.find(id).ok_or(NoteError::NotFound(id))?;
    if json {
        return print_json(&note_to_json(note, &session.selection));
    }
    println!("{} {}", verb, format_note_line(note, false, false).trim_start());
    Ok(())
}

fn print_exported(paths: &[(NoteId, PathBuf)], json: bool) -> CmdResult {
    if json {
        let out: Vec<ExportJson> = paths
            .iter()
            .map(|(id, p)| ExportJson {
                id: *id,
                path: p.display().to_string(),
            })
            .collect();
        return print_json(&out);
    }
    for (_, p) in paths {
        println!("exported {}", p.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(root: &Path, args: ListArgs, json: bool) -> CmdResult {
    let _lock = lock_notebook(root)?;
    let session = open_session(root)?;
    let notes = session.notes().iter().filter(|n| {
        (!args.pinned || n.is_pinned)
            && args
                .category
                .as_deref()
                .is_none_or(|c| n.category.eq_ignore_ascii_case(c))
    });
    print_notes(&session, notes, json)?;
    if !json && let Some(summary) = session.selection.summary() {
        println!();
        println!("{}", summary);
    }
    Ok(())
}

fn cmd_show(root: &Path, args: IdArg, json: bool) -> CmdResult {
    let _lock = lock_notebook(root)?;
    let mut session = open_session(root)?;
    let shown = note_ops::show_note(&mut session, args.id).map(|n| n.id);
    // A missing note still clears the detail view
    session.save_ui_state()?;
    let note = session.find(shown?).ok_or(NoteError::NotFound(args.id))?;
    if json {
        return print_json(&note_to_json(note, &session.selection));
    }
    for line in format_note_detail(note) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_search(root: &Path, args: SearchArgs, json: bool) -> CmdResult {
    let _lock = lock_notebook(root)?;
    let mut session = open_session(root)?;

    let hits: Vec<Note> = if args.remote {
        let backend = session
            .backend
            .as_deref()
            .ok_or("--remote needs a logged-in notebook (run `ql login`)")?;
        backend.fetch_notes(&args.term)?
    } else {
        search::search_notes(session.notes(), &args.term)
            .into_iter()
            .cloned()
            .collect()
    };

    session.last_search = Some(args.term);
    session.save_ui_state()?;
    print_notes(&session, &hits, json)
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_new(root: &Path, args: NewArgs, json: bool) -> CmdResult {
    let _lock = lock_notebook(root)?;
    let mut session = open_session(root)?;
    let category = args
        .category
        .unwrap_or_else(|| session.notebook.config.ui.default_category.clone());
    let draft = NoteDraft {
        id: None,
        title: args.title.unwrap_or_default(),
        content: args.content.unwrap_or_default(),
        category,
        reminder_date: args.reminder,
        is_pinned: args.pin,
    };
    let id = note_ops::save_note(&mut session, draft)?;
    session.save_ui_state()?;
    print_saved(&session, id, "created", json)
}

fn cmd_edit(root: &Path, args: EditArgs, json: bool) -> CmdResult {
    let patch = args.fields.to_patch();
    if patch.is_empty() {
        return Err("nothing to change (see `ql edit --help`)".into());
    }
    let _lock = lock_notebook(root)?;
    let mut session = open_session(root)?;
    let id = note_ops::edit_note(&mut session, args.id, &patch)?;
    session.save_ui_state()?;
    print_saved(&session, id, "updated", json)
}

fn cmd_pin(root: &Path, args: IdArg, pinned: bool, json: bool) -> CmdResult {
    let _lock = lock_notebook(root)?;
    let mut session = open_session(root)?;
    let id = note_ops::set_pinned(&mut session, args.id, pinned)?;
    session.save_ui_state()?;
    print_saved(&session, id, if pinned { "pinned" } else { "unpinned" }, json)
}

fn cmd_rm(root: &Path, args: RmArgs) -> CmdResult {
    let _lock = lock_notebook(root)?;
    let mut session = open_session(root)?;

    for id in &args.ids {
        if session.find(*id).is_none() {
            return Err(NoteError::NotFound(*id).into());
        }
    }
    if !args.yes && args.ids.len() > 1 && !confirm(&delete_prompt(args.ids.len()))? {
        println!("cancelled");
        return Ok(());
    }

    for id in args.ids {
        let note = note_ops::delete_note(&mut session, id)?;
        println!("deleted {} {}", note.id, note.display_title());
    }
    session.save_ui_state()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

fn cmd_select(root: &Path, args: SelectArgs, json: bool) -> CmdResult {
    let _lock = lock_notebook(root)?;
    let mut session = open_session(root)?;

    if args.clear {
        session.selection.clear();
    }
    for id in &args.ids {
        if session.find(*id).is_none() {
            return Err(NoteError::NotFound(*id).into());
        }
        session.selection.toggle(*id);
    }
    session.save_ui_state()?;

    let selected: Vec<&Note> = session
        .selection
        .ids()
        .filter_map(|id| session.find(id))
        .collect();
    if json {
        return print_notes(&session, selected, true);
    }
    match session.selection.summary() {
        Some(summary) => {
            for note in selected {
                println!("{}", format_note_line(note, true, session.current == Some(note.id)));
            }
            println!("{}", summary);
        }
        None => println!("no notes selected"),
    }
    Ok(())
}

fn cmd_bulk(root: &Path, cmd: BulkCmd, json: bool) -> CmdResult {
    let _lock = lock_notebook(root)?;
    let mut session = open_session(root)?;
    if session.selection.is_empty() {
        return Err("no notes selected (use `ql select <id>...`)".into());
    }

    match cmd.action {
        BulkAction::Delete(args) => {
            let count = session.selection.len();
            if !args.yes && !confirm(&delete_prompt(count))? {
                println!("cancelled");
                return Ok(());
            }
            let removed = note_ops::bulk_delete(&mut session)?;
            session.save_ui_state()?;
            for note in &removed {
                println!("deleted {} {}", note.id, note.display_title());
            }
            Ok(())
        }
        BulkAction::Edit(fields) => {
            let patch = fields.to_patch();
            if patch.is_empty() {
                return Err("nothing to change (see `ql bulk edit --help`)".into());
            }
            let count = session.selection.len();
            let id = note_ops::take_bulk_edit_target(&mut session).ok_or_else(|| {
                format!("bulk edit needs exactly one selected note ({} selected)", count)
            })?;
            let result = note_ops::edit_note(&mut session, id, &patch);
            session.save_ui_state()?;
            print_saved(&session, result?, "updated", json)
        }
        BulkAction::Export(target) => {
            let notes: Vec<&Note> = session
                .selection
                .ids()
                .filter_map(|id| session.find(id))
                .collect();
            let paths = export::export_notes(notes.iter().copied(), Path::new(&target.dir))?;
            let pairs: Vec<(NoteId, PathBuf)> =
                notes.iter().map(|n| n.id).zip(paths).collect();
            print_exported(&pairs, json)
        }
    }
}

fn cmd_export(root: &Path, args: ExportArgs, json: bool) -> CmdResult {
    let _lock = lock_notebook(root)?;
    let session = open_session(root)?;
    let notes = args
        .ids
        .iter()
        .map(|id| session.find(*id).ok_or(NoteError::NotFound(*id)))
        .collect::<Result<Vec<&Note>, _>>()?;
    let paths = export::export_notes(notes.iter().copied(), Path::new(&args.target.dir))?;
    let pairs: Vec<(NoteId, PathBuf)> = notes.iter().map(|n| n.id).zip(paths).collect();
    print_exported(&pairs, json)
}
