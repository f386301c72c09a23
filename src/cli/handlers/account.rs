use std::path::Path;

use super::{CmdResult, lock_notebook, open_session, print_json};
use crate::cli::commands::LoginArgs;
use crate::cli::output::{StatusJson, format_handoff};
use crate::io::config_io;
use crate::io::notebook_io::{self, NOTEBOOK_DIR};
use crate::model::notebook::Mode;
use crate::ops::session::Session;
use crate::ops::sync::HandoffOutcome;

pub fn cmd_login(root: &Path, args: LoginArgs) -> CmdResult {
    let dir = root.join(NOTEBOOK_DIR);
    let _lock = lock_notebook(root)?;

    let previous = config_io::read_config_doc(&dir)?;
    let mut doc = previous.clone();
    config_io::set_remote(&mut doc, &args.server, &args.session);
    config_io::write_config_doc(&dir, &doc)?;

    // Opening the session hands any guest notes over to the server
    let session = match open_session(root) {
        Ok(session) => session,
        Err(e) => {
            config_io::write_config_doc(&dir, &previous)?;
            return Err(format!("login failed: {}", e).into());
        }
    };
    session.save_ui_state()?;

    println!("logged in to {}", args.server.trim_end_matches('/'));
    println!("{} notes on the server", session.notes().len());
    Ok(())
}

pub fn cmd_logout(root: &Path) -> CmdResult {
    let dir = root.join(NOTEBOOK_DIR);
    let _lock = lock_notebook(root)?;
    let mut doc = config_io::read_config_doc(&dir)?;
    if config_io::clear_session(&mut doc) {
        config_io::write_config_doc(&dir, &doc)?;
        println!("logged out; new notes stay in this notebook");
    } else {
        println!("not logged in");
    }
    Ok(())
}

pub fn cmd_sync(root: &Path) -> CmdResult {
    if !notebook_io::read_config(root)?.remote.is_authenticated() {
        return Err("not logged in (run `ql login --server <url> --session <cookie>`)".into());
    }
    let _lock = lock_notebook(root)?;
    let (session, outcome) = Session::open(root)?;
    session.save_ui_state()?;

    match outcome {
        Some(HandoffOutcome::Restored { error }) => Err(format!("sync failed: {}", error).into()),
        Some(outcome @ HandoffOutcome::Synced { .. }) => {
            if let Some(msg) = format_handoff(&outcome) {
                println!("{}", msg);
            }
            Ok(())
        }
        _ => {
            println!("no local notes to sync");
            Ok(())
        }
    }
}

pub fn cmd_status(root: &Path, json: bool) -> CmdResult {
    let _lock = lock_notebook(root)?;
    let session = open_session(root)?;
    let notebook = &session.notebook;
    let server = match session.mode() {
        Mode::Authenticated => notebook.config.remote.url.clone(),
        Mode::Guest => None,
    };
    let pinned = session.notes().iter().filter(|n| n.is_pinned).count();

    if json {
        return print_json(&StatusJson {
            name: notebook.name().to_string(),
            mode: session.mode(),
            server,
            notes: session.notes().len(),
            pinned,
            selected: session.selection.ids().collect(),
            current: session.current,
        });
    }

    println!("{}", notebook.name());
    match server {
        Some(url) => println!("mode: authenticated ({})", url),
        None => println!("mode: guest ({})", session.store.path().display()),
    }
    println!("notes: {} ({} pinned)", session.notes().len(), pinned);
    if let Some(summary) = session.selection.summary() {
        println!("{}", summary);
    }
    if let Some(id) = session.current {
        println!("current: {}", id);
    }
    Ok(())
}
