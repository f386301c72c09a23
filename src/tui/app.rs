use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use regex::Regex;

use crate::cli::output::format_handoff;
use crate::io::lock::NotebookLock;
use crate::io::notebook_io::{self, NOTEBOOK_DIR};
use crate::io::watcher::{FileEvent, NotebookWatcher};
use crate::model::note::{Note, NoteDraft, NoteId, parse_reminder};
use crate::model::notebook;
use crate::ops::selection::delete_prompt;
use crate::ops::session::Session;
use crate::ops::{export, note_ops, search};

use super::input;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing a live search term
    Search,
    /// The create/edit form is open
    Form,
    /// Waiting for y/n
    Confirm,
}

/// Fields of the note form, in Tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Category,
    Reminder,
    Pinned,
    Content,
}

impl FormField {
    const ORDER: [FormField; 5] = [
        FormField::Title,
        FormField::Category,
        FormField::Reminder,
        FormField::Pinned,
        FormField::Content,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// State of the note form. `id` is `None` when creating.
#[derive(Debug, Clone)]
pub struct FormState {
    pub id: Option<NoteId>,
    pub title: String,
    pub content: String,
    pub category: String,
    /// Reminder as typed, validated on save
    pub reminder: String,
    pub pinned: bool,
    pub field: FormField,
    /// Byte offset into the focused text field
    pub cursor: usize,
    pub error: Option<String>,
}

impl FormState {
    pub fn new_note(default_category: &str) -> Self {
        FormState {
            id: None,
            title: String::new(),
            content: String::new(),
            category: default_category.to_string(),
            reminder: String::new(),
            pinned: false,
            field: FormField::Title,
            cursor: 0,
            error: None,
        }
    }

    pub fn edit(note: &Note) -> Self {
        let mut form = FormState {
            id: Some(note.id),
            title: note.title.clone(),
            content: note.content.clone(),
            category: note.category.clone(),
            reminder: note.reminder_string().unwrap_or_default(),
            pinned: note.is_pinned,
            field: FormField::Title,
            cursor: 0,
            error: None,
        };
        form.focus(FormField::Title);
        form
    }

    /// The focused field's text, if it is a text field
    pub fn text(&self) -> Option<&str> {
        match self.field {
            FormField::Title => Some(&self.title),
            FormField::Reminder => Some(&self.reminder),
            FormField::Content => Some(&self.content),
            FormField::Category | FormField::Pinned => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut String> {
        match self.field {
            FormField::Title => Some(&mut self.title),
            FormField::Reminder => Some(&mut self.reminder),
            FormField::Content => Some(&mut self.content),
            FormField::Category | FormField::Pinned => None,
        }
    }

    /// Move focus, putting the cursor at the end of the field
    pub fn focus(&mut self, field: FormField) {
        self.field = field;
        self.cursor = self.text().map_or(0, str::len);
    }

    /// Step through `categories`; an unknown category starts at the first.
    pub fn cycle_category(&mut self, categories: &[String], forward: bool) {
        if categories.is_empty() {
            return;
        }
        let n = categories.len();
        let next = match categories.iter().position(|c| *c == self.category) {
            Some(i) if forward => (i + 1) % n,
            Some(i) => (i + n - 1) % n,
            None => 0,
        };
        self.category = categories[next].clone();
    }

    /// Build the draft to save. Fails on an unreadable reminder.
    pub fn to_draft(&self) -> Result<NoteDraft, String> {
        let reminder = self.reminder.trim();
        let reminder_date = if reminder.is_empty() {
            None
        } else {
            Some(
                parse_reminder(reminder)
                    .ok_or_else(|| "Invalid reminder (use YYYY-MM-DDTHH:MM)".to_string())?,
            )
        };
        Ok(NoteDraft {
            id: self.id,
            title: self.title.clone(),
            content: self.content.clone(),
            category: self.category.clone(),
            reminder_date,
            is_pinned: self.pinned,
        })
    }
}

/// What a pending y/n confirmation will do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteNote(NoteId),
    BulkDelete,
}

#[derive(Debug, Clone)]
pub struct ConfirmState {
    pub prompt: String,
    pub action: ConfirmAction,
}

/// Main application state
pub struct App {
    pub session: Session,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    /// Cursor index into the visible notes
    pub cursor: usize,
    /// First visible row of the list
    pub scroll_offset: usize,
    /// Search term being typed
    pub search_input: String,
    pub form: Option<FormState>,
    pub confirm: Option<ConfirmState>,
    /// One-shot message shown in the status row until the next key
    pub status_message: Option<String>,
    /// Where exported notes are written
    pub export_dir: PathBuf,
}

impl App {
    pub fn new(session: Session) -> Self {
        let theme = Theme::from_config(&session.notebook.config.ui);
        let export_dir = session.notebook.root.clone();
        let current = session.current;
        let mut app = App {
            session,
            mode: Mode::Navigate,
            should_quit: false,
            theme,
            cursor: 0,
            scroll_offset: 0,
            search_input: String::new(),
            form: None,
            confirm: None,
            status_message: None,
            export_dir,
        };
        if let Some(id) = current {
            app.move_cursor_to(id);
        }
        app
    }

    /// The term filtering the list: what is being typed in search mode,
    /// otherwise the last committed search.
    pub fn search_term(&self) -> Option<&str> {
        let term = match self.mode {
            Mode::Search => self.search_input.as_str(),
            _ => self.session.last_search.as_deref()?,
        };
        if term.is_empty() { None } else { Some(term) }
    }

    pub fn active_search_re(&self) -> Option<Regex> {
        search::highlight_regex(self.search_term()?)
    }

    /// Notes shown in the list, in display order
    pub fn visible_notes(&self) -> Vec<&Note> {
        match self.search_term() {
            Some(term) => search::search_notes(self.session.notes(), term),
            None => self.session.notes().iter().collect(),
        }
    }

    pub fn cursor_note(&self) -> Option<&Note> {
        self.visible_notes().get(self.cursor).copied()
    }

    pub fn cursor_id(&self) -> Option<NoteId> {
        self.cursor_note().map(|n| n.id)
    }

    pub fn clamp_cursor(&mut self) {
        let count = self.visible_notes().len();
        self.cursor = if count == 0 {
            0
        } else {
            self.cursor.min(count - 1)
        };
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let count = self.visible_notes().len();
        if count == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(count - 1);
    }

    /// Put the cursor on a note if it is visible
    pub fn move_cursor_to(&mut self, id: NoteId) {
        if let Some(pos) = self.visible_notes().iter().position(|n| n.id == id) {
            self.cursor = pos;
        }
    }

    /// Run a write with the notebook lock held. A busy lock is reported in
    /// the status row and the write is skipped. In guest mode `notes.json`
    /// is reread under the lock first, so a note another process just wrote
    /// is not lost.
    fn with_lock<T>(&mut self, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        match NotebookLock::acquire_default(&self.session.notebook.dir) {
            Ok(_lock) => {
                if self.session.mode() == notebook::Mode::Guest
                    && let Err(e) = self.session.load_notes()
                {
                    tracing::error!(error = %e, "could not reread notes before writing");
                    self.status_message = Some(e.to_string());
                    return None;
                }
                Some(f(&mut self.session))
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping write");
                self.status_message = Some(e.to_string());
                None
            }
        }
    }

    // -- actions -------------------------------------------------------------

    /// Show the note under the cursor in the detail pane
    pub fn show_cursor_note(&mut self) {
        if let Some(id) = self.cursor_id() {
            let _ = note_ops::show_note(&mut self.session, id);
        }
    }

    pub fn toggle_select(&mut self) {
        if let Some(id) = self.cursor_id() {
            self.session.selection.toggle(id);
        }
    }

    pub fn open_new_form(&mut self) {
        let category = self.session.notebook.config.ui.default_category.clone();
        self.form = Some(FormState::new_note(&category));
        self.mode = Mode::Form;
    }

    /// Edit the note under the cursor, or the selected note when there is a
    /// selection. A bulk edit needs exactly one selected note.
    pub fn open_edit_form(&mut self) {
        let target = if self.session.selection.is_empty() {
            self.cursor_id()
        } else {
            let count = self.session.selection.len();
            let target = note_ops::take_bulk_edit_target(&mut self.session);
            if target.is_none() {
                self.status_message = Some(format!(
                    "select exactly one note to edit ({} selected)",
                    count
                ));
            }
            target
        };
        let Some(note) = target.and_then(|id| self.session.find(id)) else {
            return;
        };
        self.form = Some(FormState::edit(note));
        self.mode = Mode::Form;
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.mode = Mode::Navigate;
    }

    /// Validate and save the form. Errors stay in the form.
    pub fn save_form(&mut self) {
        let Some(form) = &self.form else {
            return;
        };
        let creating = form.id.is_none();
        let draft = match form.to_draft() {
            Ok(d) => d,
            Err(msg) => {
                self.set_form_error(msg);
                return;
            }
        };

        match self.with_lock(|s| note_ops::save_note(s, draft)) {
            Some(Ok(id)) => {
                self.close_form();
                self.move_cursor_to(id);
                self.status_message =
                    Some(if creating { "note created" } else { "note saved" }.to_string());
            }
            Some(Err(e)) => self.set_form_error(e.to_string()),
            None => {}
        }
    }

    fn set_form_error(&mut self, msg: String) {
        if let Some(form) = &mut self.form {
            form.error = Some(msg);
        }
    }

    pub fn toggle_pin(&mut self) {
        let Some(note) = self.cursor_note() else {
            return;
        };
        let (id, pinned) = (note.id, !note.is_pinned);
        if let Some(Err(e)) = self.with_lock(|s| note_ops::set_pinned(s, id, pinned)) {
            self.status_message = Some(e.to_string());
        }
        self.move_cursor_to(id);
    }

    /// Ask before deleting the selection, or the cursor note when nothing
    /// is selected.
    pub fn request_delete(&mut self) {
        let confirm = if !self.session.selection.is_empty() {
            ConfirmState {
                prompt: delete_prompt(self.session.selection.len()),
                action: ConfirmAction::BulkDelete,
            }
        } else if let Some(note) = self.cursor_note() {
            ConfirmState {
                prompt: format!("Delete \"{}\"?", note.display_title()),
                action: ConfirmAction::DeleteNote(note.id),
            }
        } else {
            return;
        };
        self.confirm = Some(confirm);
        self.mode = Mode::Confirm;
    }

    pub fn confirm_yes(&mut self) {
        let Some(confirm) = self.confirm.take() else {
            return;
        };
        self.mode = Mode::Navigate;
        let message = match confirm.action {
            ConfirmAction::DeleteNote(id) => self
                .with_lock(|s| note_ops::delete_note(s, id))
                .map(|r| r.map(|n| format!("deleted \"{}\"", n.display_title()))),
            ConfirmAction::BulkDelete => self
                .with_lock(note_ops::bulk_delete)
                .map(|r| r.map(|notes| format!("deleted {} notes", notes.len()))),
        };
        match message {
            Some(Ok(msg)) => self.status_message = Some(msg),
            Some(Err(e)) => self.status_message = Some(e.to_string()),
            None => {}
        }
        self.clamp_cursor();
    }

    pub fn cancel_confirm(&mut self) {
        self.confirm = None;
        self.mode = Mode::Navigate;
    }

    /// Export the selection, or the cursor note when nothing is selected
    pub fn export(&mut self) {
        let notes: Vec<&Note> = if self.session.selection.is_empty() {
            self.cursor_note().into_iter().collect()
        } else {
            self.session
                .selection
                .ids()
                .filter_map(|id| self.session.find(id))
                .collect()
        };
        if notes.is_empty() {
            return;
        }
        let message = match export::export_notes(notes, &self.export_dir) {
            Ok(paths) if paths.len() == 1 => format!("exported {}", paths[0].display()),
            Ok(paths) => format!("exported {} notes to {}", paths.len(), self.export_dir.display()),
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                format!("export failed: {}", e)
            }
        };
        self.status_message = Some(message);
    }

    /// Commit the typed search term
    pub fn commit_search(&mut self) {
        let term = std::mem::take(&mut self.search_input);
        self.session.last_search = if term.is_empty() { None } else { Some(term) };
        self.mode = Mode::Navigate;
        self.clamp_cursor();
    }

    pub fn clear_search(&mut self) {
        self.search_input.clear();
        self.session.last_search = None;
        self.mode = Mode::Navigate;
        self.clamp_cursor();
    }

    /// Reload notes from wherever this session keeps them, keeping the
    /// cursor on the same note.
    pub fn reload(&mut self) {
        let keep = self.cursor_id();
        match self.session.load_notes() {
            Ok(outcome) => {
                if let Some(msg) = outcome.as_ref().and_then(format_handoff) {
                    self.status_message = Some(msg);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "reload failed");
                self.status_message = Some(e.to_string());
            }
        }
        self.clamp_cursor();
        if let Some(id) = keep {
            self.move_cursor_to(id);
        }
    }

    /// React to another process changing the notebook
    pub fn handle_file_event(&mut self, event: FileEvent) {
        match event {
            FileEvent::NotesChanged => {
                if self.session.mode() == notebook::Mode::Guest {
                    tracing::debug!("notes.json changed on disk, reloading");
                    self.reload();
                }
            }
            FileEvent::ConfigChanged => self.reload_config(),
        }
    }

    /// Pick up quill.toml edits. A login or logout from the CLI reopens the
    /// session in the new mode.
    fn reload_config(&mut self) {
        let root = self.session.notebook.root.clone();
        let config = match notebook_io::read_config(&root) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "could not reload quill.toml");
                return;
            }
        };
        self.theme = Theme::from_config(&config.ui);

        let now_authenticated = config.remote.is_authenticated();
        let was_authenticated = self.session.mode() == notebook::Mode::Authenticated;
        if now_authenticated == was_authenticated {
            self.session.notebook.config = config;
            return;
        }

        if let Err(e) = self.session.save_ui_state() {
            tracing::warn!(error = %e, "could not save UI state");
        }
        match open_session(&root) {
            Ok((session, message)) => {
                self.session = session;
                self.status_message = Some(message.unwrap_or_else(|| {
                    if now_authenticated {
                        "logged in".to_string()
                    } else {
                        "logged out".to_string()
                    }
                }));
                self.clamp_cursor();
            }
            Err(e) => {
                tracing::error!(error = %e, "could not reopen notebook");
                self.status_message = Some(e.to_string());
            }
        }
    }

    pub fn save_state(&self) {
        if let Err(e) = self.session.save_ui_state() {
            tracing::warn!(error = %e, "could not save UI state");
        }
    }
}

/// Open the session with the lock held, returning the handoff message
fn open_session(root: &Path) -> Result<(Session, Option<String>), Box<dyn std::error::Error>> {
    let _lock = NotebookLock::acquire_default(&root.join(NOTEBOOK_DIR))?;
    let (session, outcome) = Session::open(root)?;
    Ok((session, outcome.as_ref().and_then(format_handoff)))
}

/// Run the TUI application on the notebook under `root`
pub fn run(root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (session, message) = open_session(root)?;
    let mut app = App::new(session);
    app.status_message = message;

    let watcher = match NotebookWatcher::start(&root.join(NOTEBOOK_DIR)) {
        Ok(w) => Some(w),
        Err(e) => {
            tracing::warn!(error = %e, "file watcher unavailable");
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    app.save_state();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&NotebookWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut save_counter = 0u32;
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
            // Debounced state save: every ~5 key presses
            save_counter += 1;
            if save_counter >= 5 {
                app.save_state();
                save_counter = 0;
            }
        }

        if let Some(watcher) = watcher {
            for event in watcher.poll() {
                app.handle_file_event(event);
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
