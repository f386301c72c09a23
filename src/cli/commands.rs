use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};

use crate::model::note::{NoteId, NotePatch, parse_reminder};

#[derive(Parser)]
#[command(name = "ql", about = concat!("quill v", env!("CARGO_PKG_VERSION"), " - notes in your terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use the notebook in (or above) this directory
    #[arg(short = 'C', long = "notebook-dir", global = true)]
    pub notebook_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a notebook (quill/) in the current directory
    Init(InitArgs),
    /// List notes, pinned first
    List(ListArgs),
    /// Show a note and make it the current note
    Show(IdArg),
    /// Create a note
    New(NewArgs),
    /// Change fields of a note
    Edit(EditArgs),
    /// Pin a note to the top of the list
    Pin(IdArg),
    /// Unpin a note
    Unpin(IdArg),
    /// Delete notes
    Rm(RmArgs),
    /// Find notes whose title or content contains a term
    Search(SearchArgs),
    /// Tick or untick notes for bulk actions (no IDs: show the selection)
    Select(SelectArgs),
    /// Act on the selected notes
    Bulk(BulkCmd),
    /// Write notes to text files
    Export(ExportArgs),
    /// Keep notes on a server from now on (guest notes are uploaded)
    Login(LoginArgs),
    /// Forget the server session and go back to guest mode
    Logout,
    /// Upload guest notes to the server now
    Sync,
    /// Show notebook mode, note count and selection
    Status,
}

// ---------------------------------------------------------------------------
// Args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Notebook name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Rewrite quill.toml even if the notebook exists (notes are kept)
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct IdArg {
    /// Note ID
    pub id: NoteId,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only notes in this category
    #[arg(long)]
    pub category: Option<String>,
    /// Only pinned notes
    #[arg(long)]
    pub pinned: bool,
}

#[derive(Args)]
pub struct NewArgs {
    /// Note title
    pub title: Option<String>,
    /// Note body
    #[arg(short = 'm', long)]
    pub content: Option<String>,
    /// Category (default from quill.toml)
    #[arg(long)]
    pub category: Option<String>,
    /// Reminder, e.g. 2025-06-01T09:30
    #[arg(long, value_parser = parse_reminder_arg)]
    pub reminder: Option<NaiveDateTime>,
    /// Pin the new note
    #[arg(long)]
    pub pin: bool,
}

/// Field changes shared by `edit` and `bulk edit`
#[derive(Args)]
pub struct EditFields {
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New body
    #[arg(short = 'm', long)]
    pub content: Option<String>,
    /// New category
    #[arg(long)]
    pub category: Option<String>,
    /// New reminder, e.g. 2025-06-01T09:30
    #[arg(long, value_parser = parse_reminder_arg, conflicts_with = "clear_reminder")]
    pub reminder: Option<NaiveDateTime>,
    /// Remove the reminder
    #[arg(long)]
    pub clear_reminder: bool,
    /// Pin the note
    #[arg(long, conflicts_with = "unpin")]
    pub pin: bool,
    /// Unpin the note
    #[arg(long)]
    pub unpin: bool,
}

impl EditFields {
    pub fn to_patch(&self) -> NotePatch {
        NotePatch {
            title: self.title.clone(),
            content: self.content.clone(),
            category: self.category.clone(),
            reminder_date: if self.clear_reminder {
                Some(None)
            } else {
                self.reminder.map(Some)
            },
            is_pinned: match (self.pin, self.unpin) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
        }
    }
}

#[derive(Args)]
pub struct EditArgs {
    /// Note ID
    pub id: NoteId,
    #[command(flatten)]
    pub fields: EditFields,
}

#[derive(Args)]
pub struct RmArgs {
    /// Note IDs to delete
    #[arg(required = true)]
    pub ids: Vec<NoteId>,
    /// Skip confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Text to look for (case-insensitive)
    pub term: String,
    /// Ask the server instead of filtering locally (authenticated mode)
    #[arg(long)]
    pub remote: bool,
}

#[derive(Args)]
pub struct SelectArgs {
    /// Note IDs to toggle
    pub ids: Vec<NoteId>,
    /// Clear the selection
    #[arg(long, conflicts_with = "ids")]
    pub clear: bool,
}

#[derive(Args)]
pub struct BulkCmd {
    #[command(subcommand)]
    pub action: BulkAction,
}

#[derive(Subcommand)]
pub enum BulkAction {
    /// Delete every selected note
    Delete(BulkDeleteArgs),
    /// Edit the selected note (exactly one must be selected)
    Edit(EditFields),
    /// Export every selected note
    Export(DirArg),
}

#[derive(Args)]
pub struct BulkDeleteArgs {
    /// Skip confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args)]
pub struct DirArg {
    /// Directory to write the files into
    #[arg(long, default_value = ".")]
    pub dir: String,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Note IDs to export
    #[arg(required = true)]
    pub ids: Vec<NoteId>,
    #[command(flatten)]
    pub target: DirArg,
}

#[derive(Args)]
pub struct LoginArgs {
    /// Server base URL, e.g. http://127.0.0.1:5000
    #[arg(long)]
    pub server: String,
    /// Session cookie copied from a logged-in browser (`session=...` or the bare value)
    #[arg(long)]
    pub session: String,
}

fn parse_reminder_arg(s: &str) -> Result<NaiveDateTime, String> {
    parse_reminder(s).ok_or_else(|| format!("invalid reminder '{}' (expected YYYY-MM-DDTHH:MM)", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_new_with_flags() {
        let cli = Cli::try_parse_from([
            "ql", "new", "Title", "-m", "Body", "--reminder", "2025-01-02T03:04", "--pin",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::New(args)) => {
                assert_eq!(args.title.as_deref(), Some("Title"));
                assert_eq!(args.content.as_deref(), Some("Body"));
                assert!(args.reminder.is_some());
                assert!(args.pin);
            }
            _ => panic!("expected new"),
        }
    }

    #[test]
    fn rejects_bad_reminder_and_id() {
        assert!(Cli::try_parse_from(["ql", "new", "t", "--reminder", "soon"]).is_err());
        assert!(Cli::try_parse_from(["ql", "show", "abc"]).is_err());
    }

    #[test]
    fn edit_fields_to_patch() {
        let cli = Cli::try_parse_from(["ql", "edit", "5", "--unpin", "--clear-reminder"]).unwrap();
        let Some(Commands::Edit(args)) = cli.command else {
            panic!("expected edit");
        };
        let patch = args.fields.to_patch();
        assert_eq!(patch.is_pinned, Some(false));
        assert_eq!(patch.reminder_date, Some(None));
        assert_eq!(patch.title, None);
    }

    #[test]
    fn pin_and_unpin_conflict() {
        assert!(Cli::try_parse_from(["ql", "edit", "5", "--pin", "--unpin"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ql", "list", "--json", "-C", "/tmp"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.notebook_dir.as_deref(), Some("/tmp"));
    }
}
