use clap::Parser;
use quill::cli::commands::{Cli, Commands};
use quill::cli::handlers;
use quill::io::notebook_io::NOTEBOOK_DIR;
use quill::logging::{self, LOG_FILE, LogTarget};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand → launch TUI; logs go to a file so they don't tear the screen
            handlers::notebook_root(cli.notebook_dir.as_deref()).and_then(|root| {
                logging::init(LogTarget::File(root.join(NOTEBOOK_DIR).join(LOG_FILE)));
                quill::tui::run(&root)
            })
        }
        Some(Commands::Init(args)) => {
            // Init is handled before notebook discovery
            logging::init(LogTarget::Stderr);
            handlers::cmd_init(args)
        }
        Some(_) => {
            logging::init(LogTarget::Stderr);
            handlers::dispatch(cli)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
