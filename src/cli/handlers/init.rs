use crate::cli::commands::InitArgs;
use crate::io::notebook_io::{self, NOTEBOOK_DIR};

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;

    // Check for parent notebook and warn
    if let Some(parent) = cwd.parent()
        && let Ok(parent_root) = notebook_io::discover_notebook(parent)
    {
        eprintln!(
            "Note: parent notebook found at {}/",
            parent_root.join(NOTEBOOK_DIR).display()
        );
        eprintln!("Creating new notebook in ./{}/", NOTEBOOK_DIR);
    }

    let name = args.name.unwrap_or_else(|| {
        cwd.file_name()
            .and_then(|n| n.to_str())
            .map(notebook_io::infer_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Notes".to_string())
    });

    let dir = notebook_io::init_notebook(&cwd, &name, args.force)?;
    println!("Initialized quill notebook: {}", name);
    println!("  {}", dir.display());
    Ok(())
}
