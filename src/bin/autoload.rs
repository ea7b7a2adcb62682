//! CLI wrapper for the unit script runtime with autoloading.
//!
//! Usage:
//!   autoload <file.unit>                  # Execute a unit script
//!   autoload -e "use Acme::Gear"          # Evaluate a snippet
//!   autoload                              # Start REPL (interactive mode)
//!   autoload --workspace path/to.toml ... # Use another workspace manifest

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use autoload::loader::{ConfigError, Resolver, WorkspaceConfig};
use autoload::runner::ds::scope::Symbol;
use autoload::runner::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "autoload", version, about = "Run unit scripts with lazy symbol resolution")]
struct Cli {
    /// Workspace manifest naming the application and its plugins
    #[arg(short, long, default_value = "autoload.toml")]
    workspace: PathBuf,

    /// Evaluate a snippet instead of a file
    #[arg(short, long, value_name = "CODE", conflicts_with = "file")]
    eval: Option<String>,

    /// Script to execute; starts a REPL when omitted
    file: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = activate(&cli.workspace) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let mut runtime = Runtime::new();
    let result = match (&cli.eval, &cli.file) {
        (Some(code), _) => runtime.eval_str(code),
        (None, Some(file)) => runtime.run_file(file),
        (None, None) => {
            run_repl(&mut runtime);
            return;
        }
    };

    match result {
        Ok(value) => print_value(value.as_ref()),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Build the resolver from the manifest and install it globally. A missing
/// manifest leaves autoloading off.
fn activate(manifest: &Path) -> Result<(), ConfigError> {
    if !manifest.is_file() {
        warn!(manifest = %manifest.display(), "workspace manifest not found, autoloading disabled");
        return Ok(());
    }

    let config = WorkspaceConfig::load(manifest)?;
    let layout = config.layout().clone();
    let base_dir = match manifest.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let workspace = config.into_workspace(&base_dir)?;
    info!(
        app = workspace.app().map(|c| c.namespace()),
        plugins = workspace.plugins().len(),
        "workspace loaded"
    );
    autoload::enable(Arc::new(Resolver::with_layout(Arc::new(workspace), layout)));
    Ok(())
}

fn print_value(value: Option<&Symbol>) {
    if let Some(symbol) = value {
        match &symbol.origin {
            Some(file) => println!("{} ({})", symbol.name, file.display()),
            None => println!("{}", symbol.name),
        }
    }
}

/// Collects REPL lines until every `{` has been closed.
#[derive(Debug, Default)]
struct ReplBuffer {
    text: String,
    depth: i64,
}

impl ReplBuffer {
    /// Add a line. Returns the buffered input once it is complete.
    fn push(&mut self, line: &str) -> Option<String> {
        self.depth += brace_delta(line);
        self.text.push_str(line);
        self.text.push('\n');
        if self.depth > 0 {
            return None;
        }
        self.depth = 0;
        Some(std::mem::take(&mut self.text))
    }

    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Net change in brace nesting for one line, ignoring strings and comments.
fn brace_delta(line: &str) -> i64 {
    let mut delta = 0;
    let mut in_string = false;
    for c in line.chars() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => break,
            '{' if !in_string => delta += 1,
            '}' if !in_string => delta -= 1,
            _ => {}
        }
    }
    delta
}

fn run_repl(runtime: &mut Runtime) {
    println!("autoload v{}", env!("CARGO_PKG_VERSION"));
    println!("Type unit script statements and press Enter. Type .exit to quit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut buffer = ReplBuffer::default();

    loop {
        print!("{}", if buffer.is_empty() { "> " } else { "... " });
        if stdout.flush().is_err() {
            break;
        }

        let mut input = String::new();
        match stdin.read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }

        let input = input.trim();
        if buffer.is_empty() {
            if input == ".exit" || input == ".quit" {
                break;
            }
            if input.is_empty() {
                continue;
            }
        }

        let code = match buffer.push(input) {
            Some(code) => code,
            None => continue,
        };
        match runtime.eval_str(&code) {
            Ok(value) => print_value(value.as_ref()),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    println!("Goodbye!");
}
