use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use rustyline::{DefaultEditor, error::ReadlineError};
use tracing::error;
use tracing_subscriber::EnvFilter;
use treedb::{
    executor::execute_statement,
    planner::{
        parser::{parse_meta_command, prepare_statement},
        types::MetaCommand,
    },
    storage::table::{Table, TableConfig},
    types::error::DatabaseError,
};

/// Single-table B+Tree database with a line-oriented shell.
#[derive(Parser, Debug)]
#[command(name = "treedb", version, about)]
struct Args {
    /// Database file, created if missing
    file: PathBuf,

    /// Cells per leaf before it splits
    #[arg(long)]
    leaf_max_cells: Option<u32>,

    /// Keys per internal node
    #[arg(long)]
    internal_max_cells: Option<u32>,

    /// Pages the file may grow to
    #[arg(long)]
    max_pages: Option<usize>,

    /// Log engine activity at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn table_config(&self) -> TableConfig {
        let mut config = TableConfig::default();
        if let Some(n) = self.leaf_max_cells {
            config = config.with_leaf_max_cells(n);
        }
        if let Some(n) = self.internal_max_cells {
            config = config.with_internal_max_cells(n);
        }
        if let Some(n) = self.max_pages {
            config = config.with_max_pages(n);
        }
        config
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("treedb=debug")
        } else {
            EnvFilter::new("treedb=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

enum Flow {
    Continue,
    Exit,
}

fn process_line(table: &mut Table, line: &str) -> Result<Flow, DatabaseError> {
    if line.starts_with('.') {
        match parse_meta_command(line) {
            Ok(MetaCommand::Exit) => return Ok(Flow::Exit),
            Ok(MetaCommand::Constants) => {
                println!("Constants:");
                println!("{}", table.constants());
            }
            Ok(MetaCommand::BTree) => {
                println!("Tree:");
                print!("{}", table.describe_tree()?);
            }
            Err(e) => println!("{}", e),
        }
        return Ok(Flow::Continue);
    }

    match prepare_statement(line) {
        Ok(statement) => match execute_statement(table, &statement) {
            Ok(result) => println!("{}", result),
            Err(e) if e.is_recoverable() => println!("Error: {}", e),
            Err(e) => return Err(e),
        },
        Err(e) => println!("{}", e),
    }
    Ok(Flow::Continue)
}

fn run(args: &Args) -> Result<(), DatabaseError> {
    let mut table = Table::open_with_config(&args.file, args.table_config())?;

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            error!("failed to start line editor: {}", e);
            return table.close();
        }
    };

    loop {
        match rl.readline("db > ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);
                match process_line(&mut table, line)? {
                    Flow::Continue => {}
                    Flow::Exit => break,
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                error!("readline error: {}", e);
                break;
            }
        }
    }

    table.close()
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
