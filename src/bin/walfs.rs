//! walfs shell
//!
//! Reads commands from stdin and runs them against the journaled file system.

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use walfs::shell::{self, Flow};
use walfs::{logging, FileSystem, FsConfig};

#[derive(Debug, Parser)]
#[command(name = "walfs", about = "Journaled in-memory file system shell")]
struct Cli {
    /// Snapshot file (default: $WALFS_SNAPSHOT or fs.data)
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Journal file (default: $WALFS_JOURNAL or journal.log)
    #[arg(long)]
    journal: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(&cli.log_level) {
        eprintln!("error: {}", e);
        process::exit(2);
    }

    let mut config = FsConfig::from_env();
    if let Some(path) = cli.snapshot {
        config = config.with_snapshot_path(path);
    }
    if let Some(path) = cli.journal {
        config = config.with_journal_path(path);
    }

    let fs = match FileSystem::open(&config) {
        Ok(fs) => fs,
        Err(e) => {
            eprintln!("error opening file system: {}", e);
            process::exit(1);
        }
    };

    println!("journaled file system simulator, type `help` for commands");
    if let Err(e) = run(&fs) {
        eprintln!("error: {}", e);
    }

    if let Err(e) = fs.shutdown() {
        eprintln!("error saving state on exit: {}", e);
        process::exit(1);
    }
}

fn run(fs: &FileSystem) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        write!(stdout, "fs> ")?;
        stdout.flush()?;

        let Some(line) = lines.next() else {
            writeln!(stdout)?;
            return Ok(());
        };
        let line = line?;

        let command = match shell::parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(stdout, "error: {}", e)?;
                continue;
            }
        };

        match shell::execute(fs, &command, &mut stdout) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => return Ok(()),
            Err(e) => writeln!(stdout, "error: {}", e)?,
        }
    }
}
