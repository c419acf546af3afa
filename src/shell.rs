//! Line-oriented command front end.
//!
//! Parses one input line into a [`Command`] and runs it against any
//! [`FsBackend`]. Paths are normalised here so the core only ever sees
//! absolute paths.

use std::io::Write;

use crate::backend::FsBackend;
use crate::error::{FsError, FsResult};
use crate::types::SEPARATOR;

pub const HELP: &str = "\
commands:
  mkdir <path>
  rmdir <path>
  touch <path>
  rm <path>
  cp <src> <dest>
  mv <src> <dest>
  write <path> <content>
  cat <path>
  ls [path]
  journal show|clear
  persist
  help
  exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mkdir(String),
    Rmdir(String),
    Touch(String),
    Rm(String),
    Cp { src: String, dest: String },
    Mv { src: String, dest: String },
    Write { path: String, content: String },
    Cat(String),
    Ls(String),
    JournalShow,
    JournalClear,
    Persist,
    Help,
    Exit,
}

/// Whether the read loop keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Make `path` absolute and drop a trailing separator (root excepted).
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return SEPARATOR.to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Split on whitespace; double quotes group words and are dropped.
fn split_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}

/// Text after the first whitespace-delimited token, trimmed.
fn after_token(s: &str) -> &str {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(idx) => s[idx..].trim(),
        None => "",
    }
}

fn require<'a>(args: &'a [String], n: usize, usage: &str) -> FsResult<&'a [String]> {
    if args.len() < n {
        return Err(FsError::Argument(format!("usage: {}", usage)));
    }
    Ok(args)
}

fn parse_write(line: &str) -> FsResult<Command> {
    let rest = after_token(line);
    let path = rest.split_whitespace().next().unwrap_or_default();
    let mut content = after_token(rest);
    if content.len() >= 2 && content.starts_with('"') && content.ends_with('"') {
        content = &content[1..content.len() - 1];
    }
    if path.is_empty() || content.is_empty() {
        return Err(FsError::Argument("usage: write <path> <content>".into()));
    }
    Ok(Command::Write {
        path: normalize_path(path),
        content: content.to_string(),
    })
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> FsResult<Option<Command>> {
    let args = split_args(line.trim());
    let Some(name) = args.first() else {
        return Ok(None);
    };

    let path_arg = |usage: &str| -> FsResult<String> {
        Ok(normalize_path(&require(&args, 2, usage)?[1]))
    };
    let pair_args = |usage: &str| -> FsResult<(String, String)> {
        let args = require(&args, 3, usage)?;
        Ok((normalize_path(&args[1]), normalize_path(&args[2])))
    };

    let command = match name.to_lowercase().as_str() {
        "mkdir" => Command::Mkdir(path_arg("mkdir <path>")?),
        "rmdir" => Command::Rmdir(path_arg("rmdir <path>")?),
        "touch" => Command::Touch(path_arg("touch <path>")?),
        "rm" => Command::Rm(path_arg("rm <path>")?),
        "cat" => Command::Cat(path_arg("cat <path>")?),
        "ls" => Command::Ls(
            args.get(1)
                .map_or_else(|| SEPARATOR.to_string(), |p| normalize_path(p)),
        ),
        "cp" => {
            let (src, dest) = pair_args("cp <src> <dest>")?;
            Command::Cp { src, dest }
        }
        "mv" => {
            let (src, dest) = pair_args("mv <src> <dest>")?;
            Command::Mv { src, dest }
        }
        "write" => parse_write(line)?,
        "journal" => match args.get(1).map(|s| s.to_lowercase()).as_deref() {
            Some("show") => Command::JournalShow,
            Some("clear") => Command::JournalClear,
            _ => return Err(FsError::Argument("usage: journal show|clear".into())),
        },
        "persist" => Command::Persist,
        "help" => Command::Help,
        "exit" | "quit" => Command::Exit,
        other => {
            return Err(FsError::Argument(format!(
                "unknown command `{}`, try `help`",
                other
            )));
        }
    };
    Ok(Some(command))
}

/// Run `command` against `backend`, writing user-facing output to `out`.
pub fn execute<B, W>(backend: &B, command: &Command, out: &mut W) -> FsResult<Flow>
where
    B: FsBackend + ?Sized,
    W: Write,
{
    match command {
        Command::Mkdir(path) => {
            backend.create_directory(path)?;
            writeln!(out, "directory created: {}", path)?;
        }
        Command::Rmdir(path) => {
            backend.remove_directory(path)?;
            writeln!(out, "directory removed: {}", path)?;
        }
        Command::Touch(path) => {
            backend.create_file(path)?;
            writeln!(out, "file created: {}", path)?;
        }
        Command::Rm(path) => {
            backend.delete_file(path)?;
            writeln!(out, "file removed: {}", path)?;
        }
        Command::Cp { src, dest } => {
            backend.copy(src, dest)?;
            writeln!(out, "copied: {} -> {}", src, dest)?;
        }
        Command::Mv { src, dest } => {
            backend.rename(src, dest)?;
            writeln!(out, "moved: {} -> {}", src, dest)?;
        }
        Command::Write { path, content } => {
            backend.write(path, content)?;
            writeln!(out, "written: {}", path)?;
        }
        Command::Cat(path) => {
            writeln!(out, "{}", backend.read(path)?)?;
        }
        Command::Ls(path) => {
            let entries = backend.list(path)?;
            writeln!(out, "contents of {}:", path)?;
            for entry in entries {
                if entry.is_dir() {
                    writeln!(out, "[DIR]  {}", entry.name)?;
                } else {
                    writeln!(out, "[FILE] {} ({} bytes)", entry.name, entry.size)?;
                }
            }
        }
        Command::JournalShow => {
            let entries = backend.journal_entries()?;
            if entries.is_empty() {
                writeln!(out, "(journal empty)")?;
            }
            for entry in entries {
                writeln!(out, "{}", entry.to_line()?)?;
            }
        }
        Command::JournalClear => {
            backend.clear_journal()?;
            writeln!(out, "journal cleared")?;
        }
        Command::Persist => {
            backend.persist()?;
            writeln!(out, "state persisted")?;
        }
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Exit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}
