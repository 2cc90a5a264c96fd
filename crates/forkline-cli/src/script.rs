//! Line-oriented replay scripts.
//!
//! One operation per line. Blank lines and lines starting with `#` are
//! skipped. Names, payloads and descriptions take the rest of the line, with
//! runs of whitespace collapsed to single spaces.
//!
//! ```text
//! push type hello world
//! push bold <b>hello</b> -- made the greeting bold
//! undo
//! snapshot before experiment
//! branch experiment
//! switch b0
//! jump e2
//! rename e3 first draft
//! delete b1
//! clear
//! ```

use forkline_history::HistoryOp;

use crate::error::{CliError, Result};

/// One parsed operation and the 1-based line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub line: usize,
    pub op: HistoryOp<String>,
}

/// Parse a whole script. Fails on the first malformed line.
pub fn parse(source: &str) -> Result<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let op = parse_line(text).map_err(|message| CliError::script(line, message))?;
        lines.push(ScriptLine { line, op });
    }
    Ok(lines)
}

fn parse_line(text: &str) -> std::result::Result<HistoryOp<String>, String> {
    let mut words = text.split_whitespace();
    let Some(command) = words.next() else {
        return Err("empty line".to_owned());
    };
    let args: Vec<&str> = words.collect();

    match command {
        "push" => parse_push(&args),
        "undo" => no_args(command, &args, HistoryOp::Undo),
        "redo" => no_args(command, &args, HistoryOp::Redo),
        "clear" => no_args(command, &args, HistoryOp::ClearHistory),
        "jump" => {
            let entry = single_id(command, &args)?;
            Ok(HistoryOp::JumpTo { entry })
        }
        "snapshot" => Ok(HistoryOp::CreateSnapshot {
            name: rest(command, &args)?,
        }),
        "rename" => {
            let (id, name) = args
                .split_first()
                .ok_or_else(|| "`rename` needs an entry id and a name".to_owned())?;
            Ok(HistoryOp::RenameSnapshot {
                entry: parse_id(id)?,
                name: name.join(" "),
            })
        }
        "branch" => Ok(HistoryOp::CreateBranch {
            name: rest(command, &args)?,
        }),
        "switch" => {
            let branch = single_id(command, &args)?;
            Ok(HistoryOp::SwitchBranch { branch })
        }
        "delete" => {
            let branch = single_id(command, &args)?;
            Ok(HistoryOp::DeleteBranch { branch })
        }
        other => Err(format!("unknown command `{other}`")),
    }
}

fn parse_push(args: &[&str]) -> std::result::Result<HistoryOp<String>, String> {
    let (action, tail) = args
        .split_first()
        .ok_or_else(|| "`push` needs an action".to_owned())?;
    let (data, description) = match tail.iter().position(|w| *w == "--") {
        Some(split) => {
            let description = tail[split + 1..].join(" ");
            (tail[..split].join(" "), Some(description))
        }
        None => (tail.join(" "), None),
    };
    Ok(HistoryOp::Push {
        action: (*action).to_owned(),
        data,
        description,
    })
}

fn no_args(
    command: &str,
    args: &[&str],
    op: HistoryOp<String>,
) -> std::result::Result<HistoryOp<String>, String> {
    if args.is_empty() {
        Ok(op)
    } else {
        Err(format!("`{command}` takes no arguments"))
    }
}

fn rest(command: &str, args: &[&str]) -> std::result::Result<String, String> {
    if args.is_empty() {
        return Err(format!("`{command}` needs a name"));
    }
    Ok(args.join(" "))
}

fn single_id<I: std::str::FromStr>(command: &str, args: &[&str]) -> std::result::Result<I, String> {
    match args {
        [id] => parse_id(id),
        [] => Err(format!("`{command}` needs an id")),
        _ => Err(format!("`{command}` takes exactly one id")),
    }
}

fn parse_id<I: std::str::FromStr>(word: &str) -> std::result::Result<I, String> {
    word.parse().map_err(|_| format!("invalid id `{word}`"))
}
