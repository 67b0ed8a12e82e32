use crate::date::When;
use crate::error::{Result, TkError};
use crate::task::Task;
use regex::Regex;
use std::sync::LazyLock;

static COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<word>\S+)(?P<args>.*)$").unwrap()
});

static INDEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<index>[0-9]+)$").unwrap()
});

static DEADLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<description>[^/]*)/by(?P<due>.*)$").unwrap()
});

static EVENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<description>[^/]*)/from(?P<start>.*?)/to(?P<end>.*)$").unwrap()
});

const TODO_USAGE: &str = "Format: todo DESCRIPTION";
const DEADLINE_USAGE: &str = "Format: deadline DESCRIPTION /by DATE";
const EVENT_USAGE: &str = "Format: event DESCRIPTION /from DATE /to DATE";

/// A fully validated command, ready to be applied to a task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Add(Task),
    Mark(usize),
    Delete(usize),
    Find(String),
    Upcoming,
    Bye,
}

impl Command {
    /// Whether applying this command changes the task list.
    pub fn mutates(&self) -> bool {
        matches!(self, Command::Add(_) | Command::Mark(_) | Command::Delete(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::List => "list",
            Command::Add(task) => match task.type_tag() {
                'D' => "deadline",
                'E' => "event",
                _ => "todo",
            },
            Command::Mark(_) => "mark",
            Command::Delete(_) => "delete",
            Command::Find(_) => "find",
            Command::Upcoming => "upcoming",
            Command::Bye => "bye",
        }
    }
}

/// Split a raw line into a lowercased command word and its trimmed arguments.
pub fn classify(line: &str) -> Result<(String, String)> {
    let caps = COMMAND_RE.captures(line.trim()).ok_or_else(|| {
        TkError::MalformedCommand("Invalid command format. Type a command such as `list`.".to_string())
    })?;
    Ok((caps["word"].to_lowercase(), caps["args"].trim().to_string()))
}

/// True when the line is the `bye` command, whatever its arguments.
pub fn is_exit(line: &str) -> bool {
    matches!(classify(line), Ok((word, _)) if word == "bye")
}

pub fn parse_command(line: &str) -> Result<Command> {
    let (word, args) = classify(line)?;
    match word.as_str() {
        "list" => Ok(Command::List),
        "mark" => parse_index(&args, "mark").map(Command::Mark),
        "delete" => parse_index(&args, "delete").map(Command::Delete),
        "todo" => parse_todo(&args),
        "deadline" => parse_deadline(&args),
        "event" => parse_event(&args),
        "find" => parse_find(&args),
        "upcoming" => parse_upcoming(&args),
        "bye" => Ok(Command::Bye),
        _ => Err(TkError::UnknownCommand(word)),
    }
}

fn parse_index(args: &str, command: &str) -> Result<usize> {
    let caps = INDEX_RE.captures(args).ok_or_else(|| {
        TkError::InvalidIndex(format!(
            "Task index must be a number. Format: {} INDEX",
            command
        ))
    })?;
    let digits = &caps["index"];
    digits.parse().map_err(|_| {
        TkError::IndexOutOfRange(format!(
            "Invalid task number: {}. The number is too large.",
            digits
        ))
    })
}

fn parse_todo(args: &str) -> Result<Command> {
    if args.is_empty() {
        return Err(TkError::EmptyDescription(format!(
            "Description cannot be empty. {}",
            TODO_USAGE
        )));
    }
    Ok(Command::Add(Task::todo(args)?))
}

fn parse_deadline(args: &str) -> Result<Command> {
    if args.is_empty() || args.starts_with("/by") {
        return Err(missing_description(DEADLINE_USAGE));
    }
    let caps = DEADLINE_RE.captures(args).ok_or_else(|| {
        TkError::MalformedCommand(format!("Invalid deadline command. {}", DEADLINE_USAGE))
    })?;

    let description = caps["description"].trim();
    if description.is_empty() {
        return Err(missing_description(DEADLINE_USAGE));
    }
    let due = date_token(&caps["due"], "/by", DEADLINE_USAGE)?;
    Ok(Command::Add(Task::deadline(description, due)?))
}

fn parse_event(args: &str) -> Result<Command> {
    if args.is_empty() || args.starts_with("/from") {
        return Err(missing_description(EVENT_USAGE));
    }
    let caps = EVENT_RE.captures(args).ok_or_else(|| {
        TkError::MalformedCommand(format!("Invalid event command. {}", EVENT_USAGE))
    })?;

    let description = caps["description"].trim();
    if description.is_empty() {
        return Err(missing_description(EVENT_USAGE));
    }
    let start = date_token(&caps["start"], "/from", EVENT_USAGE)?;
    let end = date_token(&caps["end"], "/to", EVENT_USAGE)?;
    check_event_order(start, end)?;
    Ok(Command::Add(Task::event(description, start, end)?))
}

fn parse_find(args: &str) -> Result<Command> {
    if args.is_empty() {
        return Err(TkError::EmptyKeyword);
    }
    Ok(Command::Find(args.to_string()))
}

fn parse_upcoming(args: &str) -> Result<Command> {
    if !args.is_empty() {
        return Err(TkError::MalformedCommand(
            "Invalid upcoming command. Format: upcoming".to_string(),
        ));
    }
    Ok(Command::Upcoming)
}

fn missing_description(usage: &str) -> TkError {
    TkError::EmptyDescription(format!("Missing task description. {}", usage))
}

fn date_token(raw: &str, marker: &str, usage: &str) -> Result<When> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TkError::MalformedCommand(format!(
            "Missing date after {}. {}",
            marker, usage
        )));
    }
    When::parse_input(raw)
}

/// With times on both ends the event must end strictly after it starts;
/// otherwise only the calendar dates are compared.
fn check_event_order(start: When, end: When) -> Result<()> {
    let ordered = match (start.time(), end.time()) {
        (Some(_), Some(_)) => end > start,
        _ => end.date() >= start.date(),
    };
    if ordered {
        Ok(())
    } else {
        Err(TkError::MalformedCommand(format!(
            "Event end ({}) must be after its start ({}).",
            end, start
        )))
    }
}
