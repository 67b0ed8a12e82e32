use crate::config::atomic_write;
use crate::date::When;
use crate::error::{Result, TkError};
use crate::task::{Task, TaskKind};
use log::{debug, info};
use std::path::{Path, PathBuf};

pub const FIELD_SEPARATOR: &str = " | ";

/// Encode one task as a storage record, without the trailing newline.
///
/// `TYPE | DONE | DESCRIPTION [| DATE1 [| DATE2]]`, dates in canonical display form.
pub fn encode(task: &Task) -> String {
    let mut fields = vec![
        task.type_tag().to_string(),
        if task.is_done() { "1" } else { "0" }.to_string(),
        task.description().to_string(),
    ];
    match task.kind() {
        TaskKind::Todo => {}
        TaskKind::Deadline { due } => fields.push(due.to_string()),
        TaskKind::Event { start, end } => {
            fields.push(start.to_string());
            fields.push(end.to_string());
        }
    }
    fields.join(FIELD_SEPARATOR)
}

/// Decode one storage record. Dates are read back with the canonical parser.
pub fn decode(line: &str) -> Result<Task> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(FIELD_SEPARATOR).collect();
    if fields.len() < 3 {
        return Err(TkError::MalformedRecord(format!(
            "expected at least 3 fields in '{}'",
            line
        )));
    }

    let done = match fields[1] {
        "1" => true,
        "0" => false,
        other => {
            return Err(TkError::MalformedRecord(format!(
                "done flag must be 1 or 0, got '{}'",
                other
            )))
        }
    };
    let description = fields[2];
    if description.trim().is_empty() {
        return Err(TkError::MalformedRecord(format!(
            "empty description in '{}'",
            line
        )));
    }

    let mut task = match fields[0] {
        "T" => Task::todo(description)?,
        "D" => {
            require_fields(&fields, 4, line)?;
            Task::deadline(description, When::parse_canonical(fields[3])?)?
        }
        "E" => {
            require_fields(&fields, 5, line)?;
            Task::event(
                description,
                When::parse_canonical(fields[3])?,
                When::parse_canonical(fields[4])?,
            )?
        }
        other => return Err(TkError::UnknownTaskType(other.to_string())),
    };

    if done {
        task.mark_done();
    }
    Ok(task)
}

fn require_fields(fields: &[&str], needed: usize, line: &str) -> Result<()> {
    if fields.len() < needed {
        return Err(TkError::MalformedRecord(format!(
            "expected {} fields in '{}'",
            needed, line
        )));
    }
    Ok(())
}

/// Flat-file task store. Every save rewrites the whole file.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every record. A missing file (and its directory) is created empty.
    /// The first bad record fails the whole load.
    pub fn load(&self) -> Result<Vec<Task>> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }
        if !self.path.exists() {
            std::fs::write(&self.path, "")?;
            info!(
                "event=storage_load module=storage status=created path={}",
                self.path.display()
            );
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let mut tasks = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let task = decode(line).map_err(|e| at_line(e, i + 1))?;
            tasks.push(task);
        }

        info!(
            "event=storage_load module=storage status=ok records={}",
            tasks.len()
        );
        Ok(tasks)
    }

    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let mut content = String::new();
        for task in tasks {
            content.push_str(&encode(task));
            content.push('\n');
        }
        atomic_write(&self.path, content.as_bytes())?;
        debug!(
            "event=storage_save module=storage status=ok records={}",
            tasks.len()
        );
        Ok(())
    }
}

fn at_line(err: TkError, line_no: usize) -> TkError {
    match err {
        TkError::MalformedRecord(msg) => TkError::MalformedRecord(format!("line {}: {}", line_no, msg)),
        TkError::UnknownTaskType(tag) => TkError::UnknownTaskType(format!("'{}' on line {}", tag, line_no)),
        TkError::DateFormat(msg) => TkError::DateFormat(format!("{} on line {}", msg, line_no)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn when(raw: &str) -> When {
        When::parse_input(raw).unwrap()
    }

    #[test]
    fn encodes_each_kind() {
        let mut todo = Task::todo("read book").unwrap();
        todo.mark_done();
        assert_eq!(encode(&todo), "T | 1 | read book");

        let deadline = Task::deadline("pay rent", when("2024-03-05")).unwrap();
        assert_eq!(encode(&deadline), "D | 0 | pay rent | Mar 05 2024");

        let event = Task::event("trip", when("2024-06-01 0930"), when("2024-06-03")).unwrap();
        assert_eq!(
            encode(&event),
            "E | 0 | trip | Jun 01 2024, 09:30 | Jun 03 2024"
        );
    }

    #[test]
    fn decodes_done_deadline() {
        let task = decode("D | 1 | pay rent | Mar 05 2024").unwrap();
        assert!(task.is_done());
        assert_eq!(task.to_string(), "[D][X] pay rent (by: Mar 05 2024)");
    }

    #[test]
    fn round_trip_preserves_rendering() {
        let mut done_event = Task::event("trip", when("1/6/2024 0800"), when("2024-06-03 1700")).unwrap();
        done_event.mark_done();
        let tasks = vec![
            Task::todo("read book").unwrap(),
            Task::deadline("submit report", when("2024-01-31 2359")).unwrap(),
            done_event,
        ];
        for task in tasks {
            let back = decode(&encode(&task)).unwrap();
            assert_eq!(back.to_string(), task.to_string());
            assert_eq!(back.type_tag(), task.type_tag());
            assert_eq!(back, task);
        }
    }

    #[test]
    fn rejects_short_records() {
        assert!(matches!(decode("T | 0"), Err(TkError::MalformedRecord(_))));
        assert!(matches!(decode("T | 0 | "), Err(TkError::MalformedRecord(_))));
        assert!(matches!(
            decode("D | 1 |    | Mar 05 2024"),
            Err(TkError::MalformedRecord(_))
        ));
        assert!(matches!(decode("D | 0 | pay rent"), Err(TkError::MalformedRecord(_))));
        assert!(matches!(
            decode("E | 0 | trip | Jun 01 2024"),
            Err(TkError::MalformedRecord(_))
        ));
    }

    #[test]
    fn rejects_bad_flag_type_and_date() {
        assert!(matches!(decode("T | yes | x"), Err(TkError::MalformedRecord(_))));
        assert!(matches!(decode("X | 0 | x"), Err(TkError::UnknownTaskType(_))));
        assert!(matches!(
            decode("D | 0 | x | 2024-03-05"),
            Err(TkError::DateFormat(_))
        ));
    }

    #[test]
    fn load_creates_missing_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tasks.txt");
        let storage = Storage::new(&path);
        assert!(storage.load().unwrap().is_empty());
        assert!(path.exists());
    }

    #[test]
    fn load_skips_blank_lines_and_reports_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.txt");
        std::fs::write(&path, "T | 0 | a\n\n   \nD | 1 | b | Mar 05 2024\n").unwrap();
        let tasks = Storage::new(&path).load().unwrap();
        assert_eq!(tasks.len(), 2);

        std::fs::write(&path, "T | 0 | a\nQ | 0 | b\n").unwrap();
        match Storage::new(&path).load() {
            Err(TkError::UnknownTaskType(msg)) => assert!(msg.contains("line 2")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn save_rewrites_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.txt");
        let storage = Storage::new(&path);
        storage
            .save(&[Task::todo("a").unwrap(), Task::todo("b").unwrap()])
            .unwrap();
        storage.save(&[Task::todo("c").unwrap()]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "T | 0 | c\n");
    }
}
