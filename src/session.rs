use crate::error::Result;
use crate::parser::{self, Command};
use crate::storage::Storage;
use crate::task_list::TaskList;
use chrono::NaiveDate;
use log::{info, warn};

pub const FAREWELL: &str = "Bye. Hope to see you again soon!";

/// One task list bound to its storage file.
///
/// Every accepted mutating command is persisted before the response is
/// returned. Callers sharing a storage file across processes must hold
/// [`crate::lock::FileLock`] around each `execute`.
pub struct Session {
    tasks: TaskList,
    storage: Storage,
    warning: Option<String>,
}

impl Session {
    /// Load from storage. A failed load leaves an empty list and a warning.
    pub fn open(storage: Storage) -> Self {
        match storage.load() {
            Ok(tasks) => Self {
                tasks: TaskList::from_tasks(tasks),
                storage,
                warning: None,
            },
            Err(e) => {
                warn!(
                    "event=storage_load module=session status=recovered path={} error={}",
                    storage.path().display(),
                    e
                );
                Self {
                    tasks: TaskList::new(),
                    storage,
                    warning: Some(format!(
                        "Error loading task file ({}). Starting with an empty task list.",
                        e
                    )),
                }
            }
        }
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// The load warning, if any. Returned once.
    pub fn take_warning(&mut self) -> Option<String> {
        self.warning.take()
    }

    /// Run one raw input line. Errors come back as response text.
    pub fn execute(&mut self, line: &str) -> String {
        self.try_execute(line)
            .unwrap_or_else(|e| format!("Error: {}", e))
    }

    pub fn try_execute(&mut self, line: &str) -> Result<String> {
        self.try_execute_on(line, chrono::Local::now().date_naive())
    }

    /// As [`Session::try_execute`], with an explicit date for `upcoming`.
    pub fn try_execute_on(&mut self, line: &str, today: NaiveDate) -> Result<String> {
        let command = match parser::parse_command(line) {
            Ok(command) => command,
            Err(e) => {
                info!("event=command module=session status=rejected error={}", e);
                return Err(e);
            }
        };
        let name = command.name();
        let mutates = command.mutates();

        let response = self.apply(command, today).inspect_err(|e| {
            info!(
                "event=command module=session status=rejected command={} error={}",
                name, e
            );
        })?;

        info!("event=command module=session status=ok command={}", name);
        if !mutates {
            return Ok(response);
        }

        match self.storage.save(self.tasks.tasks()) {
            Ok(()) => Ok(response),
            Err(e) => {
                warn!(
                    "event=storage_save module=session status=error command={} error={}",
                    name, e
                );
                Ok(format!("{}\nWarning: changes were not saved ({}).", response, e))
            }
        }
    }

    fn apply(&mut self, command: Command, today: NaiveDate) -> Result<String> {
        match command {
            Command::List => Ok(self.tasks.list_tasks()),
            Command::Add(task) => Ok(self.tasks.add_task(task)),
            Command::Mark(index) => self.tasks.mark_task_done(index),
            Command::Delete(index) => self.tasks.delete_task(index),
            Command::Find(keyword) => Ok(self.tasks.find_tasks(&keyword)),
            Command::Upcoming => Ok(self.tasks.list_upcoming_tasks_on(today)),
            Command::Bye => Ok(FAREWELL.to_string()),
        }
    }
}
