use crate::error::{Result, TkError};
use crate::task::Task;
use chrono::NaiveDate;

pub const EMPTY_LIST: &str = "No tasks in your list yet!";
pub const NO_MATCHES: &str = "No matching tasks found in current list.";
pub const NO_UPCOMING: &str = "No upcoming tasks!";

/// Ordered task collection addressed by 1-based position.
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn add_task(&mut self, task: Task) -> String {
        let response = format!(
            "Got it. I've added this task:\n  {}\nNow you have {} tasks in the list.",
            task,
            self.tasks.len() + 1
        );
        self.tasks.push(task);
        response
    }

    /// Marking a task that is already done succeeds and changes nothing.
    pub fn mark_task_done(&mut self, index: usize) -> Result<String> {
        let pos = self.validate_index(index)?;
        let task = &mut self.tasks[pos];
        task.mark_done();
        Ok(format!("Nice! I've marked this task as done:\n  {}", task))
    }

    pub fn delete_task(&mut self, index: usize) -> Result<String> {
        let pos = self.validate_index(index)?;
        let removed = self.tasks.remove(pos);
        Ok(format!(
            "Noted. I've removed this task:\n  {}\nNow you have {} tasks in the list.",
            removed,
            self.tasks.len()
        ))
    }

    pub fn list_tasks(&self) -> String {
        if self.tasks.is_empty() {
            return EMPTY_LIST.to_string();
        }
        render("Here are the tasks in your list:", self.tasks.iter())
    }

    /// Case-insensitive substring search over descriptions only.
    pub fn matching(&self, keyword: &str) -> Vec<&Task> {
        let needle = keyword.trim().to_lowercase();
        self.tasks
            .iter()
            .filter(|t| t.description().to_lowercase().contains(&needle))
            .collect()
    }

    pub fn find_tasks(&self, keyword: &str) -> String {
        let found = self.matching(keyword);
        if found.is_empty() {
            return NO_MATCHES.to_string();
        }
        render("Here are the matching tasks in your list:", found.into_iter())
    }

    /// Not-done deadlines and events dated `today` or later, earliest first.
    /// Tasks sharing a date keep their list order.
    pub fn upcoming(&self, today: NaiveDate) -> Vec<&Task> {
        let mut found: Vec<(NaiveDate, &Task)> = self
            .tasks
            .iter()
            .filter(|t| !t.is_done())
            .filter_map(|t| t.primary_date().map(|date| (date, t)))
            .filter(|(date, _)| *date >= today)
            .collect();
        found.sort_by_key(|(date, _)| *date);
        found.into_iter().map(|(_, t)| t).collect()
    }

    pub fn list_upcoming_tasks_on(&self, today: NaiveDate) -> String {
        let found = self.upcoming(today);
        if found.is_empty() {
            return NO_UPCOMING.to_string();
        }
        render("Here are your upcoming tasks:", found.into_iter())
    }

    pub fn list_upcoming_tasks(&self) -> String {
        self.list_upcoming_tasks_on(chrono::Local::now().date_naive())
    }

    fn validate_index(&self, index: usize) -> Result<usize> {
        if self.tasks.is_empty() {
            return Err(TkError::IndexOutOfRange("No tasks in list!".to_string()));
        }
        if index < 1 || index > self.tasks.len() {
            return Err(TkError::IndexOutOfRange(format!(
                "Invalid task number: {}. Please provide a number between 1 and {}.",
                index,
                self.tasks.len()
            )));
        }
        Ok(index - 1)
    }
}

fn render<'a>(header: &str, tasks: impl Iterator<Item = &'a Task>) -> String {
    let mut out = String::from(header);
    for (i, task) in tasks.enumerate() {
        out.push_str(&format!("\n{}.{}", i + 1, task));
    }
    out
}
