use crate::task::Task;
use chrono::{Days, NaiveDateTime, NaiveTime};

/// When to remind about a dated task: `lead_days` before its primary date, at `hour`:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderPolicy {
    pub lead_days: i64,
    pub hour: u32,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            lead_days: 1,
            hour: 9,
        }
    }
}

/// Reminder moment for a not-done deadline or event. To-dos have none, and
/// neither does a task whose lead would fall outside the calendar.
pub fn reminder_time(task: &Task, policy: ReminderPolicy) -> Option<NaiveDateTime> {
    if task.is_done() {
        return None;
    }
    let lead = Days::new(u64::try_from(policy.lead_days).ok()?);
    let date = task.primary_date()?.checked_sub_days(lead)?;
    let at = NaiveTime::from_hms_opt(policy.hour, 0, 0)?;
    Some(date.and_time(at))
}

/// Tasks whose reminder moment has passed while their date is still ahead
/// (or today), paired with their 1-based list position.
pub fn due_reminders(
    tasks: &[Task],
    now: NaiveDateTime,
    policy: ReminderPolicy,
) -> Vec<(usize, &Task)> {
    tasks
        .iter()
        .enumerate()
        .filter_map(|(i, task)| {
            let remind_at = reminder_time(task, policy)?;
            let date = task.primary_date()?;
            (remind_at <= now && date >= now.date()).then_some((i + 1, task))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::When;
    use chrono::NaiveDate;

    fn when(raw: &str) -> When {
        When::parse_input(raw).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn day_before_at_nine_by_default() {
        let task = Task::deadline("pay rent", when("2024-03-05 1800")).unwrap();
        assert_eq!(
            reminder_time(&task, ReminderPolicy::default()),
            Some(at(2024, 3, 4, 9))
        );

        let event = Task::event("trip", when("2024-06-01"), when("2024-06-03")).unwrap();
        let policy = ReminderPolicy { lead_days: 2, hour: 7 };
        assert_eq!(reminder_time(&event, policy), Some(at(2024, 5, 30, 7)));
    }

    #[test]
    fn todo_and_done_tasks_have_no_reminder() {
        assert!(reminder_time(&Task::todo("x").unwrap(), ReminderPolicy::default()).is_none());
        let mut task = Task::deadline("x", when("2024-03-05")).unwrap();
        task.mark_done();
        assert!(reminder_time(&task, ReminderPolicy::default()).is_none());
    }

    #[test]
    fn due_window() {
        let tasks = vec![
            Task::todo("a").unwrap(),
            Task::deadline("tomorrow", when("2024-03-05")).unwrap(),
            Task::deadline("next week", when("2024-03-11")).unwrap(),
            Task::deadline("yesterday", when("2024-03-03")).unwrap(),
            Task::event("today", when("2024-03-04 1500"), when("2024-03-04 1600")).unwrap(),
        ];
        let due = due_reminders(&tasks, at(2024, 3, 4, 10), ReminderPolicy::default());
        let found: Vec<(usize, &str)> = due.iter().map(|(i, t)| (*i, t.description())).collect();
        assert_eq!(found, vec![(2, "tomorrow"), (5, "today")]);

        let early = due_reminders(&tasks, at(2024, 3, 4, 8), ReminderPolicy::default());
        let found: Vec<usize> = early.iter().map(|(i, _)| *i).collect();
        assert_eq!(found, vec![5]);
    }

    #[test]
    fn oversized_lead_gives_no_reminder() {
        let tasks = vec![Task::deadline("pay rent", when("2024-03-05")).unwrap()];
        for lead_days in [1_000_000_000_000, i64::MAX, -1] {
            let policy = ReminderPolicy { lead_days, hour: 9 };
            assert!(reminder_time(&tasks[0], policy).is_none());
            assert!(due_reminders(&tasks, at(2024, 3, 4, 10), policy).is_empty());
        }
    }
}
