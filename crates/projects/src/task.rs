use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use solarworks_core::{DomainError, DomainResult, Entity, ProjectId, TaskId};

use crate::schedule;

/// Input for planning a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// Schedule health of a task on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskHealth {
    OnTrack,
    /// Not yet due, but progress lags the elapsed share of the task window.
    Behind,
    /// Past due and not finished.
    Overdue { delay_days: i64 },
    Completed,
    CompletedLate { delay_days: i64 },
}

/// A scheduled piece of project work (site survey, structure, wiring, net metering...).
///
/// `completed_on` is set exactly when `progress` is 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    project_id: ProjectId,
    name: String,
    start_date: NaiveDate,
    due_date: NaiveDate,
    progress: u8,
    completed_on: Option<NaiveDate>,
}

impl Task {
    pub fn create(id: TaskId, project_id: ProjectId, new: NewTask) -> DomainResult<Self> {
        Self::restore(id, project_id, new, 0, None)
    }

    /// Rebuild a task from storage.
    pub fn restore(
        id: TaskId,
        project_id: ProjectId,
        new: NewTask,
        progress: u8,
        completed_on: Option<NaiveDate>,
    ) -> DomainResult<Self> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("task name cannot be empty"));
        }
        if new.due_date < new.start_date {
            return Err(DomainError::validation("due date is before start date"));
        }
        if progress > 100 {
            return Err(DomainError::validation("progress must be between 0 and 100"));
        }
        if (progress == 100) != completed_on.is_some() {
            return Err(DomainError::invariant(
                "completion date must be set exactly when progress is 100",
            ));
        }

        Ok(Self {
            id,
            project_id,
            name,
            start_date: new.start_date,
            due_date: new.due_date,
            progress,
            completed_on,
        })
    }

    pub fn id_typed(&self) -> TaskId {
        self.id
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn completed_on(&self) -> Option<NaiveDate> {
        self.completed_on
    }

    pub fn status(&self) -> TaskStatus {
        if self.completed_on.is_some() {
            TaskStatus::Completed
        } else if self.progress > 0 {
            TaskStatus::InProgress
        } else {
            TaskStatus::NotStarted
        }
    }

    /// Record progress as of `on`. Reaching 100 completes the task on that
    /// date; dropping below 100 reopens it.
    pub fn update_progress(&mut self, progress: u8, on: NaiveDate) -> DomainResult<()> {
        if progress > 100 {
            return Err(DomainError::validation("progress must be between 0 and 100"));
        }
        if progress == 100 && on < self.start_date {
            return Err(DomainError::validation(
                "task cannot be completed before it starts",
            ));
        }

        self.progress = progress;
        self.completed_on = if progress == 100 {
            Some(self.completed_on.unwrap_or(on))
        } else {
            None
        };
        Ok(())
    }

    /// Days past due: measured at completion for finished tasks, at `today` otherwise.
    pub fn delay_days(&self, today: NaiveDate) -> i64 {
        schedule::delay_days(self.due_date, self.completed_on.unwrap_or(today))
    }

    pub fn expected_progress(&self, today: NaiveDate) -> f64 {
        schedule::expected_progress(self.start_date, self.due_date, today)
    }

    pub fn health(&self, today: NaiveDate) -> TaskHealth {
        let delay_days = self.delay_days(today);

        if self.completed_on.is_some() {
            return if delay_days > 0 {
                TaskHealth::CompletedLate { delay_days }
            } else {
                TaskHealth::Completed
            };
        }
        if delay_days > 0 {
            return TaskHealth::Overdue { delay_days };
        }
        if f64::from(self.progress) < self.expected_progress(today) {
            return TaskHealth::Behind;
        }
        TaskHealth::OnTrack
    }
}

impl Entity for Task {
    type Id = TaskId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task() -> Task {
        Task::create(
            TaskId::new(),
            ProjectId::new(),
            NewTask {
                name: "Mount structure".into(),
                start_date: date(2024, 1, 1),
                due_date: date(2024, 1, 11),
            },
        )
        .unwrap()
    }

    #[test]
    fn status_follows_progress() {
        let mut t = task();
        assert_eq!(t.status(), TaskStatus::NotStarted);

        t.update_progress(40, date(2024, 1, 4)).unwrap();
        assert_eq!(t.status(), TaskStatus::InProgress);

        t.update_progress(100, date(2024, 1, 9)).unwrap();
        assert_eq!(t.status(), TaskStatus::Completed);
        assert_eq!(t.completed_on(), Some(date(2024, 1, 9)));

        t.update_progress(90, date(2024, 1, 10)).unwrap();
        assert_eq!(t.status(), TaskStatus::InProgress);
        assert_eq!(t.completed_on(), None);
    }

    #[test]
    fn repeated_completion_keeps_first_date() {
        let mut t = task();
        t.update_progress(100, date(2024, 1, 9)).unwrap();
        t.update_progress(100, date(2024, 1, 20)).unwrap();
        assert_eq!(t.completed_on(), Some(date(2024, 1, 9)));
    }

    #[test]
    fn progress_above_hundred_is_rejected() {
        let mut t = task();
        assert!(t.update_progress(101, date(2024, 1, 2)).is_err());
        assert_eq!(t.progress(), 0);
    }

    #[test]
    fn restore_checks_completion_consistency() {
        let new = NewTask {
            name: "Wiring".into(),
            start_date: date(2024, 1, 1),
            due_date: date(2024, 1, 2),
        };
        let err = Task::restore(TaskId::new(), ProjectId::new(), new, 100, None).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn health_classification() {
        let mut t = task();
        assert_eq!(t.health(date(2024, 1, 1)), TaskHealth::OnTrack);
        assert_eq!(t.health(date(2024, 1, 6)), TaskHealth::Behind);

        t.update_progress(60, date(2024, 1, 6)).unwrap();
        assert_eq!(t.health(date(2024, 1, 6)), TaskHealth::OnTrack);
        assert_eq!(t.health(date(2024, 1, 14)), TaskHealth::Overdue { delay_days: 3 });

        t.update_progress(100, date(2024, 1, 11)).unwrap();
        assert_eq!(t.health(date(2024, 2, 1)), TaskHealth::Completed);
    }

    #[test]
    fn late_completion_freezes_delay() {
        let mut t = task();
        t.update_progress(100, date(2024, 1, 15)).unwrap();
        assert_eq!(t.delay_days(date(2024, 3, 1)), 4);
        assert_eq!(t.health(date(2024, 3, 1)), TaskHealth::CompletedLate { delay_days: 4 });
    }
}
