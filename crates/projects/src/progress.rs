//! Project-level progress roll-up for the dashboard.

use chrono::NaiveDate;
use serde::Serialize;

use solarworks_core::ProjectId;

use crate::project::Project;
use crate::task::{Task, TaskHealth};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectProgress {
    pub project_id: ProjectId,
    pub as_of: NaiveDate,
    pub task_count: usize,
    pub completed_tasks: usize,
    /// Mean task progress, 0 when the project has no tasks.
    pub actual_progress: f64,
    /// Elapsed share of the project window.
    pub expected_progress: f64,
    /// Actual minus expected progress; negative means behind plan.
    pub variance: f64,
    pub overdue_tasks: usize,
    pub behind_tasks: usize,
    /// Worst delay across all tasks, finished or not.
    pub max_delay_days: i64,
}

impl ProjectProgress {
    pub fn compute(project: &Project, tasks: &[Task], today: NaiveDate) -> Self {
        let mut completed_tasks = 0;
        let mut overdue_tasks = 0;
        let mut behind_tasks = 0;
        let mut max_delay_days = 0;
        let mut progress_sum = 0u32;

        for task in tasks {
            progress_sum += u32::from(task.progress());
            max_delay_days = max_delay_days.max(task.delay_days(today));

            match task.health(today) {
                TaskHealth::Completed | TaskHealth::CompletedLate { .. } => completed_tasks += 1,
                TaskHealth::Overdue { .. } => overdue_tasks += 1,
                TaskHealth::Behind => behind_tasks += 1,
                TaskHealth::OnTrack => {}
            }
        }

        let actual_progress = if tasks.is_empty() {
            0.0
        } else {
            f64::from(progress_sum) / tasks.len() as f64
        };

        let expected_progress = project.expected_progress(today);

        Self {
            project_id: project.id,
            as_of: today,
            task_count: tasks.len(),
            completed_tasks,
            actual_progress,
            expected_progress,
            variance: actual_progress - expected_progress,
            overdue_tasks,
            behind_tasks,
            max_delay_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::NewProject;
    use crate::task::NewTask;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use solarworks_core::{CustomerId, TaskId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn project() -> Project {
        Project::create(
            ProjectId::new(),
            NewProject {
                customer_id: CustomerId::new(),
                name: "Farmhouse 25kW".into(),
                capacity_kw: dec!(25),
                contract_value: dec!(1200000),
                start_date: date(2024, 1, 1),
                end_date: date(2024, 1, 21),
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn task(project: &Project, start: NaiveDate, due: NaiveDate) -> Task {
        Task::create(
            TaskId::new(),
            project.id,
            NewTask {
                name: "step".into(),
                start_date: start,
                due_date: due,
            },
        )
        .unwrap()
    }

    #[test]
    fn empty_project_reports_schedule_only() {
        let p = project();
        let progress = ProjectProgress::compute(&p, &[], date(2024, 1, 11));
        assert_eq!(progress.task_count, 0);
        assert_eq!(progress.actual_progress, 0.0);
        assert_eq!(progress.expected_progress, 50.0);
        assert_eq!(progress.variance, -50.0);
    }

    #[test]
    fn rolls_up_task_states() {
        let p = project();
        let mut survey = task(&p, date(2024, 1, 1), date(2024, 1, 3));
        survey.update_progress(100, date(2024, 1, 5)).unwrap();
        let mut structure = task(&p, date(2024, 1, 4), date(2024, 1, 8));
        structure.update_progress(50, date(2024, 1, 6)).unwrap();
        let wiring = task(&p, date(2024, 1, 9), date(2024, 1, 20));

        let progress = ProjectProgress::compute(&p, &[survey, structure, wiring], date(2024, 1, 11));

        assert_eq!(progress.task_count, 3);
        assert_eq!(progress.completed_tasks, 1);
        assert_eq!(progress.overdue_tasks, 1);
        assert_eq!(progress.behind_tasks, 1);
        assert_eq!(progress.max_delay_days, 3);
        assert_eq!(progress.actual_progress, 50.0);
    }
}
