//! Operator actions offered for a job in the job list.
//!
//! The job lifecycle itself belongs to the director; this only answers which
//! buttons make sense for a job given its status and type.

use std::collections::BTreeSet;

use serde::Serialize;

use super::job_type::JobType;
use super::status::JobStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Action {
    Details,
    Rerun,
    Restore,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActionSet(BTreeSet<Action>);

impl ActionSet {
    fn of(actions: &[Action]) -> Self {
        Self(actions.iter().copied().collect())
    }

    pub fn contains(&self, action: Action) -> bool {
        self.0.contains(&action)
    }

    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Actions available for a job. Defined for every (status, type) pair;
/// details are always offered.
pub fn available_actions(status: JobStatus, job_type: JobType) -> ActionSet {
    use Action::*;

    if let JobStatus::Unknown(_) = status {
        return ActionSet::of(&[Details]);
    }

    if status.is_success_like() {
        return match job_type {
            JobType::Backup => ActionSet::of(&[Details, Rerun, Restore]),
            JobType::CopyOfJob => ActionSet::of(&[Details, Restore]),
            _ => ActionSet::of(&[Details]),
        };
    }

    if status.is_terminal() {
        return match job_type {
            JobType::Backup if status.is_failure_like() => ActionSet::of(&[Details, Rerun]),
            _ => ActionSet::of(&[Details]),
        };
    }

    match (job_type, status) {
        (JobType::Restore, JobStatus::Running | JobStatus::DespoolingData) => {
            ActionSet::of(&[Details, Cancel])
        }
        (JobType::Backup | JobType::CopyOfJob, _) => ActionSet::of(&[Details, Cancel]),
        _ => ActionSet::of(&[Details]),
    }
}
