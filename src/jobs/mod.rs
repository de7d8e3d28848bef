use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::contract::ContractError;
use crate::state::{Address, BlockHeight, JobId};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    Assigned { freelancer: Address },
    Completed { freelancer: Address },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobPosting {
    pub id: JobId,
    pub employer: Address,
    pub title: String,
    pub description: String,
    pub budget: u64,
    pub required_reputation: u64,
    pub required_skills: Vec<String>,
    /// Block height after which applications are no longer accepted.
    pub deadline: BlockHeight,
    pub status: JobStatus,
    pub posted_at: BlockHeight,
}

impl JobPosting {
    pub fn is_open(&self) -> bool {
        matches!(self.status, JobStatus::Open)
    }

    /// `Open -> Assigned`, one-way.
    pub fn assign(&mut self, freelancer: Address) -> Result<(), ContractError> {
        if !self.is_open() {
            return Err(ContractError::JobNotOpen { job_id: self.id });
        }
        self.status = JobStatus::Assigned { freelancer };
        Ok(())
    }

    /// `Assigned -> Completed`; returns the freelancer the job was bound to.
    pub fn complete(&mut self) -> Result<Address, ContractError> {
        match &self.status {
            JobStatus::Assigned { freelancer } => {
                let freelancer = freelancer.clone();
                self.status = JobStatus::Completed {
                    freelancer: freelancer.clone(),
                };
                Ok(freelancer)
            }
            _ => Err(ContractError::JobNotOpen { job_id: self.id }),
        }
    }
}

/// Postings keyed by id; ids are monotonic from 1 and never reused.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct JobBoard {
    by_id: BTreeMap<JobId, JobPosting>,
    next_id: JobId,
}

impl JobBoard {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn post(
        &mut self,
        employer: &Address,
        title: String,
        description: String,
        budget: u64,
        required_reputation: u64,
        required_skills: Vec<String>,
        deadline: BlockHeight,
        height: BlockHeight,
    ) -> JobId {
        let id = self.next_id + 1;
        self.next_id = id;
        self.by_id.insert(
            id,
            JobPosting {
                id,
                employer: employer.clone(),
                title,
                description,
                budget,
                required_reputation,
                required_skills,
                deadline,
                status: JobStatus::Open,
                posted_at: height,
            },
        );
        id
    }

    pub fn get(&self, id: JobId) -> Option<&JobPosting> {
        self.by_id.get(&id)
    }

    pub fn require(&self, id: JobId) -> Result<&JobPosting, ContractError> {
        self.get(id)
            .ok_or(ContractError::JobNotFound { job_id: id })
    }

    pub fn require_mut(&mut self, id: JobId) -> Result<&mut JobPosting, ContractError> {
        self.by_id
            .get_mut(&id)
            .ok_or(ContractError::JobNotFound { job_id: id })
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&JobId, &JobPosting)> {
        self.by_id.iter()
    }
}
