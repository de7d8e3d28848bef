use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::applications::ApplicationLedger;
use crate::jobs::{JobBoard, JobStatus};
use crate::profiles::ProfileRegistry;

pub type Address = String;
pub type ProfileId = u64;
pub type JobId = u64;
pub type BlockHeight = u64;

/// Append-only record of committed transitions.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NetworkEvent {
    ProfileCreated {
        owner: Address,
        profile_id: ProfileId,
        username: String,
    },
    JobPosted {
        employer: Address,
        job_id: JobId,
        title: String,
    },
    ApplicationSubmitted {
        applicant: Address,
        job_id: JobId,
        proposed_budget: u64,
    },
    JobAssigned {
        job_id: JobId,
        freelancer: Address,
    },
    JobCompleted {
        job_id: JobId,
        freelancer: Address,
    },
    ReputationAwarded {
        owner: Address,
        amount: u64,
        new_score: u64,
    },
}

/// The one persistent store. Mutated only through the contract entry points,
/// one transaction at a time, in the executor's serialized order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NetworkState {
    pub profiles: ProfileRegistry,
    pub jobs: JobBoard,
    pub applications: ApplicationLedger,
    pub events: Vec<NetworkEvent>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateSnapshot {
    pub height: BlockHeight,
    pub state: NetworkState,
    pub state_root: String,
}

impl NetworkState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: NetworkEvent) {
        self.events.push(event);
    }

    /// Deterministic commitment over profiles, jobs, and applications in
    /// key order. Events are history, not state, and stay out of the root.
    pub fn state_root(&self) -> [u8; 32] {
        let mut leaves: Vec<[u8; 32]> = Vec::new();
        for (owner, profile) in self.profiles.iter() {
            let mut hasher = Sha256::new();
            hasher.update(b"profile");
            hasher.update(owner.as_bytes());
            hasher.update(profile.id.to_le_bytes());
            hasher.update(profile.username.as_bytes());
            for skill in &profile.skills {
                hasher.update(skill.as_bytes());
            }
            hasher.update(profile.reputation.to_le_bytes());
            hasher.update(profile.created_at.to_le_bytes());
            leaves.push(hasher.finalize().into());
        }
        for (job_id, job) in self.jobs.iter() {
            let mut hasher = Sha256::new();
            hasher.update(b"job");
            hasher.update(job_id.to_le_bytes());
            hasher.update(job.employer.as_bytes());
            hasher.update(job.title.as_bytes());
            hasher.update(job.description.as_bytes());
            hasher.update(job.budget.to_le_bytes());
            hasher.update(job.required_reputation.to_le_bytes());
            for skill in &job.required_skills {
                hasher.update(skill.as_bytes());
            }
            hasher.update(job.deadline.to_le_bytes());
            match &job.status {
                JobStatus::Open => hasher.update(b"open"),
                JobStatus::Assigned { freelancer } => {
                    hasher.update(b"assigned");
                    hasher.update(freelancer.as_bytes());
                }
                JobStatus::Completed { freelancer } => {
                    hasher.update(b"completed");
                    hasher.update(freelancer.as_bytes());
                }
            }
            leaves.push(hasher.finalize().into());
        }
        for ((job_id, applicant), application) in self.applications.iter() {
            let mut hasher = Sha256::new();
            hasher.update(b"application");
            hasher.update(job_id.to_le_bytes());
            hasher.update(applicant.as_bytes());
            hasher.update(application.cover_message.as_bytes());
            hasher.update(application.proposed_budget.to_le_bytes());
            hasher.update(application.estimated_duration.to_le_bytes());
            hasher.update(application.submitted_at.to_le_bytes());
            leaves.push(hasher.finalize().into());
        }
        merkle_fold(leaves)
    }

    pub fn snapshot(&self, height: BlockHeight) -> StateSnapshot {
        StateSnapshot {
            height,
            state: self.clone(),
            state_root: hex::encode(self.state_root()),
        }
    }
}

fn merkle_fold(mut leaves: Vec<[u8; 32]>) -> [u8; 32] {
    if leaves.is_empty() {
        return Sha256::digest(b"jobnet-empty").into();
    }
    while leaves.len() > 1 {
        let mut next = Vec::with_capacity((leaves.len() + 1) / 2);
        for chunk in leaves.chunks(2) {
            let mut hasher = Sha256::new();
            hasher.update(b"node");
            hasher.update(chunk[0]);
            // Odd leaf pairs with itself.
            hasher.update(if chunk.len() == 2 { chunk[1] } else { chunk[0] });
            next.push(hasher.finalize().into());
        }
        leaves = next;
    }
    leaves[0]
}
