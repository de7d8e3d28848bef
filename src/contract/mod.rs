use serde::{Deserialize, Serialize};

use crate::applications::Application;
use crate::jobs::JobPosting;
use crate::profiles::UserProfile;
use crate::state::{Address, BlockHeight, JobId, NetworkEvent, NetworkState, ProfileId};

/// Reputation awarded to the freelancer when the employer marks a job done.
pub const COMPLETION_REWARD: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error("no profile registered for {address}")]
    NoProfile { address: Address },
    #[error("a profile already exists for {address}")]
    DuplicateProfile { address: Address },
    #[error("job {job_id} does not exist")]
    JobNotFound { job_id: JobId },
    #[error("caller {caller} is not authorized for job {job_id}")]
    Unauthorized { caller: Address, job_id: JobId },
    #[error("job {job_id} is no longer open")]
    JobNotOpen { job_id: JobId },
    #[error("reputation {actual} is below the required {required}")]
    InsufficientReputation { required: u64, actual: u64 },
    #[error("{applicant} already applied to job {job_id}")]
    DuplicateApplication { job_id: JobId, applicant: Address },
    #[error("job {job_id} stopped accepting applications at height {deadline}")]
    DeadlineExpired { job_id: JobId, deadline: BlockHeight },
}

impl ContractError {
    /// Stable wire code. 102 and 106 are fixed by the deployed contract;
    /// the rest fill the table contiguously.
    pub fn code(&self) -> u64 {
        match self {
            ContractError::NoProfile { .. } => 101,
            ContractError::DuplicateProfile { .. } => 102,
            ContractError::JobNotFound { .. } => 103,
            ContractError::Unauthorized { .. } => 104,
            ContractError::JobNotOpen { .. } => 105,
            ContractError::InsufficientReputation { .. } => 106,
            ContractError::DuplicateApplication { .. } => 107,
            ContractError::DeadlineExpired { .. } => 108,
        }
    }
}

/// Transaction context supplied by the executor: the authenticated sender
/// and the height of the block the transaction is mined in.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxContext {
    pub sender: Address,
    pub height: BlockHeight,
}

/// The contract runtime: owns the store and exposes the entry points.
///
/// Every entry point validates against the current state before its first
/// write, so an `Err` return leaves the store unchanged.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct JobNetwork {
    state: NetworkState,
}

impl JobNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: NetworkState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &NetworkState {
        &self.state
    }

    pub fn into_state(self) -> NetworkState {
        self.state
    }

    pub fn create_user_profile(
        &mut self,
        ctx: &TxContext,
        username: String,
        skills: Vec<String>,
    ) -> Result<ProfileId, ContractError> {
        let profile_id =
            self.state
                .profiles
                .create(&ctx.sender, username.clone(), skills, ctx.height)?;
        self.state.record(NetworkEvent::ProfileCreated {
            owner: ctx.sender.clone(),
            profile_id,
            username,
        });
        Ok(profile_id)
    }

    pub fn get_user_profile(&self, address: &Address) -> Option<&UserProfile> {
        self.state.profiles.get(address)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn post_job(
        &mut self,
        ctx: &TxContext,
        title: String,
        description: String,
        budget: u64,
        required_reputation: u64,
        required_skills: Vec<String>,
        deadline: BlockHeight,
    ) -> Result<JobId, ContractError> {
        self.state.profiles.require(&ctx.sender)?;
        let job_id = self.state.jobs.post(
            &ctx.sender,
            title.clone(),
            description,
            budget,
            required_reputation,
            required_skills,
            deadline,
            ctx.height,
        );
        self.state.record(NetworkEvent::JobPosted {
            employer: ctx.sender.clone(),
            job_id,
            title,
        });
        Ok(job_id)
    }

    pub fn get_job(&self, job_id: JobId) -> Option<&JobPosting> {
        self.state.jobs.get(job_id)
    }

    pub fn apply_for_job(
        &mut self,
        ctx: &TxContext,
        job_id: JobId,
        cover_message: String,
        proposed_budget: u64,
        estimated_duration: u64,
    ) -> Result<bool, ContractError> {
        let profile = self.state.profiles.require(&ctx.sender)?;
        let job = self.state.jobs.require(job_id)?;
        if !job.is_open() {
            return Err(ContractError::JobNotOpen { job_id });
        }
        if ctx.height > job.deadline {
            return Err(ContractError::DeadlineExpired {
                job_id,
                deadline: job.deadline,
            });
        }
        if profile.reputation < job.required_reputation {
            return Err(ContractError::InsufficientReputation {
                required: job.required_reputation,
                actual: profile.reputation,
            });
        }
        self.state.applications.submit(Application {
            job_id,
            applicant: ctx.sender.clone(),
            cover_message,
            proposed_budget,
            estimated_duration,
            submitted_at: ctx.height,
        })?;
        self.state.record(NetworkEvent::ApplicationSubmitted {
            applicant: ctx.sender.clone(),
            job_id,
            proposed_budget,
        });
        Ok(true)
    }

    pub fn get_application(&self, job_id: JobId, applicant: &Address) -> Option<&Application> {
        self.state.applications.get(job_id, applicant)
    }

    pub fn applications_for_job(&self, job_id: JobId) -> Vec<&Application> {
        self.state.applications.for_job(job_id).collect()
    }

    pub fn assign_job(
        &mut self,
        ctx: &TxContext,
        job_id: JobId,
        freelancer: Address,
    ) -> Result<bool, ContractError> {
        self.state.profiles.require(&freelancer)?;
        let job = self.state.jobs.require(job_id)?;
        if job.employer != ctx.sender {
            return Err(ContractError::Unauthorized {
                caller: ctx.sender.clone(),
                job_id,
            });
        }
        self.state
            .jobs
            .require_mut(job_id)?
            .assign(freelancer.clone())?;
        self.state
            .record(NetworkEvent::JobAssigned { job_id, freelancer });
        Ok(true)
    }

    pub fn complete_job(&mut self, ctx: &TxContext, job_id: JobId) -> Result<bool, ContractError> {
        let job = self.state.jobs.require(job_id)?;
        if job.employer != ctx.sender {
            return Err(ContractError::Unauthorized {
                caller: ctx.sender.clone(),
                job_id,
            });
        }
        let freelancer = self.state.jobs.require_mut(job_id)?.complete()?;
        let new_score = self
            .state
            .profiles
            .award_reputation(&freelancer, COMPLETION_REWARD)?;
        self.state.record(NetworkEvent::JobCompleted {
            job_id,
            freelancer: freelancer.clone(),
        });
        self.state.record(NetworkEvent::ReputationAwarded {
            owner: freelancer,
            amount: COMPLETION_REWARD,
            new_score,
        });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(sender: &str, height: BlockHeight) -> TxContext {
        TxContext {
            sender: sender.to_string(),
            height,
        }
    }

    fn network_with_profiles() -> JobNetwork {
        let mut network = JobNetwork::new();
        network
            .create_user_profile(
                &ctx("employer", 1),
                "employer1".into(),
                vec!["management".into()],
            )
            .unwrap();
        network
            .create_user_profile(
                &ctx("freelancer", 1),
                "freelancer1".into(),
                vec!["javascript".into(), "react".into()],
            )
            .unwrap();
        network
    }

    fn post_default_job(network: &mut JobNetwork, required_reputation: u64) -> JobId {
        network
            .post_job(
                &ctx("employer", 1),
                "Web Developer Needed".into(),
                "Looking for an experienced web developer".into(),
                1_000,
                required_reputation,
                vec!["javascript".into(), "react".into()],
                1_000,
            )
            .unwrap()
    }

    #[test]
    fn profile_creation_assigns_sequential_ids() {
        let mut network = JobNetwork::new();
        let first = network
            .create_user_profile(
                &ctx("wallet_1", 1),
                "john_doe".into(),
                vec!["javascript".into(), "python".into()],
            )
            .unwrap();
        assert_eq!(first, 1);
        let profile = network.get_user_profile(&"wallet_1".to_string()).unwrap();
        assert_eq!(profile.username, "john_doe");
        assert_eq!(profile.reputation, 100);
        let second = network
            .create_user_profile(&ctx("wallet_2", 1), "jane_doe".into(), vec![])
            .unwrap();
        assert_eq!(second, 2);
    }

    #[test]
    fn duplicate_profile_fails_with_code_102() {
        let mut network = JobNetwork::new();
        network
            .create_user_profile(&ctx("wallet_1", 1), "john_doe".into(), vec![])
            .unwrap();
        let err = network
            .create_user_profile(&ctx("wallet_1", 1), "jane_doe".into(), vec![])
            .unwrap_err();
        assert_eq!(err.code(), 102);
    }

    #[test]
    fn posting_without_a_profile_fails_with_code_101() {
        let mut network = JobNetwork::new();
        let err = network
            .post_job(
                &ctx("stranger", 1),
                "Job".into(),
                "".into(),
                100,
                0,
                vec![],
                1_000,
            )
            .unwrap_err();
        assert_eq!(err.code(), 101);
    }

    #[test]
    fn job_ids_are_sequential_from_one() {
        let mut network = network_with_profiles();
        assert_eq!(post_default_job(&mut network, 50), 1);
        assert_eq!(post_default_job(&mut network, 50), 2);
    }

    #[test]
    fn sufficient_reputation_lets_an_applicant_through() {
        let mut network = network_with_profiles();
        let job_id = post_default_job(&mut network, 50);
        let accepted = network
            .apply_for_job(
                &ctx("freelancer", 2),
                job_id,
                "I am experienced in React and JavaScript".into(),
                900,
                7,
            )
            .unwrap();
        assert!(accepted);
        let application = network
            .get_application(job_id, &"freelancer".to_string())
            .unwrap();
        assert_eq!(application.proposed_budget, 900);
    }

    #[test]
    fn insufficient_reputation_fails_with_code_106() {
        let mut network = network_with_profiles();
        let job_id = post_default_job(&mut network, 150);
        let err = network
            .apply_for_job(
                &ctx("freelancer", 2),
                job_id,
                "I would like to work on this project".into(),
                1_800,
                10,
            )
            .unwrap_err();
        assert_eq!(err.code(), 106);
        assert!(network
            .get_application(job_id, &"freelancer".to_string())
            .is_none());
    }

    #[test]
    fn applying_to_a_missing_job_fails_with_code_103() {
        let mut network = network_with_profiles();
        let err = network
            .apply_for_job(&ctx("freelancer", 2), 42, "hi".into(), 100, 1)
            .unwrap_err();
        assert_eq!(err.code(), 103);
    }

    #[test]
    fn applying_past_the_deadline_fails_with_code_108() {
        let mut network = network_with_profiles();
        let job_id = post_default_job(&mut network, 50);
        let err = network
            .apply_for_job(&ctx("freelancer", 1_001), job_id, "late".into(), 900, 7)
            .unwrap_err();
        assert_eq!(err.code(), 108);
    }

    #[test]
    fn second_application_fails_with_code_107() {
        let mut network = network_with_profiles();
        let job_id = post_default_job(&mut network, 50);
        network
            .apply_for_job(&ctx("freelancer", 2), job_id, "first".into(), 900, 7)
            .unwrap();
        let err = network
            .apply_for_job(&ctx("freelancer", 2), job_id, "again".into(), 800, 5)
            .unwrap_err();
        assert_eq!(err.code(), 107);
    }

    #[test]
    fn only_the_employer_may_assign() {
        let mut network = network_with_profiles();
        let job_id = post_default_job(&mut network, 50);
        let err = network
            .assign_job(&ctx("freelancer", 2), job_id, "freelancer".to_string())
            .unwrap_err();
        assert_eq!(err.code(), 104);
        assert!(network
            .assign_job(&ctx("employer", 2), job_id, "freelancer".to_string())
            .unwrap());
    }

    #[test]
    fn assigned_jobs_reject_new_applications() {
        let mut network = network_with_profiles();
        let job_id = post_default_job(&mut network, 50);
        network
            .assign_job(&ctx("employer", 2), job_id, "freelancer".to_string())
            .unwrap();
        let err = network
            .apply_for_job(&ctx("freelancer", 3), job_id, "too late".into(), 900, 7)
            .unwrap_err();
        assert_eq!(err.code(), 105);
    }

    #[test]
    fn assigning_an_unregistered_freelancer_fails() {
        let mut network = network_with_profiles();
        let job_id = post_default_job(&mut network, 50);
        let err = network
            .assign_job(&ctx("employer", 2), job_id, "nobody".to_string())
            .unwrap_err();
        assert_eq!(err.code(), 101);
        assert!(network.get_job(job_id).unwrap().is_open());
    }

    #[test]
    fn completion_rewards_the_freelancer() {
        let mut network = network_with_profiles();
        let job_id = post_default_job(&mut network, 50);
        network
            .assign_job(&ctx("employer", 2), job_id, "freelancer".to_string())
            .unwrap();
        network.complete_job(&ctx("employer", 3), job_id).unwrap();
        let profile = network.get_user_profile(&"freelancer".to_string()).unwrap();
        assert_eq!(profile.reputation, 100 + COMPLETION_REWARD);
        // Completing twice is rejected.
        let err = network
            .complete_job(&ctx("employer", 4), job_id)
            .unwrap_err();
        assert_eq!(err.code(), 105);
    }

    #[test]
    fn failed_calls_leave_the_state_root_unchanged() {
        let mut network = network_with_profiles();
        let job_id = post_default_job(&mut network, 150);
        let before = network.state().state_root();
        network
            .apply_for_job(&ctx("freelancer", 2), job_id, "nope".into(), 900, 7)
            .unwrap_err();
        network
            .create_user_profile(&ctx("employer", 2), "dup".into(), vec![])
            .unwrap_err();
        network
            .assign_job(&ctx("freelancer", 2), job_id, "freelancer".to_string())
            .unwrap_err();
        assert_eq!(before, network.state().state_root());
    }
}
