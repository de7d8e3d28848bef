use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::contract::ContractError;
use crate::state::{Address, BlockHeight, JobId};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Application {
    pub job_id: JobId,
    pub applicant: Address,
    pub cover_message: String,
    pub proposed_budget: u64,
    /// Estimated duration in days.
    pub estimated_duration: u64,
    pub submitted_at: BlockHeight,
}

/// Applications keyed by `(job_id, applicant)` — one bid per applicant per job.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ApplicationLedger {
    by_key: BTreeMap<(JobId, Address), Application>,
}

impl ApplicationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, application: Application) -> Result<(), ContractError> {
        let key = (application.job_id, application.applicant.clone());
        if self.by_key.contains_key(&key) {
            return Err(ContractError::DuplicateApplication {
                job_id: application.job_id,
                applicant: application.applicant,
            });
        }
        self.by_key.insert(key, application);
        Ok(())
    }

    pub fn get(&self, job_id: JobId, applicant: &Address) -> Option<&Application> {
        self.by_key.get(&(job_id, applicant.clone()))
    }

    pub fn for_job(&self, job_id: JobId) -> impl Iterator<Item = &Application> {
        self.by_key
            .range((job_id, String::new())..)
            .take_while(move |((id, _), _)| *id == job_id)
            .map(|(_, application)| application)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(JobId, Address), &Application)> {
        self.by_key.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bid(job_id: JobId, applicant: &str) -> Application {
        Application {
            job_id,
            applicant: applicant.to_string(),
            cover_message: "I am experienced in React and JavaScript".into(),
            proposed_budget: 900,
            estimated_duration: 7,
            submitted_at: 3,
        }
    }

    #[test]
    fn duplicate_bid_on_same_job_is_rejected() {
        let mut ledger = ApplicationLedger::new();
        ledger.submit(bid(1, "freelancer")).unwrap();
        let err = ledger.submit(bid(1, "freelancer")).unwrap_err();
        assert!(matches!(
            err,
            ContractError::DuplicateApplication { job_id: 1, .. }
        ));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn same_applicant_may_bid_on_different_jobs() {
        let mut ledger = ApplicationLedger::new();
        ledger.submit(bid(1, "freelancer")).unwrap();
        ledger.submit(bid(2, "freelancer")).unwrap();
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn for_job_yields_only_that_jobs_bids() {
        let mut ledger = ApplicationLedger::new();
        ledger.submit(bid(1, "alice")).unwrap();
        ledger.submit(bid(1, "bob")).unwrap();
        ledger.submit(bid(2, "carol")).unwrap();
        let applicants: Vec<_> = ledger.for_job(1).map(|a| a.applicant.clone()).collect();
        assert_eq!(applicants, vec!["alice".to_string(), "bob".to_string()]);
    }
}
