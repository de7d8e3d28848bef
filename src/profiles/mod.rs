use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::contract::ContractError;
use crate::state::{Address, BlockHeight, ProfileId};

/// Reputation every profile starts with.
pub const INITIAL_REPUTATION: u64 = 100;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: ProfileId,
    pub owner: Address,
    pub username: String,
    pub skills: Vec<String>,
    pub reputation: u64,
    pub created_at: BlockHeight,
}

/// One profile per address. Ids are monotonic from 1 and never reused.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProfileRegistry {
    by_owner: BTreeMap<Address, UserProfile>,
    next_id: ProfileId,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        owner: &Address,
        username: String,
        skills: Vec<String>,
        height: BlockHeight,
    ) -> Result<ProfileId, ContractError> {
        if self.by_owner.contains_key(owner) {
            return Err(ContractError::DuplicateProfile {
                address: owner.clone(),
            });
        }
        let id = self.next_id + 1;
        self.next_id = id;
        self.by_owner.insert(
            owner.clone(),
            UserProfile {
                id,
                owner: owner.clone(),
                username,
                skills,
                reputation: INITIAL_REPUTATION,
                created_at: height,
            },
        );
        Ok(id)
    }

    pub fn get(&self, owner: &Address) -> Option<&UserProfile> {
        self.by_owner.get(owner)
    }

    /// Lookup that turns absence into the contract error for the caller.
    pub fn require(&self, owner: &Address) -> Result<&UserProfile, ContractError> {
        self.get(owner).ok_or_else(|| ContractError::NoProfile {
            address: owner.clone(),
        })
    }

    pub fn award_reputation(
        &mut self,
        owner: &Address,
        amount: u64,
    ) -> Result<u64, ContractError> {
        let profile = self
            .by_owner
            .get_mut(owner)
            .ok_or_else(|| ContractError::NoProfile {
                address: owner.clone(),
            })?;
        profile.reputation = profile.reputation.saturating_add(amount);
        Ok(profile.reputation)
    }

    pub fn len(&self) -> usize {
        self.by_owner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_owner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &UserProfile)> {
        self.by_owner.iter()
    }
}
