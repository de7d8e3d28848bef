//! Deterministic block execution for local runs and tests.
//!
//! The host chain serializes transactions into blocks; this module mirrors
//! that discipline: transactions in a block run in order, each yields a
//! receipt, and the receipt ids chain over SHA-256 so a transcript commits
//! to its history.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::contract::{JobNetwork, TxContext};
use crate::state::{Address, BlockHeight, JobId, StateSnapshot};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "call", rename_all = "kebab-case")]
pub enum ContractCall {
    CreateUserProfile {
        username: String,
        skills: Vec<String>,
    },
    PostJob {
        title: String,
        description: String,
        budget: u64,
        required_reputation: u64,
        required_skills: Vec<String>,
        deadline: BlockHeight,
    },
    ApplyForJob {
        job_id: JobId,
        cover_message: String,
        proposed_budget: u64,
        estimated_duration: u64,
    },
    AssignJob {
        job_id: JobId,
        freelancer: Address,
    },
    CompleteJob {
        job_id: JobId,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tx {
    pub sender: Address,
    #[serde(flatten)]
    pub call: ContractCall,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TxResult {
    Ok { value: ReceiptValue },
    Err { code: u64, reason: String },
}

impl TxResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, TxResult::Ok { .. })
    }

    pub fn expect_ok(&self) -> &ReceiptValue {
        match self {
            TxResult::Ok { value } => value,
            TxResult::Err { code, reason } => {
                panic!("expected ok receipt, got err {code}: {reason}")
            }
        }
    }

    pub fn expect_err(&self) -> u64 {
        match self {
            TxResult::Ok { .. } => panic!("expected err receipt, got ok"),
            TxResult::Err { code, .. } => *code,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptValue {
    Uint(u64),
    Bool(bool),
}

impl ReceiptValue {
    pub fn as_uint(&self) -> u64 {
        match self {
            ReceiptValue::Uint(v) => *v,
            ReceiptValue::Bool(_) => panic!("receipt value is a bool, not a uint"),
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            ReceiptValue::Bool(v) => *v,
            ReceiptValue::Uint(_) => panic!("receipt value is a uint, not a bool"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Receipt {
    pub height: BlockHeight,
    pub tx_index: usize,
    pub sender: Address,
    pub result: TxResult,
    /// Chained commitment: sha256(prev_id || height || tx || result).
    pub receipt_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MinedBlock {
    pub height: BlockHeight,
    pub receipts: Vec<Receipt>,
}

/// Serialized executor over one contract instance.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Simulator {
    network: JobNetwork,
    height: BlockHeight,
    last_receipt: [u8; 32],
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            network: JobNetwork::new(),
            height: 0,
            last_receipt: [0u8; 32],
        }
    }

    pub fn network(&self) -> &JobNetwork {
        &self.network
    }

    pub fn height(&self) -> BlockHeight {
        self.height
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.network.state().snapshot(self.height)
    }

    /// Execute one block. Each transaction is atomic on its own; a failed
    /// transaction produces an `Err` receipt and the block keeps going.
    pub fn mine_block(&mut self, txs: Vec<Tx>) -> MinedBlock {
        self.height += 1;
        let height = self.height;
        let mut receipts = Vec::with_capacity(txs.len());
        for (tx_index, tx) in txs.into_iter().enumerate() {
            let ctx = TxContext {
                sender: tx.sender.clone(),
                height,
            };
            let result = self.execute(&ctx, &tx.call);
            let receipt_id = self.chain_receipt(height, &tx, &result);
            receipts.push(Receipt {
                height,
                tx_index,
                sender: tx.sender,
                result,
                receipt_id,
            });
        }
        MinedBlock { height, receipts }
    }

    /// Advance the chain without transactions (deadlines are height-based).
    pub fn mine_empty_blocks(&mut self, count: u64) {
        self.height += count;
    }

    fn execute(&mut self, ctx: &TxContext, call: &ContractCall) -> TxResult {
        let outcome = match call.clone() {
            ContractCall::CreateUserProfile { username, skills } => self
                .network
                .create_user_profile(ctx, username, skills)
                .map(ReceiptValue::Uint),
            ContractCall::PostJob {
                title,
                description,
                budget,
                required_reputation,
                required_skills,
                deadline,
            } => self
                .network
                .post_job(
                    ctx,
                    title,
                    description,
                    budget,
                    required_reputation,
                    required_skills,
                    deadline,
                )
                .map(ReceiptValue::Uint),
            ContractCall::ApplyForJob {
                job_id,
                cover_message,
                proposed_budget,
                estimated_duration,
            } => self
                .network
                .apply_for_job(ctx, job_id, cover_message, proposed_budget, estimated_duration)
                .map(ReceiptValue::Bool),
            ContractCall::AssignJob { job_id, freelancer } => self
                .network
                .assign_job(ctx, job_id, freelancer)
                .map(ReceiptValue::Bool),
            ContractCall::CompleteJob { job_id } => self
                .network
                .complete_job(ctx, job_id)
                .map(ReceiptValue::Bool),
        };
        match outcome {
            Ok(value) => TxResult::Ok { value },
            Err(err) => TxResult::Err {
                code: err.code(),
                reason: err.to_string(),
            },
        }
    }

    fn chain_receipt(&mut self, height: BlockHeight, tx: &Tx, result: &TxResult) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.last_receipt);
        hasher.update(height.to_le_bytes());
        hasher.update(serde_json::to_vec(tx).expect("tx encode"));
        hasher.update(serde_json::to_vec(result).expect("result encode"));
        let digest: [u8; 32] = hasher.finalize().into();
        self.last_receipt = digest;
        hex::encode(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_profile_tx(sender: &str, username: &str) -> Tx {
        Tx {
            sender: sender.to_string(),
            call: ContractCall::CreateUserProfile {
                username: username.to_string(),
                skills: vec!["javascript".into()],
            },
        }
    }

    #[test]
    fn blocks_increment_height_once() {
        let mut sim = Simulator::new();
        let block = sim.mine_block(vec![
            create_profile_tx("wallet_1", "john_doe"),
            create_profile_tx("wallet_2", "jane_doe"),
        ]);
        assert_eq!(block.height, 1);
        assert_eq!(sim.height(), 1);
        assert_eq!(block.receipts.len(), 2);
        assert!(block.receipts.iter().all(|r| r.result.is_ok()));
    }

    #[test]
    fn a_failed_tx_gets_an_err_receipt_and_the_block_continues() {
        let mut sim = Simulator::new();
        let block = sim.mine_block(vec![
            create_profile_tx("wallet_1", "john_doe"),
            create_profile_tx("wallet_1", "jane_doe"),
            create_profile_tx("wallet_2", "ada"),
        ]);
        assert!(block.receipts[0].result.is_ok());
        assert_eq!(block.receipts[1].result.expect_err(), 102);
        assert!(block.receipts[2].result.is_ok());
    }

    #[test]
    fn receipt_ids_chain_and_are_deterministic() {
        let run = || {
            let mut sim = Simulator::new();
            let b1 = sim.mine_block(vec![create_profile_tx("wallet_1", "john_doe")]);
            let b2 = sim.mine_block(vec![create_profile_tx("wallet_2", "jane_doe")]);
            (b1.receipts[0].receipt_id.clone(), b2.receipts[0].receipt_id.clone())
        };
        let (a1, a2) = run();
        let (b1, b2) = run();
        assert_eq!(a1, b1);
        assert_eq!(a2, b2);
        assert_ne!(a1, a2);
    }

    #[test]
    fn tx_json_uses_kebab_case_call_tags() {
        let tx = create_profile_tx("wallet_1", "john_doe");
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["call"], "create-user-profile");
        let back: Tx = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }

    #[test]
    fn simulator_round_trips_through_json() {
        let mut sim = Simulator::new();
        sim.mine_block(vec![create_profile_tx("wallet_1", "john_doe")]);
        let json = serde_json::to_string(&sim).unwrap();
        let back: Simulator = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sim);
        assert_eq!(back.snapshot().state_root, sim.snapshot().state_root);
    }
}
