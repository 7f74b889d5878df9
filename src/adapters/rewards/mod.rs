//! Reward ledger adapters.

mod kv_reward_ledger;

pub use kv_reward_ledger::KeyValueRewardLedger;
