use cosmwasm_std::{OverflowError, StdError, Uint128};
use cw_utils::PaymentError;
use thiserror::Error;

use crate::phase::Phase;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error(transparent)]
    Std(#[from] StdError),

    #[error(transparent)]
    OverflowError(#[from] OverflowError),

    #[error(transparent)]
    PaymentError(#[from] PaymentError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("Invalid collection config: {reason}")]
    InvalidCollectionConfig { reason: String },

    #[error("Invalid schedule: {reason}")]
    InvalidSchedule { reason: String },

    #[error("Invalid price curve: {reason}")]
    InvalidPriceCurve { reason: String },

    #[error("Discount of {discount_bps} bps exceeds {max_bps} bps")]
    InvalidDiscount { discount_bps: u16, max_bps: u16 },

    #[error("Batch size {batch_size} must be non-zero and divide the collection size {collection_size}")]
    InvalidBatchSize {
        batch_size: u64,
        collection_size: u64,
    },

    #[error("Schedule is already configured")]
    ScheduleAlreadyConfigured {},

    #[error("Schedule is not configured")]
    ScheduleNotConfigured {},

    #[error("Reveal is already configured")]
    RevealAlreadyConfigured {},

    #[error("Reveal is not configured")]
    RevealNotConfigured {},

    #[error("Operation not allowed in phase {current}")]
    WrongPhase { current: Phase },

    #[error("Quantity must be non-zero")]
    ZeroQuantity {},

    #[error("Requested {requested} items but only {remaining} remain")]
    SupplyExhausted { requested: u64, remaining: u64 },

    #[error("Requested {requested} items but the allowance is {available}")]
    AllowanceExceeded { requested: u64, available: u64 },

    #[error("At most {max} items can be minted per transaction")]
    MaxPerTransactionExceeded { max: u64 },

    #[error("At most {max} items can be minted per address")]
    MaxPerAddressExceeded { max: u64 },

    #[error("Nothing to claim")]
    NothingToClaim {},

    #[error("Insufficient payment: required {required}, sent {sent}")]
    InsufficientPayment { required: Uint128, sent: Uint128 },

    #[error("Reveal not ready: {reason}")]
    RevealNotReady { reason: String },

    #[error("A randomness request is already in flight")]
    RevealPending {},

    #[error("Seed of batch {batch} is already set")]
    SeedAlreadySet { batch: u64 },

    #[error("Unknown randomness job {job_id}")]
    UnknownRandomnessJob { job_id: String },

    #[error("Randomness must be at least {min_bytes} bytes long")]
    InvalidRandomness { min_bytes: usize },
}

pub fn new_generic_error(msg: impl Into<String>) -> ContractError {
    ContractError::Std(StdError::generic_err(msg))
}
