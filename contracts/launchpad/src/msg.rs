use cosmwasm_schema::cw_serde;
use cosmwasm_std::{HexBinary, Uint128};

use crate::phase::Phase;

#[cw_serde]
pub struct InstantiateMsg {
    // defaults to the sender
    pub admin: Option<String>,
    pub collection: String,
    pub payment_denom: String,
    pub collection_size: u64,
    pub max_per_tx: u64,
    pub max_per_address: u64,
    pub amount_for_auction: u64,
    pub amount_for_allowlist: u64,
    pub owner_reserve: u64,
}

#[cw_serde]
pub struct ScheduleMsg {
    pub auction_start: Option<u64>,
    pub pre_commit_start: Option<u64>,
    pub allowlist_start: Option<u64>,
    pub public_sale_start: u64,
    pub public_sale_end: Option<u64>,
}

#[cw_serde]
pub struct AuctionMsg {
    pub start_price: Uint128,
    pub floor_price: Uint128,
    // seconds
    pub duration: u64,
    // seconds
    pub drop_interval: u64,
}

#[cw_serde]
pub struct PricingMsg {
    // required if and only if the schedule has an auction
    pub auction: Option<AuctionMsg>,
    // required if and only if the schedule has no auction
    pub flat_price: Option<Uint128>,
    pub allowlist_discount_bps: u16,
    pub public_discount_bps: u16,
}

#[cw_serde]
pub enum RandomnessSourceMsg {
    Block {},
    Oracle { address: String },
}

#[cw_serde]
pub struct AllowanceMsg {
    pub address: String,
    pub amount: u64,
}

#[cw_serde]
pub enum ExecuteMsg {
    ConfigureSchedule {
        schedule: ScheduleMsg,
        pricing: PricingMsg,
    },
    // moves a phase boundary that has not been reached yet
    UpdatePhaseStart {
        phase: Phase,
        start: u64,
    },
    ConfigureReveal {
        batch_size: u64,
        reveal_start: u64,
        reveal_interval: u64,
        randomness_source: RandomnessSourceMsg,
    },
    SetAllowances {
        allowances: Vec<AllowanceMsg>,
    },
    MintAuction {
        quantity: u64,
    },
    PreCommit {
        quantity: u64,
    },
    SettlePending {
        max_quantity: u64,
    },
    ClaimPreCommitted {},
    MintAllowlist {
        quantity: u64,
    },
    MintPublic {
        quantity: u64,
    },
    OwnerMint {
        recipient: String,
        quantity: u64,
    },
    RevealNext {},
    ForceReveal {},
    ReceiveRandomness {
        job_id: String,
        randomness: HexBinary,
    },
}
