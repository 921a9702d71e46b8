use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Uint128};

use crate::phase::{Phase, SaleSchedule};
use crate::pricing::Pricing;
use crate::queue::PreCommitEntry;
use crate::reveal::RevealLedger;
use crate::state::{Config, SaleStats};

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},
    #[returns(ScheduleResponse)]
    Schedule {},
    #[returns(CurrentPhaseResponse)]
    CurrentPhase {},
    #[returns(CurrentPriceResponse)]
    CurrentPrice {},
    #[returns(PricesResponse)]
    Prices {},
    #[returns(UserInfoResponse)]
    UserInfo { address: String },
    #[returns(PendingQueueResponse)]
    PendingQueue {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(SaleStatsResponse)]
    SaleStats {},
    #[returns(RegistrySupplyResponse)]
    RegistrySupply {},
    #[returns(RevealStatusResponse)]
    RevealStatus {},
    #[returns(HasNextRevealResponse)]
    HasNextReveal {},
    #[returns(MetadataIndexResponse)]
    MetadataIndex { item_id: u64 },
}

#[cw_serde]
pub struct ConfigResponse {
    pub config: Config,
}

#[cw_serde]
pub struct ScheduleResponse {
    pub schedule: Option<SaleSchedule>,
    pub pricing: Option<Pricing>,
}

#[cw_serde]
pub struct CurrentPhaseResponse {
    pub phase: Phase,
}

#[cw_serde]
pub struct CurrentPriceResponse {
    pub phase: Phase,
    // None when nothing can be bought in the current phase
    pub price: Option<Uint128>,
}

#[cw_serde]
pub struct PricesResponse {
    pub auction_price: Option<Uint128>,
    pub last_price: Uint128,
    pub allowlist_price: Uint128,
    pub public_price: Uint128,
}

#[cw_serde]
pub struct UserInfoResponse {
    pub address: Addr,
    pub allowance: u64,
    pub pending: u64,
    pub minted: u64,
}

#[cw_serde]
pub struct QueueEntryInfo {
    pub entry_id: u64,
    pub entry: PreCommitEntry,
}

#[cw_serde]
pub struct PendingQueueResponse {
    pub cursor: u64,
    pub entries: Vec<QueueEntryInfo>,
}

#[cw_serde]
pub struct SaleStatsResponse {
    pub stats: SaleStats,
    pub supply_including_pending: u64,
    pub remaining_supply: u64,
}

#[cw_serde]
pub struct RegistrySupplyResponse {
    // as reported by the registry
    pub registry_count: u64,
    // as accounted by the launchpad
    pub minted_total: u64,
}

#[cw_serde]
pub struct RevealStatusResponse {
    pub ledger: Option<RevealLedger>,
    pub revealed_batches: Vec<RevealedBatch>,
}

#[cw_serde]
pub struct RevealedBatch {
    pub batch: u64,
    pub seed: u64,
}

#[cw_serde]
pub struct HasNextRevealResponse {
    pub has_next: bool,
}

#[cw_serde]
pub struct MetadataIndexResponse {
    pub item_id: u64,
    // None while the batch of the item is not revealed
    pub metadata_index: Option<u64>,
}
