use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Deps, StdResult, Storage};
use cw_storage_plus::{Item, Map};

use crate::error::ContractError;
use crate::phase::SaleSchedule;
use crate::pricing::Pricing;
use crate::queue::PreCommitEntry;
use crate::reveal::{BatchState, RevealLedger};

#[cw_serde]
pub struct Config {
    pub admin: Addr,
    // registry contract that mints the items; this contract must be its only minter
    pub collection: Addr,
    pub payment_denom: String,
    pub collection_size: u64,
    pub max_per_tx: u64,
    pub max_per_address: u64,
    pub amount_for_auction: u64,
    // shared by pre-commits and allowlist mints
    pub amount_for_allowlist: u64,
    pub owner_reserve: u64,
}

/// Running sale counters. All of them only ever grow.
#[cw_serde]
#[derive(Default)]
pub struct SaleStats {
    pub auction_minted: u64,
    pub allowlist_minted: u64,
    pub public_minted: u64,
    pub owner_minted: u64,
    pub pre_committed: u64,
    pub pre_commit_settled: u64,
    pub minted_total: u64,
}

impl SaleStats {
    /// Items minted so far plus items promised to pre-commits that are not settled yet.
    pub fn supply_including_pending(&self) -> u64 {
        self.minted_total + self.pre_committed - self.pre_commit_settled
    }

    pub fn pending_total(&self) -> u64 {
        self.pre_committed - self.pre_commit_settled
    }

    pub fn is_sold_out(&self, collection_size: u64) -> bool {
        self.supply_including_pending() >= collection_size
    }

    pub fn remaining_supply(&self, collection_size: u64) -> u64 {
        collection_size.saturating_sub(self.supply_including_pending())
    }
}

pub const CONFIG: Item<Config> = Item::new("config");

pub const SCHEDULE: Item<SaleSchedule> = Item::new("schedule");

pub const PRICING: Item<Pricing> = Item::new("pricing");

pub const SALE_STATS: Item<SaleStats> = Item::new("sale_stats");

pub const REVEAL_LEDGER: Item<RevealLedger> = Item::new("reveal_ledger");

// BATCH_STATES: key(batch_number) -> BatchState
pub const BATCH_STATES: Map<u64, BatchState> = Map::new("batch_states");

/// How many items each address may still pre-commit or mint during the allowlist phase.
///
/// ALLOWANCES: key(user_address) -> remaining allowance
pub const ALLOWANCES: Map<Addr, u64> = Map::new("allowances");

// PENDING: key(user_address) -> pre-committed amount not settled yet
pub const PENDING: Map<Addr, u64> = Map::new("pending");

// MINTED_BY: key(user_address) -> amount minted to the address, all phases included
pub const MINTED_BY: Map<Addr, u64> = Map::new("minted_by");

/// Pre-commit queue. Entries in `[QUEUE_CURSOR, QUEUE_NEXT_ID)` may still hold a remainder.
///
/// PRE_COMMIT_QUEUE: key(entry_id) -> PreCommitEntry
pub const PRE_COMMIT_QUEUE: Map<u64, PreCommitEntry> = Map::new("pre_commit_queue");
pub const QUEUE_CURSOR: Item<u64> = Item::new("queue_cursor");
pub const QUEUE_NEXT_ID: Item<u64> = Item::new("queue_next_id");

pub const DEFAULT_QUERY_LIMIT: u32 = 10;
pub const MAX_QUERY_LIMIT: u32 = 100;

/// Verifies that the sender is the admin.
///
/// # Errors
/// Returns `Unauthorized` if sender is not the admin.
pub fn assert_admin(deps: Deps, sender: &Addr) -> Result<(), ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.admin != *sender {
        return Err(ContractError::Unauthorized {});
    }
    Ok(())
}

pub fn get_allowance(storage: &dyn Storage, address: &Addr) -> StdResult<u64> {
    Ok(ALLOWANCES
        .may_load(storage, address.clone())?
        .unwrap_or_default())
}

pub fn set_allowance(storage: &mut dyn Storage, address: &Addr, amount: u64) -> StdResult<()> {
    ALLOWANCES.save(storage, address.clone(), &amount)
}

/// Takes `quantity` out of the allowance of `address`.
///
/// # Errors
/// Returns `AllowanceExceeded` if the remaining allowance is smaller than `quantity`.
pub fn use_allowance(
    storage: &mut dyn Storage,
    address: &Addr,
    quantity: u64,
) -> Result<(), ContractError> {
    let available = get_allowance(storage, address)?;
    if quantity > available {
        return Err(ContractError::AllowanceExceeded {
            requested: quantity,
            available,
        });
    }

    set_allowance(storage, address, available - quantity)?;
    Ok(())
}

pub fn get_pending(storage: &dyn Storage, address: &Addr) -> StdResult<u64> {
    Ok(PENDING
        .may_load(storage, address.clone())?
        .unwrap_or_default())
}

pub fn set_pending(storage: &mut dyn Storage, address: &Addr, amount: u64) -> StdResult<()> {
    if amount == 0 {
        PENDING.remove(storage, address.clone());
        return Ok(());
    }
    PENDING.save(storage, address.clone(), &amount)
}

pub fn get_minted_by(storage: &dyn Storage, address: &Addr) -> StdResult<u64> {
    Ok(MINTED_BY
        .may_load(storage, address.clone())?
        .unwrap_or_default())
}

/// Records `quantity` items minted to `address` in the per-address and the total counters.
pub fn record_mint(
    storage: &mut dyn Storage,
    stats: &mut SaleStats,
    address: &Addr,
    quantity: u64,
) -> StdResult<()> {
    let minted = get_minted_by(storage, address)?;
    MINTED_BY.save(storage, address.clone(), &(minted + quantity))?;
    stats.minted_total += quantity;
    Ok(())
}
