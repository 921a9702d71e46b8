use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Order, StdResult, Storage};
use cw_storage_plus::Bound;

use crate::error::ContractError;
use crate::state::{
    get_pending, record_mint, set_pending, use_allowance, Config, SaleStats, DEFAULT_QUERY_LIMIT,
    MAX_QUERY_LIMIT, PRE_COMMIT_QUEUE, QUEUE_CURSOR, QUEUE_NEXT_ID,
};

#[cw_serde]
pub struct PreCommitEntry {
    pub address: Addr,
    pub remaining: u64,
}

/// Quantity handed out to one queue entry by a settlement.
#[cw_serde]
pub struct Allocation {
    pub entry_id: u64,
    pub address: Addr,
    pub quantity: u64,
}

/// Appends a pre-commit of `quantity` items for `address` to the queue and returns its entry id.
///
/// # Errors
/// Returns `ZeroQuantity` if `quantity` is zero.
/// Returns `AllowanceExceeded` if the address has less allowance left than `quantity`.
/// Returns `SupplyExhausted` if the allowlist allocation cannot cover `quantity`.
pub fn enqueue(
    storage: &mut dyn Storage,
    config: &Config,
    stats: &mut SaleStats,
    address: &Addr,
    quantity: u64,
) -> Result<u64, ContractError> {
    if quantity == 0 {
        return Err(ContractError::ZeroQuantity {});
    }

    let remaining = config
        .amount_for_allowlist
        .saturating_sub(stats.pre_committed + stats.allowlist_minted)
        .min(stats.remaining_supply(config.collection_size));
    if quantity > remaining {
        return Err(ContractError::SupplyExhausted {
            requested: quantity,
            remaining,
        });
    }

    use_allowance(storage, address, quantity)?;

    let entry_id = QUEUE_NEXT_ID.may_load(storage)?.unwrap_or_default();
    PRE_COMMIT_QUEUE.save(
        storage,
        entry_id,
        &PreCommitEntry {
            address: address.clone(),
            remaining: quantity,
        },
    )?;
    QUEUE_NEXT_ID.save(storage, &(entry_id + 1))?;

    let pending = get_pending(storage, address)?;
    set_pending(storage, address, pending + quantity)?;
    stats.pre_committed += quantity;

    Ok(entry_id)
}

/// Settles up to `max_quantity` pre-committed items in strict FIFO order.
///
/// Each entry receives as much as it still holds, bounded by the remaining budget and by the
/// amount its owner has not claimed yet. Consumed entries are removed and the cursor moves past
/// them; a partially served entry keeps its reduced remainder at the head of the queue.
/// Settling an empty queue is a no-op for any `max_quantity`.
///
/// # Errors
/// Returns `ZeroQuantity` if something is pending and `max_quantity` is zero.
pub fn settle(
    storage: &mut dyn Storage,
    stats: &mut SaleStats,
    max_quantity: u64,
) -> Result<Vec<Allocation>, ContractError> {
    let mut allocations = vec![];
    if stats.pending_total() == 0 {
        return Ok(allocations);
    }

    if max_quantity == 0 {
        return Err(ContractError::ZeroQuantity {});
    }

    let mut cursor = QUEUE_CURSOR.may_load(storage)?.unwrap_or_default();
    let next_id = QUEUE_NEXT_ID.may_load(storage)?.unwrap_or_default();
    let mut budget = max_quantity;

    while budget > 0 && cursor < next_id {
        let mut entry = PRE_COMMIT_QUEUE.load(storage, cursor)?;
        let pending = get_pending(storage, &entry.address)?;
        let quantity = entry.remaining.min(pending).min(budget);

        if quantity > 0 {
            set_pending(storage, &entry.address, pending - quantity)?;
            record_mint(storage, stats, &entry.address, quantity)?;
            stats.pre_commit_settled += quantity;
            budget -= quantity;

            allocations.push(Allocation {
                entry_id: cursor,
                address: entry.address.clone(),
                quantity,
            });
        }

        entry.remaining -= quantity;
        // an entry whose owner already claimed everything is consumed as well
        if entry.remaining == 0 || pending == quantity {
            PRE_COMMIT_QUEUE.remove(storage, cursor);
            cursor += 1;
        } else {
            PRE_COMMIT_QUEUE.save(storage, cursor, &entry)?;
        }
    }

    QUEUE_CURSOR.save(storage, &cursor)?;

    Ok(allocations)
}

/// Settles everything `address` has pre-committed, out of queue order. The queue entries of the
/// address are skipped by later settlements.
///
/// # Errors
/// Returns `NothingToClaim` if the address has no pending pre-commit.
pub fn claim(
    storage: &mut dyn Storage,
    stats: &mut SaleStats,
    address: &Addr,
) -> Result<u64, ContractError> {
    let pending = get_pending(storage, address)?;
    if pending == 0 {
        return Err(ContractError::NothingToClaim {});
    }

    set_pending(storage, address, 0)?;
    record_mint(storage, stats, address, pending)?;
    stats.pre_commit_settled += pending;

    Ok(pending)
}

/// Entries still waiting in the queue, from the cursor on, with pagination.
pub fn pending_entries(
    storage: &dyn Storage,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Vec<(u64, PreCommitEntry)>> {
    let limit = limit.unwrap_or(DEFAULT_QUERY_LIMIT).min(MAX_QUERY_LIMIT) as usize;
    let cursor = QUEUE_CURSOR.may_load(storage)?.unwrap_or_default();

    let min = match start_after {
        Some(start_after) if start_after >= cursor => Bound::exclusive(start_after),
        _ => Bound::inclusive(cursor),
    };

    PRE_COMMIT_QUEUE
        .range(storage, Some(min), None, Order::Ascending)
        .take(limit)
        .collect()
}

pub fn queue_cursor(storage: &dyn Storage) -> StdResult<u64> {
    Ok(QUEUE_CURSOR.may_load(storage)?.unwrap_or_default())
}
