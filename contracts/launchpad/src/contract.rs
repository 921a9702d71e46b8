#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    coins, to_json_binary, Addr, BankMsg, Binary, Deps, DepsMut, Env, Event, HexBinary,
    MessageInfo, Order, Response, Storage, Uint128,
};
use cw2::set_contract_version;
use cw_utils::may_pay;

use crate::error::{new_generic_error, ContractError};
use crate::msg::{
    AllowanceMsg, ExecuteMsg, InstantiateMsg, PricingMsg, RandomnessSourceMsg, ScheduleMsg,
};
use crate::phase::{phase_at, Phase, SaleSchedule};
use crate::pricing::{PriceCurve, Pricing};
use crate::query::{
    ConfigResponse, CurrentPhaseResponse, CurrentPriceResponse, HasNextRevealResponse,
    MetadataIndexResponse, PendingQueueResponse, PricesResponse, QueryMsg, QueueEntryInfo,
    RegistrySupplyResponse, RevealStatusResponse, RevealedBatch, SaleStatsResponse,
    ScheduleResponse, UserInfoResponse,
};
use crate::queue;
use crate::randomness::{block_randomness, job_id, oracle_randomness, request_randomness_msg};
use crate::registry::{mint_msg, query_num_tokens};
use crate::reveal::{BatchState, PendingReveal, RandomnessSource, RevealLedger};
use crate::state::{
    self, Config, SaleStats, BATCH_STATES, CONFIG, PRICING, QUEUE_CURSOR, QUEUE_NEXT_ID,
    REVEAL_LEDGER, SALE_STATS, SCHEDULE,
};

/// Contract name that is used for migration.
pub const CONTRACT_NAME: &str = env!("CARGO_PKG_NAME");
/// Contract version that is used for migration.
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

fn validate_config(config: &Config) -> Result<(), ContractError> {
    if config.collection_size == 0 {
        return Err(ContractError::InvalidCollectionConfig {
            reason: "collection size must be non-zero".to_string(),
        });
    }
    if config.max_per_tx == 0 || config.max_per_address == 0 {
        return Err(ContractError::InvalidCollectionConfig {
            reason: "per transaction and per address limits must be non-zero".to_string(),
        });
    }
    if config.payment_denom.is_empty() {
        return Err(ContractError::InvalidCollectionConfig {
            reason: "payment denom must be set".to_string(),
        });
    }

    let allocated = config
        .amount_for_auction
        .checked_add(config.amount_for_allowlist)
        .and_then(|sum| sum.checked_add(config.owner_reserve));
    match allocated {
        Some(allocated) if allocated <= config.collection_size => Ok(()),
        _ => Err(ContractError::InvalidCollectionConfig {
            reason: format!(
                "auction, allowlist and owner amounts exceed the collection size {}",
                config.collection_size
            ),
        }),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    let admin = match msg.admin {
        Some(admin) => deps.api.addr_validate(&admin)?,
        None => info.sender.clone(),
    };

    let config = Config {
        admin,
        collection: deps.api.addr_validate(&msg.collection)?,
        payment_denom: msg.payment_denom,
        collection_size: msg.collection_size,
        max_per_tx: msg.max_per_tx,
        max_per_address: msg.max_per_address,
        amount_for_auction: msg.amount_for_auction,
        amount_for_allowlist: msg.amount_for_allowlist,
        owner_reserve: msg.owner_reserve,
    };
    validate_config(&config)?;

    CONFIG.save(deps.storage, &config)?;
    SALE_STATS.save(deps.storage, &SaleStats::default())?;
    QUEUE_CURSOR.save(deps.storage, &0)?;
    QUEUE_NEXT_ID.save(deps.storage, &0)?;

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("admin", config.admin)
        .add_attribute("collection", config.collection)
        .add_attribute("collection_size", config.collection_size.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::ConfigureSchedule { schedule, pricing } => {
            execute_configure_schedule(deps, env, info, schedule, pricing)
        }
        ExecuteMsg::UpdatePhaseStart { phase, start } => {
            execute_update_phase_start(deps, env, info, phase, start)
        }
        ExecuteMsg::ConfigureReveal {
            batch_size,
            reveal_start,
            reveal_interval,
            randomness_source,
        } => execute_configure_reveal(
            deps,
            info,
            batch_size,
            reveal_start,
            reveal_interval,
            randomness_source,
        ),
        ExecuteMsg::SetAllowances { allowances } => {
            execute_set_allowances(deps, info, allowances)
        }
        ExecuteMsg::MintAuction { quantity } => execute_mint_auction(deps, env, info, quantity),
        ExecuteMsg::PreCommit { quantity } => execute_pre_commit(deps, env, info, quantity),
        ExecuteMsg::SettlePending { max_quantity } => {
            execute_settle_pending(deps, env, info, max_quantity)
        }
        ExecuteMsg::ClaimPreCommitted {} => execute_claim_pre_committed(deps, env, info),
        ExecuteMsg::MintAllowlist { quantity } => {
            execute_mint_allowlist(deps, env, info, quantity)
        }
        ExecuteMsg::MintPublic { quantity } => execute_mint_public(deps, env, info, quantity),
        ExecuteMsg::OwnerMint {
            recipient,
            quantity,
        } => execute_owner_mint(deps, info, recipient, quantity),
        ExecuteMsg::RevealNext {} => execute_reveal_next(deps, env),
        ExecuteMsg::ForceReveal {} => execute_force_reveal(deps, env, info),
        ExecuteMsg::ReceiveRandomness { job_id, randomness } => {
            execute_receive_randomness(deps, info, job_id, randomness)
        }
    }
}

/// Sets the sale schedule and its prices. Can only be done once, before the sale starts.
///
/// # Errors
/// Returns `Unauthorized` if sender is not the admin.
/// Returns `ScheduleAlreadyConfigured` if a schedule exists.
/// Returns `InvalidSchedule` if the boundaries are not strictly increasing or already reached.
/// Returns `InvalidPriceCurve` or `InvalidDiscount` if the prices are invalid.
pub fn execute_configure_schedule(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    schedule: ScheduleMsg,
    pricing: PricingMsg,
) -> Result<Response, ContractError> {
    state::assert_admin(deps.as_ref(), &info.sender)?;

    if SCHEDULE.exists(deps.storage) {
        return Err(ContractError::ScheduleAlreadyConfigured {});
    }

    let schedule = SaleSchedule {
        auction_start: schedule.auction_start,
        pre_commit_start: schedule.pre_commit_start,
        allowlist_start: schedule.allowlist_start,
        public_sale_start: schedule.public_sale_start,
        public_sale_end: schedule.public_sale_end,
    };
    schedule.validate()?;

    if schedule.first_boundary() <= env.block.time.seconds() {
        return Err(ContractError::InvalidSchedule {
            reason: "the sale must start in the future".to_string(),
        });
    }

    let curve = match (schedule.auction_start, pricing.auction) {
        (Some(_), Some(auction)) => Some(PriceCurve::new(
            auction.start_price,
            auction.floor_price,
            auction.duration,
            auction.drop_interval,
        )?),
        (None, None) => None,
        (Some(_), None) => {
            return Err(ContractError::InvalidPriceCurve {
                reason: "an auction phase needs a price curve".to_string(),
            })
        }
        (None, Some(_)) => {
            return Err(ContractError::InvalidPriceCurve {
                reason: "a price curve needs an auction phase".to_string(),
            })
        }
    };

    let pricing = Pricing::new(
        curve,
        pricing.flat_price,
        pricing.allowlist_discount_bps,
        pricing.public_discount_bps,
    )?;

    SCHEDULE.save(deps.storage, &schedule)?;
    PRICING.save(deps.storage, &pricing)?;

    Ok(Response::new()
        .add_attribute("action", "configure_schedule")
        .add_attribute("sender", info.sender)
        .add_attribute("first_phase_start", schedule.first_boundary().to_string())
        .add_attribute("public_sale_start", schedule.public_sale_start.to_string())
        .add_attribute("last_price", pricing.last_price))
}

/// Moves the start of a configured phase. Both the old and the new start must lie in the
/// future, so that the current phase never goes back.
///
/// # Errors
/// Returns `Unauthorized` if sender is not the admin.
/// Returns `ScheduleNotConfigured` if there is no schedule.
/// Returns `InvalidSchedule` if the phase is not configured, already started, or the new
/// schedule is not strictly increasing.
pub fn execute_update_phase_start(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    phase: Phase,
    start: u64,
) -> Result<Response, ContractError> {
    state::assert_admin(deps.as_ref(), &info.sender)?;

    let schedule = load_schedule(deps.storage)?;
    let now = env.block.time.seconds();

    let current_start = schedule
        .start_of(phase)
        .ok_or(ContractError::InvalidSchedule {
            reason: format!("{} is not part of the schedule", phase),
        })?;
    if current_start <= now {
        return Err(ContractError::InvalidSchedule {
            reason: format!("{} already started", phase),
        });
    }
    if start <= now {
        return Err(ContractError::InvalidSchedule {
            reason: "the new start must be in the future".to_string(),
        });
    }

    let updated = schedule.with_start(phase, start)?;
    updated.validate()?;
    SCHEDULE.save(deps.storage, &updated)?;

    Ok(Response::new()
        .add_attribute("action", "update_phase_start")
        .add_attribute("sender", info.sender)
        .add_attribute("phase", phase.to_string())
        .add_attribute("old_start", current_start.to_string())
        .add_attribute("new_start", start.to_string()))
}

/// Sets up the batch reveal. Can only be done once.
///
/// # Errors
/// Returns `Unauthorized` if sender is not the admin.
/// Returns `RevealAlreadyConfigured` if the reveal is already set up.
/// Returns `InvalidBatchSize` if the batch size does not divide the collection size.
pub fn execute_configure_reveal(
    deps: DepsMut,
    info: MessageInfo,
    batch_size: u64,
    reveal_start: u64,
    reveal_interval: u64,
    randomness_source: RandomnessSourceMsg,
) -> Result<Response, ContractError> {
    state::assert_admin(deps.as_ref(), &info.sender)?;

    if REVEAL_LEDGER.exists(deps.storage) {
        return Err(ContractError::RevealAlreadyConfigured {});
    }

    let config = CONFIG.load(deps.storage)?;
    let randomness_source = match randomness_source {
        RandomnessSourceMsg::Block {} => RandomnessSource::Block,
        RandomnessSourceMsg::Oracle { address } => RandomnessSource::Oracle {
            address: deps.api.addr_validate(&address)?,
        },
    };
    let source_name = match &randomness_source {
        RandomnessSource::Block => "block".to_string(),
        RandomnessSource::Oracle { address } => address.to_string(),
    };

    let ledger = RevealLedger::new(
        config.collection_size,
        batch_size,
        reveal_start,
        reveal_interval,
        randomness_source,
    )?;
    REVEAL_LEDGER.save(deps.storage, &ledger)?;

    Ok(Response::new()
        .add_attribute("action", "configure_reveal")
        .add_attribute("sender", info.sender)
        .add_attribute("batch_size", batch_size.to_string())
        .add_attribute("reveal_start", reveal_start.to_string())
        .add_attribute("reveal_interval", reveal_interval.to_string())
        .add_attribute("randomness_source", source_name))
}

/// Overwrites the allowlist allowance of the given addresses.
///
/// # Errors
/// Returns `Unauthorized` if sender is not the admin.
pub fn execute_set_allowances(
    deps: DepsMut,
    info: MessageInfo,
    allowances: Vec<AllowanceMsg>,
) -> Result<Response, ContractError> {
    state::assert_admin(deps.as_ref(), &info.sender)?;

    for allowance in &allowances {
        let address = deps.api.addr_validate(&allowance.address)?;
        state::set_allowance(deps.storage, &address, allowance.amount)?;
    }

    Ok(Response::new()
        .add_attribute("action", "set_allowances")
        .add_attribute("sender", info.sender)
        .add_attribute("count", allowances.len().to_string()))
}

/// Buys items at the current auction price. If fewer items than requested remain for the
/// auction, the quantity is reduced to what remains.
///
/// # Errors
/// Returns `WrongPhase` outside of the auction phase.
/// Returns `ZeroQuantity`, `MaxPerTransactionExceeded` or `MaxPerAddressExceeded` for invalid
/// quantities.
/// Returns `SupplyExhausted` if nothing remains for the auction.
/// Returns `InsufficientPayment` if the sent funds do not cover the price.
pub fn execute_mint_auction(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    quantity: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let schedule = load_schedule(deps.storage)?;
    let mut stats = SALE_STATS.load(deps.storage)?;
    let mut pricing = PRICING.load(deps.storage)?;
    let now = env.block.time.seconds();

    ensure_phase(&config, &schedule, &stats, now, &[Phase::Auction])?;
    ensure_quantity(&config, quantity)?;

    let remaining = config
        .amount_for_auction
        .saturating_sub(stats.auction_minted)
        .min(stats.remaining_supply(config.collection_size));
    if remaining == 0 {
        return Err(ContractError::SupplyExhausted {
            requested: quantity,
            remaining,
        });
    }
    let quantity = quantity.min(remaining);
    ensure_address_cap(deps.storage, &config, &info.sender, quantity)?;

    let (curve, auction_start) = match (&pricing.curve, schedule.auction_start) {
        (Some(curve), Some(auction_start)) => (curve, auction_start),
        _ => return Err(new_generic_error("auction is not configured")),
    };
    let price = curve.price_at(auction_start, now);
    let total_cost = price.checked_mul(Uint128::from(quantity))?;
    let refund = collect_payment(&config, &info, total_cost)?;

    pricing.record_purchase_price(price);
    stats.auction_minted += quantity;
    state::record_mint(deps.storage, &mut stats, &info.sender, quantity)?;

    PRICING.save(deps.storage, &pricing)?;
    SALE_STATS.save(deps.storage, &stats)?;

    let response = Response::new()
        .add_message(mint_msg(&config.collection, &info.sender, quantity)?)
        .add_attribute("action", "mint_auction")
        .add_attribute("sender", info.sender)
        .add_attribute("quantity", quantity.to_string())
        .add_attribute("price", price)
        .add_attribute("total_cost", total_cost);

    Ok(with_refund(response, refund))
}

/// Pre-commits to `quantity` items at the allowlist price. The items are minted when the queue
/// gets settled.
///
/// # Errors
/// Returns `WrongPhase` outside of the pre-commit phase.
/// Returns `ZeroQuantity`, `AllowanceExceeded` or `SupplyExhausted` for invalid quantities.
/// Returns `InsufficientPayment` if the sent funds do not cover the price.
pub fn execute_pre_commit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    quantity: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let schedule = load_schedule(deps.storage)?;
    let mut stats = SALE_STATS.load(deps.storage)?;
    let pricing = PRICING.load(deps.storage)?;

    ensure_phase(
        &config,
        &schedule,
        &stats,
        env.block.time.seconds(),
        &[Phase::PreCommit],
    )?;

    let price = pricing.allowlist_price();
    let total_cost = price.checked_mul(Uint128::from(quantity))?;
    let refund = collect_payment(&config, &info, total_cost)?;

    let entry_id = queue::enqueue(deps.storage, &config, &mut stats, &info.sender, quantity)?;
    SALE_STATS.save(deps.storage, &stats)?;

    let response = Response::new()
        .add_attribute("action", "pre_commit")
        .add_attribute("sender", info.sender)
        .add_attribute("entry_id", entry_id.to_string())
        .add_attribute("quantity", quantity.to_string())
        .add_attribute("price", price)
        .add_attribute("total_cost", total_cost);

    Ok(with_refund(response, refund))
}

/// Mints up to `max_quantity` pre-committed items in queue order. Anyone can trigger it once
/// the pre-commit phase is over.
///
/// # Errors
/// Returns `WrongPhase` before the allowlist phase.
/// Returns `ZeroQuantity` if `max_quantity` is zero while pre-commits are pending.
pub fn execute_settle_pending(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    max_quantity: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let schedule = load_schedule(deps.storage)?;
    let mut stats = SALE_STATS.load(deps.storage)?;

    ensure_phase(
        &config,
        &schedule,
        &stats,
        env.block.time.seconds(),
        &[Phase::Allowlist, Phase::PublicSale, Phase::Ended],
    )?;

    let allocations = queue::settle(deps.storage, &mut stats, max_quantity)?;
    SALE_STATS.save(deps.storage, &stats)?;

    if allocations.is_empty() {
        deps.api.debug("settle_pending: no pending pre-commits");
    }

    let mut response = Response::new();
    let mut settled = 0u64;
    for allocation in allocations {
        settled += allocation.quantity;
        response = response
            .add_message(mint_msg(
                &config.collection,
                &allocation.address,
                allocation.quantity,
            )?)
            .add_event(
                Event::new("allocation")
                    .add_attribute("entry_id", allocation.entry_id.to_string())
                    .add_attribute("address", allocation.address)
                    .add_attribute("quantity", allocation.quantity.to_string()),
            );
    }

    Ok(response
        .add_attribute("action", "settle_pending")
        .add_attribute("sender", info.sender)
        .add_attribute("settled", settled.to_string())
        .add_attribute("pending_left", stats.pending_total().to_string()))
}

/// Mints everything the sender has pre-committed and not received yet.
///
/// # Errors
/// Returns `WrongPhase` before the allowlist phase.
/// Returns `NothingToClaim` if the sender has nothing pending.
pub fn execute_claim_pre_committed(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let schedule = load_schedule(deps.storage)?;
    let mut stats = SALE_STATS.load(deps.storage)?;

    ensure_phase(
        &config,
        &schedule,
        &stats,
        env.block.time.seconds(),
        &[Phase::Allowlist, Phase::PublicSale, Phase::Ended],
    )?;

    let quantity = queue::claim(deps.storage, &mut stats, &info.sender)?;
    SALE_STATS.save(deps.storage, &stats)?;

    Ok(Response::new()
        .add_message(mint_msg(&config.collection, &info.sender, quantity)?)
        .add_attribute("action", "claim_pre_committed")
        .add_attribute("sender", info.sender)
        .add_attribute("quantity", quantity.to_string()))
}

/// Mints items at the allowlist price, out of the sender's allowance.
///
/// # Errors
/// Returns `WrongPhase` outside of the allowlist phase.
/// Returns `ZeroQuantity`, `AllowanceExceeded` or `SupplyExhausted` for invalid quantities.
/// Returns `InsufficientPayment` if the sent funds do not cover the price.
pub fn execute_mint_allowlist(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    quantity: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let schedule = load_schedule(deps.storage)?;
    let mut stats = SALE_STATS.load(deps.storage)?;
    let pricing = PRICING.load(deps.storage)?;

    ensure_phase(
        &config,
        &schedule,
        &stats,
        env.block.time.seconds(),
        &[Phase::Allowlist],
    )?;
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

    let price = pricing.allowlist_price();
    let total_cost = price.checked_mul(Uint128::from(quantity))?;
    let refund = collect_payment(&config, &info, total_cost)?;

    state::use_allowance(deps.storage, &info.sender, quantity)?;
    stats.allowlist_minted += quantity;
    state::record_mint(deps.storage, &mut stats, &info.sender, quantity)?;
    SALE_STATS.save(deps.storage, &stats)?;

    let response = Response::new()
        .add_message(mint_msg(&config.collection, &info.sender, quantity)?)
        .add_attribute("action", "mint_allowlist")
        .add_attribute("sender", info.sender)
        .add_attribute("quantity", quantity.to_string())
        .add_attribute("price", price)
        .add_attribute("total_cost", total_cost);

    Ok(with_refund(response, refund))
}

/// Mints items at the public price. The owner reserve that is not minted yet stays untouched.
///
/// # Errors
/// Returns `WrongPhase` outside of the public sale.
/// Returns `ZeroQuantity`, `MaxPerTransactionExceeded`, `MaxPerAddressExceeded` or
/// `SupplyExhausted` for invalid quantities.
/// Returns `InsufficientPayment` if the sent funds do not cover the price.
pub fn execute_mint_public(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    quantity: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let schedule = load_schedule(deps.storage)?;
    let mut stats = SALE_STATS.load(deps.storage)?;
    let pricing = PRICING.load(deps.storage)?;

    ensure_phase(
        &config,
        &schedule,
        &stats,
        env.block.time.seconds(),
        &[Phase::PublicSale],
    )?;
    ensure_quantity(&config, quantity)?;

    let unminted_reserve = config.owner_reserve.saturating_sub(stats.owner_minted);
    let remaining = stats
        .remaining_supply(config.collection_size)
        .saturating_sub(unminted_reserve);
    if quantity > remaining {
        return Err(ContractError::SupplyExhausted {
            requested: quantity,
            remaining,
        });
    }
    ensure_address_cap(deps.storage, &config, &info.sender, quantity)?;

    let price = pricing.public_price();
    let total_cost = price.checked_mul(Uint128::from(quantity))?;
    let refund = collect_payment(&config, &info, total_cost)?;

    stats.public_minted += quantity;
    state::record_mint(deps.storage, &mut stats, &info.sender, quantity)?;
    SALE_STATS.save(deps.storage, &stats)?;

    let response = Response::new()
        .add_message(mint_msg(&config.collection, &info.sender, quantity)?)
        .add_attribute("action", "mint_public")
        .add_attribute("sender", info.sender)
        .add_attribute("quantity", quantity.to_string())
        .add_attribute("price", price)
        .add_attribute("total_cost", total_cost);

    Ok(with_refund(response, refund))
}

/// Mints items out of the owner reserve, for free, in any phase.
///
/// # Errors
/// Returns `Unauthorized` if sender is not the admin.
/// Returns `ZeroQuantity` or `SupplyExhausted` for invalid quantities.
pub fn execute_owner_mint(
    deps: DepsMut,
    info: MessageInfo,
    recipient: String,
    quantity: u64,
) -> Result<Response, ContractError> {
    state::assert_admin(deps.as_ref(), &info.sender)?;

    let config = CONFIG.load(deps.storage)?;
    let mut stats = SALE_STATS.load(deps.storage)?;
    let recipient = deps.api.addr_validate(&recipient)?;

    if quantity == 0 {
        return Err(ContractError::ZeroQuantity {});
    }

    let remaining = config
        .owner_reserve
        .saturating_sub(stats.owner_minted)
        .min(stats.remaining_supply(config.collection_size));
    if quantity > remaining {
        return Err(ContractError::SupplyExhausted {
            requested: quantity,
            remaining,
        });
    }

    stats.owner_minted += quantity;
    state::record_mint(deps.storage, &mut stats, &recipient, quantity)?;
    SALE_STATS.save(deps.storage, &stats)?;

    Ok(Response::new()
        .add_message(mint_msg(&config.collection, &recipient, quantity)?)
        .add_attribute("action", "owner_mint")
        .add_attribute("sender", info.sender)
        .add_attribute("recipient", recipient)
        .add_attribute("quantity", quantity.to_string()))
}

/// Reveals the next batch once enough items are minted and its reveal time has come.
///
/// # Errors
/// Returns `RevealNotConfigured` if the reveal is not set up.
/// Returns `RevealNotReady` if the supply or time condition is not met.
/// Returns `RevealPending` while an oracle request is in flight.
pub fn execute_reveal_next(deps: DepsMut, env: Env) -> Result<Response, ContractError> {
    let ledger = load_reveal_ledger(deps.storage)?;
    let stats = SALE_STATS.load(deps.storage)?;

    ledger.ensure_next_ready(stats.minted_total, env.block.time)?;

    reveal_batch(deps, &env, ledger, "reveal_next")
}

/// Reveals the next batch regardless of minted supply and reveal time.
///
/// # Errors
/// Returns `Unauthorized` if sender is not the admin.
/// Returns `RevealNotReady` if every batch is revealed.
/// Returns `RevealPending` while an oracle request is in flight.
pub fn execute_force_reveal(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    state::assert_admin(deps.as_ref(), &info.sender)?;

    let ledger = load_reveal_ledger(deps.storage)?;
    ledger.ensure_revealable()?;

    reveal_batch(deps, &env, ledger, "force_reveal")
}

fn reveal_batch(
    deps: DepsMut,
    env: &Env,
    mut ledger: RevealLedger,
    action: &str,
) -> Result<Response, ContractError> {
    let batch = ledger.next_batch();

    match ledger.randomness_source.clone() {
        RandomnessSource::Block => {
            let seed = ledger.set_seed(deps.storage, batch, block_randomness(env, batch))?;
            REVEAL_LEDGER.save(deps.storage, &ledger)?;

            Ok(Response::new()
                .add_attribute("action", action)
                .add_attribute("batch", batch.to_string())
                .add_attribute("seed", seed.to_string())
                .add_attribute("last_revealed", ledger.last_revealed.to_string()))
        }
        RandomnessSource::Oracle { address } => {
            let job_id = job_id(batch);
            ledger.pending = Some(PendingReveal {
                batch,
                job_id: job_id.clone(),
            });
            REVEAL_LEDGER.save(deps.storage, &ledger)?;

            Ok(Response::new()
                .add_message(request_randomness_msg(&address, job_id.clone())?)
                .add_attribute("action", action)
                .add_attribute("batch", batch.to_string())
                .add_attribute("job_id", job_id)
                .add_attribute("status", "pending"))
        }
    }
}

/// Oracle callback that delivers the randomness of an in-flight reveal request.
///
/// # Errors
/// Returns `Unauthorized` if sender is not the configured oracle.
/// Returns `UnknownRandomnessJob` if `job_id` does not match the in-flight request.
/// Returns `InvalidRandomness` if too few random bytes are delivered.
pub fn execute_receive_randomness(
    deps: DepsMut,
    info: MessageInfo,
    job_id: String,
    randomness: HexBinary,
) -> Result<Response, ContractError> {
    let mut ledger = load_reveal_ledger(deps.storage)?;

    match &ledger.randomness_source {
        RandomnessSource::Oracle { address } if *address == info.sender => {}
        _ => return Err(ContractError::Unauthorized {}),
    }

    let batch = match &ledger.pending {
        Some(PendingReveal {
            batch,
            job_id: pending_job,
        }) if *pending_job == job_id => *batch,
        _ => return Err(ContractError::UnknownRandomnessJob { job_id }),
    };

    let seed = ledger.set_seed(deps.storage, batch, oracle_randomness(&randomness)?)?;
    REVEAL_LEDGER.save(deps.storage, &ledger)?;

    Ok(Response::new()
        .add_attribute("action", "receive_randomness")
        .add_attribute("job_id", job_id)
        .add_attribute("batch", batch.to_string())
        .add_attribute("seed", seed.to_string())
        .add_attribute("last_revealed", ledger.last_revealed.to_string()))
}

fn load_schedule(storage: &dyn Storage) -> Result<SaleSchedule, ContractError> {
    SCHEDULE
        .may_load(storage)?
        .ok_or(ContractError::ScheduleNotConfigured {})
}

fn load_reveal_ledger(storage: &dyn Storage) -> Result<RevealLedger, ContractError> {
    REVEAL_LEDGER
        .may_load(storage)?
        .ok_or(ContractError::RevealNotConfigured {})
}

fn current_phase(deps: Deps, env: &Env) -> Result<Phase, ContractError> {
    let schedule = match SCHEDULE.may_load(deps.storage)? {
        Some(schedule) => schedule,
        None => return Ok(Phase::NotStarted),
    };
    let config = CONFIG.load(deps.storage)?;
    let stats = SALE_STATS.load(deps.storage)?;

    Ok(phase_at(
        &schedule,
        env.block.time.seconds(),
        stats.is_sold_out(config.collection_size),
    ))
}

fn ensure_phase(
    config: &Config,
    schedule: &SaleSchedule,
    stats: &SaleStats,
    now: u64,
    allowed: &[Phase],
) -> Result<Phase, ContractError> {
    let current = phase_at(schedule, now, stats.is_sold_out(config.collection_size));
    if !allowed.contains(&current) {
        return Err(ContractError::WrongPhase { current });
    }
    Ok(current)
}

fn ensure_quantity(config: &Config, quantity: u64) -> Result<(), ContractError> {
    if quantity == 0 {
        return Err(ContractError::ZeroQuantity {});
    }
    if quantity > config.max_per_tx {
        return Err(ContractError::MaxPerTransactionExceeded {
            max: config.max_per_tx,
        });
    }
    Ok(())
}

// minted plus pending items of an address, after this mint, must stay within the address cap
fn ensure_address_cap(
    storage: &dyn Storage,
    config: &Config,
    address: &Addr,
    quantity: u64,
) -> Result<(), ContractError> {
    let owned = state::get_minted_by(storage, address)? + state::get_pending(storage, address)?;
    if owned + quantity > config.max_per_address {
        return Err(ContractError::MaxPerAddressExceeded {
            max: config.max_per_address,
        });
    }
    Ok(())
}

/// Checks that the sender paid at least `required` in the payment denom and returns the refund
/// of any excess. The refund is sent after all state changes of the call are written.
fn collect_payment(
    config: &Config,
    info: &MessageInfo,
    required: Uint128,
) -> Result<Option<BankMsg>, ContractError> {
    let sent = may_pay(info, &config.payment_denom)?;
    if sent < required {
        return Err(ContractError::InsufficientPayment { required, sent });
    }

    let excess = sent - required;
    if excess.is_zero() {
        return Ok(None);
    }

    Ok(Some(BankMsg::Send {
        to_address: info.sender.to_string(),
        amount: coins(excess.u128(), &config.payment_denom),
    }))
}

fn with_refund(response: Response, refund: Option<BankMsg>) -> Response {
    match refund {
        Some(refund) => response.add_message(refund),
        None => response,
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    let binary = match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::Schedule {} => to_json_binary(&query_schedule(deps)?),
        QueryMsg::CurrentPhase {} => to_json_binary(&query_current_phase(deps, env)?),
        QueryMsg::CurrentPrice {} => to_json_binary(&query_current_price(deps, env)?),
        QueryMsg::Prices {} => to_json_binary(&query_prices(deps, env)?),
        QueryMsg::UserInfo { address } => to_json_binary(&query_user_info(deps, address)?),
        QueryMsg::PendingQueue { start_after, limit } => {
            to_json_binary(&query_pending_queue(deps, start_after, limit)?)
        }
        QueryMsg::SaleStats {} => to_json_binary(&query_sale_stats(deps)?),
        QueryMsg::RegistrySupply {} => to_json_binary(&query_registry_supply(deps)?),
        QueryMsg::RevealStatus {} => to_json_binary(&query_reveal_status(deps)?),
        QueryMsg::HasNextReveal {} => to_json_binary(&query_has_next_reveal(deps, env)?),
        QueryMsg::MetadataIndex { item_id } => {
            to_json_binary(&query_metadata_index(deps, item_id)?)
        }
    }?;

    Ok(binary)
}

pub fn query_config(deps: Deps) -> Result<ConfigResponse, ContractError> {
    Ok(ConfigResponse {
        config: CONFIG.load(deps.storage)?,
    })
}

pub fn query_schedule(deps: Deps) -> Result<ScheduleResponse, ContractError> {
    Ok(ScheduleResponse {
        schedule: SCHEDULE.may_load(deps.storage)?,
        pricing: PRICING.may_load(deps.storage)?,
    })
}

pub fn query_current_phase(deps: Deps, env: Env) -> Result<CurrentPhaseResponse, ContractError> {
    Ok(CurrentPhaseResponse {
        phase: current_phase(deps, &env)?,
    })
}

/// Price of one item in the current phase. Pre-commits are paid at the allowlist price.
pub fn query_current_price(deps: Deps, env: Env) -> Result<CurrentPriceResponse, ContractError> {
    let phase = current_phase(deps, &env)?;
    let (schedule, pricing) = match (
        SCHEDULE.may_load(deps.storage)?,
        PRICING.may_load(deps.storage)?,
    ) {
        (Some(schedule), Some(pricing)) => (schedule, pricing),
        _ => return Ok(CurrentPriceResponse { phase, price: None }),
    };

    let price = match phase {
        Phase::Auction => auction_price(&schedule, &pricing, env.block.time.seconds()),
        Phase::PreCommit | Phase::Allowlist => Some(pricing.allowlist_price()),
        Phase::PublicSale => Some(pricing.public_price()),
        Phase::NotStarted | Phase::Ended => None,
    };

    Ok(CurrentPriceResponse { phase, price })
}

pub fn query_prices(deps: Deps, env: Env) -> Result<PricesResponse, ContractError> {
    let schedule = load_schedule(deps.storage)?;
    let pricing = PRICING.load(deps.storage)?;

    Ok(PricesResponse {
        auction_price: auction_price(&schedule, &pricing, env.block.time.seconds()),
        last_price: pricing.last_price,
        allowlist_price: pricing.allowlist_price(),
        public_price: pricing.public_price(),
    })
}

fn auction_price(schedule: &SaleSchedule, pricing: &Pricing, now: u64) -> Option<Uint128> {
    match (&pricing.curve, schedule.auction_start) {
        (Some(curve), Some(start)) => Some(curve.price_at(start, now)),
        _ => None,
    }
}

pub fn query_user_info(deps: Deps, address: String) -> Result<UserInfoResponse, ContractError> {
    let address = deps.api.addr_validate(&address)?;

    Ok(UserInfoResponse {
        allowance: state::get_allowance(deps.storage, &address)?,
        pending: state::get_pending(deps.storage, &address)?,
        minted: state::get_minted_by(deps.storage, &address)?,
        address,
    })
}

pub fn query_pending_queue(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> Result<PendingQueueResponse, ContractError> {
    let entries = queue::pending_entries(deps.storage, start_after, limit)?
        .into_iter()
        .map(|(entry_id, entry)| QueueEntryInfo { entry_id, entry })
        .collect();

    Ok(PendingQueueResponse {
        cursor: queue::queue_cursor(deps.storage)?,
        entries,
    })
}

pub fn query_sale_stats(deps: Deps) -> Result<SaleStatsResponse, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let stats = SALE_STATS.load(deps.storage)?;

    Ok(SaleStatsResponse {
        supply_including_pending: stats.supply_including_pending(),
        remaining_supply: stats.remaining_supply(config.collection_size),
        stats,
    })
}

pub fn query_registry_supply(deps: Deps) -> Result<RegistrySupplyResponse, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let stats = SALE_STATS.load(deps.storage)?;

    Ok(RegistrySupplyResponse {
        registry_count: query_num_tokens(deps, &config.collection)?,
        minted_total: stats.minted_total,
    })
}

pub fn query_reveal_status(deps: Deps) -> Result<RevealStatusResponse, ContractError> {
    let revealed_batches = BATCH_STATES
        .range(deps.storage, None, None, Order::Ascending)
        .filter_map(|item| match item {
            Ok((batch, BatchState::Revealed { seed })) => Some(Ok(RevealedBatch { batch, seed })),
            Ok((_, BatchState::Unrevealed)) => None,
            Err(err) => Some(Err(err)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RevealStatusResponse {
        ledger: REVEAL_LEDGER.may_load(deps.storage)?,
        revealed_batches,
    })
}

pub fn query_has_next_reveal(deps: Deps, env: Env) -> Result<HasNextRevealResponse, ContractError> {
    let has_next = match REVEAL_LEDGER.may_load(deps.storage)? {
        Some(ledger) => {
            let stats = SALE_STATS.load(deps.storage)?;
            ledger.has_next(stats.minted_total, env.block.time)
        }
        None => false,
    };

    Ok(HasNextRevealResponse { has_next })
}

/// Metadata index assigned to `item_id`, once its batch is revealed.
///
/// # Errors
/// Returns `RevealNotConfigured` if the reveal is not set up.
/// Returns an error if `item_id` is outside of the collection.
pub fn query_metadata_index(
    deps: Deps,
    item_id: u64,
) -> Result<MetadataIndexResponse, ContractError> {
    let ledger = load_reveal_ledger(deps.storage)?;
    if item_id >= ledger.collection_size {
        return Err(new_generic_error(format!(
            "item {} is outside of the collection of {} items",
            item_id, ledger.collection_size
        )));
    }

    Ok(MetadataIndexResponse {
        item_id,
        metadata_index: ledger.metadata_index(deps.storage, item_id)?,
    })
}
