use cosmwasm_std::{from_json, BankMsg, CosmosMsg, Deps, Env, Response, Uint128};
use proptest::prelude::*;

use crate::contract::{execute, instantiate, query};
use crate::error::ContractError;
use crate::msg::{ExecuteMsg, InstantiateMsg, PricingMsg, ScheduleMsg};
use crate::phase::Phase;
use crate::query::{
    CurrentPhaseResponse, CurrentPriceResponse, PendingQueueResponse, PricesResponse, QueryMsg,
    RegistrySupplyResponse, SaleStatsResponse, ScheduleResponse, UserInfoResponse,
};
use crate::registry::mint_msg;
use crate::testing_mocks::{
    at, get_auction_pricing, get_default_instantiate_msg, get_full_schedule, get_message_info,
    mock_registry, payment, set_allowance, setup, setup_sale, MockDeps, ALLOWLIST_START,
    AUCTION_START, GENESIS, PRE_COMMIT_START, PUBLIC_SALE_END, PUBLIC_SALE_START,
};

fn query_phase(deps: Deps, env: &Env) -> Phase {
    let res = query(deps, env.clone(), QueryMsg::CurrentPhase {}).unwrap();
    from_json::<CurrentPhaseResponse>(&res).unwrap().phase
}

fn query_prices(deps: Deps, env: &Env) -> PricesResponse {
    let res = query(deps, env.clone(), QueryMsg::Prices {}).unwrap();
    from_json(&res).unwrap()
}

fn query_user(deps: &MockDeps, env: &Env, user: &str) -> UserInfoResponse {
    let msg = QueryMsg::UserInfo {
        address: deps.api.addr_make(user).to_string(),
    };
    from_json(&query(deps.as_ref(), env.clone(), msg).unwrap()).unwrap()
}

fn query_stats(deps: Deps, env: &Env) -> SaleStatsResponse {
    from_json(&query(deps, env.clone(), QueryMsg::SaleStats {}).unwrap()).unwrap()
}

fn attribute<'a>(res: &'a Response, key: &str) -> &'a str {
    res.attributes
        .iter()
        .find(|attr| attr.key == key)
        .map(|attr| attr.value.as_str())
        .unwrap()
}

fn flat_schedule() -> (ScheduleMsg, PricingMsg) {
    (
        ScheduleMsg {
            auction_start: None,
            pre_commit_start: None,
            allowlist_start: None,
            public_sale_start: PUBLIC_SALE_START,
            public_sale_end: None,
        },
        PricingMsg {
            auction: None,
            flat_price: Some(Uint128::new(500)),
            allowlist_discount_bps: 0,
            public_discount_bps: 0,
        },
    )
}

fn instantiate_with(deps: &mut MockDeps, env: &Env, msg: InstantiateMsg) {
    let info = get_message_info(&deps.api, "admin", &[]);
    instantiate(deps.as_mut(), env.clone(), info, msg).unwrap();
}

#[test]
fn instantiate_test() {
    let (mut deps, env) = setup();
    let info = get_message_info(&deps.api, "admin", &[]);
    let msg = get_default_instantiate_msg(&deps.api);

    let res = instantiate(deps.as_mut(), env.clone(), info.clone(), msg);
    assert!(res.is_ok());

    let res = query(deps.as_ref(), env.clone(), QueryMsg::Schedule {}).unwrap();
    let schedule: ScheduleResponse = from_json(&res).unwrap();
    assert_eq!(schedule.schedule, None);
    assert_eq!(query_phase(deps.as_ref(), &env), Phase::NotStarted);

    let stats = query_stats(deps.as_ref(), &env);
    assert_eq!(stats.remaining_supply, 100);
    assert_eq!(stats.stats.minted_total, 0);
}

#[test]
fn instantiate_rejects_invalid_allocations() {
    let (mut deps, env) = setup();
    let info = get_message_info(&deps.api, "admin", &[]);

    let mut msg = get_default_instantiate_msg(&deps.api);
    msg.amount_for_auction = 61;
    let err = instantiate(deps.as_mut(), env.clone(), info.clone(), msg).unwrap_err();
    assert!(matches!(err, ContractError::InvalidCollectionConfig { .. }));

    let mut msg = get_default_instantiate_msg(&deps.api);
    msg.collection_size = 0;
    let err = instantiate(deps.as_mut(), env.clone(), info.clone(), msg).unwrap_err();
    assert!(matches!(err, ContractError::InvalidCollectionConfig { .. }));

    let mut msg = get_default_instantiate_msg(&deps.api);
    msg.max_per_tx = 0;
    let err = instantiate(deps.as_mut(), env, info, msg).unwrap_err();
    assert!(matches!(err, ContractError::InvalidCollectionConfig { .. }));
}

#[test]
fn configure_schedule_test() {
    let (mut deps, env) = setup();
    let msg = get_default_instantiate_msg(&deps.api);
    instantiate_with(&mut deps, &env, msg);

    let msg = ExecuteMsg::ConfigureSchedule {
        schedule: get_full_schedule(),
        pricing: get_auction_pricing(),
    };

    let user = get_message_info(&deps.api, "user1", &[]);
    let err = execute(deps.as_mut(), env.clone(), user, msg.clone()).unwrap_err();
    assert_eq!(err, ContractError::Unauthorized {});

    // starts in the past
    let admin = get_message_info(&deps.api, "admin", &[]);
    let err = execute(
        deps.as_mut(),
        at(&env, AUCTION_START),
        admin.clone(),
        msg.clone(),
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::InvalidSchedule { .. }));

    // auction phase without a curve
    let mut pricing = get_auction_pricing();
    pricing.auction = None;
    pricing.flat_price = Some(Uint128::new(100));
    let bad = ExecuteMsg::ConfigureSchedule {
        schedule: get_full_schedule(),
        pricing,
    };
    let err = execute(deps.as_mut(), env.clone(), admin.clone(), bad).unwrap_err();
    assert!(matches!(err, ContractError::InvalidPriceCurve { .. }));

    let mut pricing = get_auction_pricing();
    pricing.public_discount_bps = 10_001;
    let bad = ExecuteMsg::ConfigureSchedule {
        schedule: get_full_schedule(),
        pricing,
    };
    let err = execute(deps.as_mut(), env.clone(), admin.clone(), bad).unwrap_err();
    assert_eq!(
        err,
        ContractError::InvalidDiscount {
            discount_bps: 10_001,
            max_bps: 10_000
        }
    );

    let mut schedule = get_full_schedule();
    schedule.allowlist_start = Some(PRE_COMMIT_START);
    let bad = ExecuteMsg::ConfigureSchedule {
        schedule,
        pricing: get_auction_pricing(),
    };
    let err = execute(deps.as_mut(), env.clone(), admin.clone(), bad).unwrap_err();
    assert!(matches!(err, ContractError::InvalidSchedule { .. }));

    let res = execute(deps.as_mut(), env.clone(), admin.clone(), msg.clone());
    assert!(res.is_ok());

    let err = execute(deps.as_mut(), env.clone(), admin, msg).unwrap_err();
    assert_eq!(err, ContractError::ScheduleAlreadyConfigured {});

    let prices = query_prices(deps.as_ref(), &env);
    assert_eq!(prices.last_price, Uint128::new(1_000));
    assert_eq!(prices.allowlist_price, Uint128::new(800));
    assert_eq!(prices.public_price, Uint128::new(900));
}

#[test]
fn phases_follow_block_time() {
    let (mut deps, env) = setup();
    setup_sale(&mut deps, &env);

    let expected = [
        (GENESIS, Phase::NotStarted),
        (AUCTION_START - 1, Phase::NotStarted),
        (AUCTION_START, Phase::Auction),
        (PRE_COMMIT_START, Phase::PreCommit),
        (ALLOWLIST_START + 10, Phase::Allowlist),
        (PUBLIC_SALE_START, Phase::PublicSale),
        (PUBLIC_SALE_END, Phase::Ended),
    ];
    for (time, phase) in expected {
        assert_eq!(query_phase(deps.as_ref(), &at(&env, time)), phase);
    }

    let res = query(
        deps.as_ref(),
        at(&env, AUCTION_START + 150),
        QueryMsg::CurrentPrice {},
    )
    .unwrap();
    let price: CurrentPriceResponse = from_json(&res).unwrap();
    assert_eq!(price.phase, Phase::Auction);
    assert_eq!(price.price, Some(Uint128::new(900)));

    let res = query(deps.as_ref(), env.clone(), QueryMsg::CurrentPrice {}).unwrap();
    let price: CurrentPriceResponse = from_json(&res).unwrap();
    assert_eq!(price.price, None);
}

#[test]
fn update_phase_start_test() {
    let (mut deps, env) = setup();
    setup_sale(&mut deps, &env);
    let admin = get_message_info(&deps.api, "admin", &[]);

    let msg = ExecuteMsg::UpdatePhaseStart {
        phase: Phase::Allowlist,
        start: ALLOWLIST_START + 500,
    };
    let res = execute(deps.as_mut(), at(&env, AUCTION_START), admin.clone(), msg);
    assert!(res.is_ok());
    assert_eq!(
        query_phase(deps.as_ref(), &at(&env, ALLOWLIST_START + 100)),
        Phase::PreCommit
    );

    // would overtake the public sale
    let msg = ExecuteMsg::UpdatePhaseStart {
        phase: Phase::Allowlist,
        start: PUBLIC_SALE_START,
    };
    let err = execute(deps.as_mut(), env.clone(), admin.clone(), msg).unwrap_err();
    assert!(matches!(err, ContractError::InvalidSchedule { .. }));

    // the auction already started
    let msg = ExecuteMsg::UpdatePhaseStart {
        phase: Phase::Auction,
        start: AUCTION_START + 100,
    };
    let err = execute(deps.as_mut(), at(&env, AUCTION_START + 1), admin, msg).unwrap_err();
    assert!(matches!(err, ContractError::InvalidSchedule { .. }));
}

#[test]
fn mint_auction_test() {
    let (mut deps, env) = setup();
    setup_sale(&mut deps, &env);
    let collection = deps.api.addr_make("collection");
    let user = deps.api.addr_make("user1");

    let msg = ExecuteMsg::MintAuction { quantity: 2 };
    let info = get_message_info(&deps.api, "user1", &payment(2_000));

    let err = execute(deps.as_mut(), env.clone(), info.clone(), msg.clone()).unwrap_err();
    assert_eq!(
        err,
        ContractError::WrongPhase {
            current: Phase::NotStarted
        }
    );

    // second step of the curve
    let env = at(&env, AUCTION_START + 150);
    let res = execute(deps.as_mut(), env.clone(), info, msg).unwrap();
    assert_eq!(res.messages.len(), 2);
    assert_eq!(res.messages[0].msg, mint_msg(&collection, &user, 2).unwrap());
    assert_eq!(
        res.messages[1].msg,
        CosmosMsg::Bank(BankMsg::Send {
            to_address: user.to_string(),
            amount: payment(200),
        })
    );
    assert_eq!(attribute(&res, "total_cost"), "1800");

    let prices = query_prices(deps.as_ref(), &env);
    assert_eq!(prices.last_price, Uint128::new(900));
    assert_eq!(prices.allowlist_price, Uint128::new(720));
    assert_eq!(prices.public_price, Uint128::new(810));

    let info = query_user(&deps, &env, "user1");
    assert_eq!(info.minted, 2);

    let stats = query_stats(deps.as_ref(), &env);
    assert_eq!(stats.stats.auction_minted, 2);
    assert_eq!(stats.stats.minted_total, 2);
}

#[test]
fn mint_auction_payment_and_limits() {
    let (mut deps, env) = setup();
    setup_sale(&mut deps, &env);
    let env = at(&env, AUCTION_START);

    let info = get_message_info(&deps.api, "user1", &payment(1_000));
    let err = execute(
        deps.as_mut(),
        env.clone(),
        info.clone(),
        ExecuteMsg::MintAuction { quantity: 2 },
    )
    .unwrap_err();
    assert_eq!(
        err,
        ContractError::InsufficientPayment {
            required: Uint128::new(2_000),
            sent: Uint128::new(1_000)
        }
    );

    let err = execute(
        deps.as_mut(),
        env.clone(),
        info,
        ExecuteMsg::MintAuction { quantity: 6 },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::MaxPerTransactionExceeded { max: 5 });

    let wrong_denom = get_message_info(&deps.api, "user1", &[cosmwasm_std::coin(1_000, "uatom")]);
    let err = execute(
        deps.as_mut(),
        env.clone(),
        wrong_denom,
        ExecuteMsg::MintAuction { quantity: 1 },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::PaymentError(_)));

    let info = get_message_info(&deps.api, "user1", &payment(5_000));
    for _ in 0..2 {
        execute(
            deps.as_mut(),
            env.clone(),
            info.clone(),
            ExecuteMsg::MintAuction { quantity: 5 },
        )
        .unwrap();
    }
    let err = execute(
        deps.as_mut(),
        env,
        info,
        ExecuteMsg::MintAuction { quantity: 1 },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::MaxPerAddressExceeded { max: 10 });
}

#[test]
fn mint_auction_clamps_to_remaining_allocation() {
    let (mut deps, env) = setup();
    setup_sale(&mut deps, &env);
    let env = at(&env, AUCTION_START);

    // 37 of the 40 auction items
    for (i, quantity) in [5, 5, 5, 5, 5, 5, 5, 2].into_iter().enumerate() {
        let info = get_message_info(&deps.api, &format!("buyer{}", i), &payment(5_000));
        execute(
            deps.as_mut(),
            env.clone(),
            info,
            ExecuteMsg::MintAuction { quantity },
        )
        .unwrap();
    }

    let user = deps.api.addr_make("late");
    let info = get_message_info(&deps.api, "late", &payment(5_000));
    let res = execute(
        deps.as_mut(),
        env.clone(),
        info.clone(),
        ExecuteMsg::MintAuction { quantity: 5 },
    )
    .unwrap();
    assert_eq!(attribute(&res, "quantity"), "3");
    assert_eq!(
        res.messages[1].msg,
        CosmosMsg::Bank(BankMsg::Send {
            to_address: user.to_string(),
            amount: payment(2_000),
        })
    );

    let err = execute(
        deps.as_mut(),
        env,
        info,
        ExecuteMsg::MintAuction { quantity: 1 },
    )
    .unwrap_err();
    assert_eq!(
        err,
        ContractError::SupplyExhausted {
            requested: 1,
            remaining: 0
        }
    );
}

#[test]
fn pre_commit_and_settle_test() {
    let (mut deps, env) = setup();
    setup_sale(&mut deps, &env);
    set_allowance(&mut deps, &env, "alice", 5);
    set_allowance(&mut deps, &env, "bob", 5);
    let alice = deps.api.addr_make("alice");
    let bob = deps.api.addr_make("bob");
    let collection = deps.api.addr_make("collection");

    let env = at(&env, PRE_COMMIT_START);

    // no auction purchase, so the allowlist price follows the start price
    let info = get_message_info(&deps.api, "alice", &payment(2_400));
    let res = execute(
        deps.as_mut(),
        env.clone(),
        info,
        ExecuteMsg::PreCommit { quantity: 3 },
    )
    .unwrap();
    assert!(res.messages.is_empty());
    assert_eq!(attribute(&res, "entry_id"), "0");

    let info = get_message_info(&deps.api, "bob", &payment(1_600));
    execute(
        deps.as_mut(),
        env.clone(),
        info,
        ExecuteMsg::PreCommit { quantity: 2 },
    )
    .unwrap();

    let info = get_message_info(&deps.api, "carol", &payment(800));
    let err = execute(
        deps.as_mut(),
        env.clone(),
        info,
        ExecuteMsg::PreCommit { quantity: 1 },
    )
    .unwrap_err();
    assert_eq!(
        err,
        ContractError::AllowanceExceeded {
            requested: 1,
            available: 0
        }
    );

    let stats = query_stats(deps.as_ref(), &env);
    assert_eq!(stats.stats.pre_committed, 5);
    assert_eq!(stats.supply_including_pending, 5);
    assert_eq!(query_user(&deps, &env, "alice").pending, 3);
    assert_eq!(query_user(&deps, &env, "alice").allowance, 2);

    let settler = get_message_info(&deps.api, "settler", &[]);
    let err = execute(
        deps.as_mut(),
        env.clone(),
        settler.clone(),
        ExecuteMsg::SettlePending { max_quantity: 4 },
    )
    .unwrap_err();
    assert_eq!(
        err,
        ContractError::WrongPhase {
            current: Phase::PreCommit
        }
    );

    let env = at(&env, ALLOWLIST_START);
    let res = execute(
        deps.as_mut(),
        env.clone(),
        settler.clone(),
        ExecuteMsg::SettlePending { max_quantity: 4 },
    )
    .unwrap();
    assert_eq!(res.messages.len(), 2);
    assert_eq!(res.messages[0].msg, mint_msg(&collection, &alice, 3).unwrap());
    assert_eq!(res.messages[1].msg, mint_msg(&collection, &bob, 1).unwrap());
    assert_eq!(res.events.len(), 2);
    assert_eq!(res.events[1].ty, "allocation");
    assert!(res.events[1]
        .attributes
        .iter()
        .any(|attr| attr.key == "quantity" && attr.value == "1"));

    let res = query(
        deps.as_ref(),
        env.clone(),
        QueryMsg::PendingQueue {
            start_after: None,
            limit: None,
        },
    )
    .unwrap();
    let queue: PendingQueueResponse = from_json(&res).unwrap();
    assert_eq!(queue.cursor, 1);
    assert_eq!(queue.entries.len(), 1);
    assert_eq!(queue.entries[0].entry.remaining, 1);

    let res = execute(
        deps.as_mut(),
        env.clone(),
        settler.clone(),
        ExecuteMsg::SettlePending { max_quantity: 10 },
    )
    .unwrap();
    assert_eq!(res.messages.len(), 1);

    // nothing left, settling again is a no-op
    for max_quantity in [10, 0] {
        let res = execute(
            deps.as_mut(),
            env.clone(),
            settler.clone(),
            ExecuteMsg::SettlePending { max_quantity },
        )
        .unwrap();
        assert!(res.messages.is_empty());
    }

    let stats = query_stats(deps.as_ref(), &env);
    assert_eq!(stats.stats.pre_commit_settled, 5);
    assert_eq!(stats.stats.minted_total, 5);
    assert_eq!(query_user(&deps, &env, "bob").minted, 2);
}

#[test]
fn claim_pre_committed_skips_queue() {
    let (mut deps, env) = setup();
    setup_sale(&mut deps, &env);
    set_allowance(&mut deps, &env, "alice", 5);
    set_allowance(&mut deps, &env, "bob", 5);
    let bob = deps.api.addr_make("bob");
    let collection = deps.api.addr_make("collection");

    let pre_commit_env = at(&env, PRE_COMMIT_START);
    for (user, quantity) in [("alice", 3), ("bob", 2)] {
        let info = get_message_info(&deps.api, user, &payment(4_000));
        execute(
            deps.as_mut(),
            pre_commit_env.clone(),
            info,
            ExecuteMsg::PreCommit { quantity },
        )
        .unwrap();
    }

    let env = at(&env, ALLOWLIST_START);
    let info = get_message_info(&deps.api, "bob", &[]);
    let res = execute(
        deps.as_mut(),
        env.clone(),
        info.clone(),
        ExecuteMsg::ClaimPreCommitted {},
    )
    .unwrap();
    assert_eq!(res.messages[0].msg, mint_msg(&collection, &bob, 2).unwrap());

    let err = execute(
        deps.as_mut(),
        env.clone(),
        info,
        ExecuteMsg::ClaimPreCommitted {},
    )
    .unwrap_err();
    assert_eq!(err, ContractError::NothingToClaim {});

    let settler = get_message_info(&deps.api, "settler", &[]);
    let res = execute(
        deps.as_mut(),
        env.clone(),
        settler,
        ExecuteMsg::SettlePending { max_quantity: 10 },
    )
    .unwrap();
    assert_eq!(res.messages.len(), 1);
    assert_eq!(attribute(&res, "settled"), "3");
    assert_eq!(query_user(&deps, &env, "bob").minted, 2);
}

#[test]
fn mint_allowlist_test() {
    let (mut deps, env) = setup();
    setup_sale(&mut deps, &env);
    set_allowance(&mut deps, &env, "alice", 5);

    let info = get_message_info(&deps.api, "alice", &payment(2_400));
    let msg = ExecuteMsg::MintAllowlist { quantity: 3 };

    let err = execute(
        deps.as_mut(),
        at(&env, PRE_COMMIT_START),
        info.clone(),
        msg.clone(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ContractError::WrongPhase {
            current: Phase::PreCommit
        }
    );

    let env = at(&env, ALLOWLIST_START);
    let res = execute(deps.as_mut(), env.clone(), info.clone(), msg.clone()).unwrap();
    assert_eq!(res.messages.len(), 1);
    assert_eq!(attribute(&res, "price"), "800");

    let err = execute(deps.as_mut(), env.clone(), info, msg).unwrap_err();
    assert_eq!(
        err,
        ContractError::AllowanceExceeded {
            requested: 3,
            available: 2
        }
    );

    let user = query_user(&deps, &env, "alice");
    assert_eq!(user.allowance, 2);
    assert_eq!(user.minted, 3);
}

#[test]
fn mint_public_keeps_owner_reserve() {
    let (mut deps, env) = setup();
    let mut msg = get_default_instantiate_msg(&deps.api);
    msg.amount_for_auction = 0;
    msg.amount_for_allowlist = 0;
    msg.owner_reserve = 96;
    instantiate_with(&mut deps, &env, msg);

    let admin = get_message_info(&deps.api, "admin", &[]);
    let (schedule, pricing) = flat_schedule();
    execute(
        deps.as_mut(),
        env.clone(),
        admin.clone(),
        ExecuteMsg::ConfigureSchedule { schedule, pricing },
    )
    .unwrap();

    let env = at(&env, PUBLIC_SALE_START);
    let info = get_message_info(&deps.api, "user1", &payment(2_000));
    let res = execute(
        deps.as_mut(),
        env.clone(),
        info.clone(),
        ExecuteMsg::MintPublic { quantity: 4 },
    )
    .unwrap();
    assert_eq!(attribute(&res, "total_cost"), "2000");

    let err = execute(
        deps.as_mut(),
        env.clone(),
        info,
        ExecuteMsg::MintPublic { quantity: 1 },
    )
    .unwrap_err();
    assert_eq!(
        err,
        ContractError::SupplyExhausted {
            requested: 1,
            remaining: 0
        }
    );

    // the reserve is still available to the owner
    let team = deps.api.addr_make("team").to_string();
    let res = execute(
        deps.as_mut(),
        env.clone(),
        admin,
        ExecuteMsg::OwnerMint {
            recipient: team,
            quantity: 5,
        },
    );
    assert!(res.is_ok());
}

#[test]
fn owner_mint_test() {
    let (mut deps, env) = setup();
    let msg = get_default_instantiate_msg(&deps.api);
    instantiate_with(&mut deps, &env, msg);
    let team = deps.api.addr_make("team");
    let collection = deps.api.addr_make("collection");

    let msg = ExecuteMsg::OwnerMint {
        recipient: team.to_string(),
        quantity: 6,
    };

    let user = get_message_info(&deps.api, "user1", &[]);
    let err = execute(deps.as_mut(), env.clone(), user, msg.clone()).unwrap_err();
    assert_eq!(err, ContractError::Unauthorized {});

    // works before any schedule is configured
    let admin = get_message_info(&deps.api, "admin", &[]);
    let res = execute(deps.as_mut(), env.clone(), admin.clone(), msg.clone()).unwrap();
    assert_eq!(res.messages[0].msg, mint_msg(&collection, &team, 6).unwrap());

    let err = execute(deps.as_mut(), env.clone(), admin, msg).unwrap_err();
    assert_eq!(
        err,
        ContractError::SupplyExhausted {
            requested: 6,
            remaining: 4
        }
    );

    let stats = query_stats(deps.as_ref(), &env);
    assert_eq!(stats.stats.owner_minted, 6);
}

#[test]
fn sold_out_sale_ends() {
    let (mut deps, env) = setup();
    let mut msg = get_default_instantiate_msg(&deps.api);
    msg.collection_size = 10;
    msg.amount_for_auction = 10;
    msg.amount_for_allowlist = 0;
    msg.owner_reserve = 0;
    instantiate_with(&mut deps, &env, msg);

    let admin = get_message_info(&deps.api, "admin", &[]);
    execute(
        deps.as_mut(),
        env.clone(),
        admin,
        ExecuteMsg::ConfigureSchedule {
            schedule: get_full_schedule(),
            pricing: get_auction_pricing(),
        },
    )
    .unwrap();

    let env = at(&env, AUCTION_START);
    for user in ["user1", "user2"] {
        let info = get_message_info(&deps.api, user, &payment(5_000));
        execute(
            deps.as_mut(),
            env.clone(),
            info,
            ExecuteMsg::MintAuction { quantity: 5 },
        )
        .unwrap();
    }

    assert_eq!(query_phase(deps.as_ref(), &env), Phase::Ended);

    let info = get_message_info(&deps.api, "user3", &payment(1_000));
    let err = execute(
        deps.as_mut(),
        env,
        info,
        ExecuteMsg::MintAuction { quantity: 1 },
    )
    .unwrap_err();
    assert_eq!(
        err,
        ContractError::WrongPhase {
            current: Phase::Ended
        }
    );
}

#[test]
fn registry_supply_query() {
    let (mut deps, env) = setup();
    let msg = get_default_instantiate_msg(&deps.api);
    instantiate_with(&mut deps, &env, msg);
    mock_registry(&mut deps, 7);

    let res = query(deps.as_ref(), env, QueryMsg::RegistrySupply {}).unwrap();
    let supply: RegistrySupplyResponse = from_json(&res).unwrap();
    assert_eq!(supply.registry_count, 7);
    assert_eq!(supply.minted_total, 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]
    #[test]
    fn phase_never_goes_back(times in proptest::collection::vec(GENESIS..PUBLIC_SALE_END + 1_000, 1..20)) {
        let (mut deps, env) = setup();
        setup_sale(&mut deps, &env);

        let mut times = times;
        times.sort_unstable();
        let mut previous = Phase::NotStarted;
        for time in times {
            let phase = query_phase(deps.as_ref(), &at(&env, time));
            prop_assert!(phase >= previous);
            previous = phase;
        }
    }

    #[test]
    fn auction_price_never_increases(first in AUCTION_START..PRE_COMMIT_START, delta in 0u64..2_000) {
        let (mut deps, env) = setup();
        setup_sale(&mut deps, &env);

        let early = query_prices(deps.as_ref(), &at(&env, first)).auction_price.unwrap();
        let late = query_prices(deps.as_ref(), &at(&env, first + delta)).auction_price.unwrap();
        prop_assert!(late <= early);
        prop_assert!(late >= Uint128::new(200));
    }
}
