//! Settlement tests: pnl golden vectors, value conservation, rollback on ledger refusal.

mod common;

use alloy_primitives::U256;
use cds_core::*;
use common::*;

fn invalid(reason: &str) -> EngineError {
    EngineError::InvalidParams(reason.to_string())
}

fn is_paid(p: &EventPayload) -> bool {
    matches!(p, EventPayload::SettlementPaid(_))
}

fn is_executed(p: &EventPayload) -> bool {
    matches!(p, EventPayload::SettlementExecuted(_))
}

#[test]
fn seller_pays_when_fair_exceeds_fixed() {
    let mut desk = Desk::transfers();
    let id = desk.open(pid(0x11));
    let supply = desk.engine.ledger().total_supply(USDC);
    let quote = desk.quote(pid(0x11), 800);

    let result = desk.engine.settle(KEEPER, id, &quote, 15, 30).unwrap();

    let expected = U256::from(36_000_000_000u64);
    assert_eq!(result.pnl, signed(36_000_000_000));
    assert_eq!((result.payer, result.payee, result.amount), (SELLER, BUYER, expected));
    assert_eq!(result.mode, SettlementMode::Transfers);
    assert_eq!(desk.balance(BUYER), units(100_000) + expected);
    assert_eq!(desk.balance(SELLER), units(100_000) - expected);
    assert_eq!(desk.engine.ledger().total_supply(USDC), supply);
    assert_eq!(desk.engine.swap(id).unwrap().status, SwapStatus::Settled);
}

#[test]
fn buyer_pays_when_fair_below_fixed() {
    let mut desk = Desk::transfers();
    let id = desk.open(pid(0x11));
    let quote = desk.quote(pid(0x11), 50);

    let result = desk.engine.settle(KEEPER, id, &quote, 10, 30).unwrap();

    let expected = U256::from(1_000_000_000u64);
    assert_eq!(result.pnl, signed(-1_000_000_000));
    assert_eq!((result.payer, result.payee), (BUYER, SELLER));
    assert_eq!(desk.balance(BUYER), units(100_000) - expected);
    assert_eq!(desk.balance(SELLER), units(100_000) + expected);
}

#[test]
fn flat_spread_settles_without_payment() {
    let mut desk = Desk::transfers();
    let id = desk.open(pid(0x11));
    let quote = desk.quote(pid(0x11), FIXED_BPS);

    let result = desk.engine.settle(KEEPER, id, &quote, 12, 30).unwrap();

    assert_eq!(result.pnl, SignedAmount::ZERO);
    assert_eq!(result.amount, U256::ZERO);
    assert_eq!(desk.balance(BUYER), units(100_000));
    assert_eq!(desk.balance(SELLER), units(100_000));
    assert_eq!(desk.engine.ledger().transfer_count(), 0);
    assert_eq!(desk.count_events(is_paid), 0);
    assert_eq!(desk.count_events(is_executed), 1);
    assert_eq!(desk.engine.swap(id).unwrap().status, SwapStatus::Settled);
}

#[test]
fn bad_day_counts_reject_without_side_effects() {
    let mut desk = Desk::transfers();
    let id = desk.open(pid(0x11));
    let quote = desk.quote(pid(0x11), 800);
    let events = desk.engine.events().len();

    for (elapsed, tenor) in [(0, 30), (31, 30), (1, 0), (1, 36_501)] {
        assert_eq!(
            desk.engine.settle(KEEPER, id, &quote, elapsed, tenor),
            Err(invalid("Invalid elapsed/tenor days"))
        );
    }
    assert!(desk.engine.swap(id).unwrap().is_active());
    assert_eq!(desk.engine.events().len(), events);
    assert_eq!(desk.balance(BUYER), units(100_000));

    // boundary values are accepted
    desk.engine.settle(KEEPER, id, &quote, 36_500, 36_500).unwrap();
}

#[test]
fn second_settlement_is_rejected() {
    let mut desk = Desk::transfers();
    let id = desk.open(pid(0x11));
    let quote = desk.quote(pid(0x11), 800);

    desk.engine.settle(KEEPER, id, &quote, 15, 30).unwrap();
    let buyer = desk.balance(BUYER);
    let events = desk.engine.events().len();

    assert_eq!(
        desk.engine.settle(KEEPER, id, &quote, 15, 30),
        Err(invalid("Swap not in active status"))
    );
    assert_eq!(desk.balance(BUYER), buyer);
    assert_eq!(desk.engine.events().len(), events);
}

#[test]
fn settle_requires_active_swap() {
    let mut desk = Desk::accounting();
    let pending = desk.propose(pid(0x11));
    let quote = desk.quote(pid(0x11), 800);

    assert_eq!(
        desk.engine.settle(KEEPER, pending, &quote, 15, 30),
        Err(invalid("Swap not in active status"))
    );
    let missing = SwapId(pid(0x99));
    assert_eq!(
        desk.engine.settle(KEEPER, missing, &quote, 15, 30),
        Err(EngineError::NotFound(missing))
    );
}

#[test]
fn settlement_events_pay_then_execute() {
    let mut desk = Desk::transfers();
    let id = desk.open(pid(0x11));
    let quote = desk.quote(pid(0x11), 800);
    desk.engine.settle(KEEPER, id, &quote, 15, 30).unwrap();

    let last = desk.engine.recent_events(2);
    match (&last[0].payload, &last[1].payload) {
        (EventPayload::SettlementPaid(paid), EventPayload::SettlementExecuted(done)) => {
            assert_eq!((paid.payer, paid.payee), (SELLER, BUYER));
            assert_eq!(paid.amount, U256::from(36_000_000_000u64));
            assert_eq!(done.swap_id, id);
            assert_eq!((done.buyer, done.seller), (BUYER, SELLER));
            assert_eq!(done.pnl, signed(36_000_000_000));
            assert_eq!(done.settled_at, Timestamp::from_secs(NOW));
            assert_eq!((done.elapsed_days, done.tenor_days), (15, 30));
        }
        other => panic!("unexpected events {other:?}"),
    }
    assert!(last[0].id < last[1].id);
}

#[test]
fn accounting_mode_records_without_moving_value() {
    let mut desk = Desk::accounting();
    let id = desk.open(pid(0x11));
    let quote = desk.quote(pid(0x11), 800);

    let result = desk.engine.settle(KEEPER, id, &quote, 15, 30).unwrap();

    assert_eq!(result.mode, SettlementMode::Accounting);
    assert_eq!(result.amount, U256::from(36_000_000_000u64));
    assert_eq!(desk.balance(BUYER), units(100_000));
    assert_eq!(desk.balance(SELLER), units(100_000));
    assert_eq!(desk.engine.ledger().transfer_count(), 0);
    assert_eq!(desk.count_events(is_paid), 1);
}

#[test]
fn refused_transfer_rolls_back_status() {
    let mut desk = Desk::transfers();
    let spender = desk.engine.config().engine_address;
    let id = desk.open(pid(0x11));
    let quote = desk.quote(pid(0x11), 800);
    let events = desk.engine.events().len();

    desk.engine.ledger_mut().approve(USDC, SELLER, spender, U256::from(1u64));

    let err = desk.engine.settle(KEEPER, id, &quote, 15, 30).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Ledger(LedgerError::InsufficientAllowance { .. })
    ));
    assert!(desk.engine.swap(id).unwrap().is_active());
    assert_eq!(desk.engine.events().len(), events);
    assert_eq!(desk.balance(SELLER), units(100_000));

    // once the payer re-approves, the same quote settles
    desk.engine.ledger_mut().approve(USDC, SELLER, spender, units(100_000));
    desk.engine.settle(KEEPER, id, &quote, 15, 30).unwrap();
    assert_eq!(desk.engine.swap(id).unwrap().status, SwapStatus::Settled);
}

#[test]
fn underfunded_payer_rolls_back() {
    let mut desk = Desk::transfers();
    let spender = desk.engine.config().engine_address;
    desk.engine.ledger_mut().approve(USDC, SELLER, spender, U256::MAX);
    let id = desk.open(pid(0x11));
    let quote = desk.quote(pid(0x11), 10_000);

    // pnl = 9920 * 1e12 * 30 / 300000 = 992,000 USDC, more than the seller holds
    let err = desk.engine.settle(KEEPER, id, &quote, 30, 30).unwrap_err();
    assert!(matches!(err, EngineError::Ledger(LedgerError::InsufficientBalance { .. })));
    assert!(desk.engine.swap(id).unwrap().is_active());
    assert_eq!(desk.engine.ledger().transfer_count(), 0);
}

#[test]
fn transfers_mode_without_asset_fails_cleanly() {
    let config = EngineConfig {
        settlement_mode: SettlementMode::Transfers,
        settlement_asset: None,
        ..EngineConfig::default()
    };
    let mut desk = Desk::new(config);
    let id = desk.open(pid(0x11));
    let quote = desk.quote(pid(0x11), 800);

    assert_eq!(
        desk.engine.settle(KEEPER, id, &quote, 15, 30),
        Err(invalid("Settlement asset not set"))
    );
    assert!(desk.engine.swap(id).unwrap().is_active());

    // zero pnl needs no asset
    let flat = desk.quote(pid(0x11), FIXED_BPS);
    desk.engine.settle(KEEPER, id, &flat, 15, 30).unwrap();

    // configuring the asset unblocks live settlements
    let other = desk.open(pid(0x22));
    desk.engine.set_settlement_asset(GOV, USDC).unwrap();
    let quote = desk.quote(pid(0x22), 800);
    desk.engine.settle(KEEPER, other, &quote, 15, 30).unwrap();
    assert_eq!(desk.balance(BUYER), units(100_000) + U256::from(36_000_000_000u64));
}

#[test]
fn governance_can_switch_modes_mid_life() {
    let mut desk = Desk::accounting();
    let id = desk.open(pid(0x11));
    desk.engine.set_settlement_asset(GOV, USDC).unwrap();
    desk.engine.set_settlement_mode(GOV, SettlementMode::Transfers).unwrap();
    assert_eq!(desk.engine.settlement_mode(), SettlementMode::Transfers);

    let quote = desk.quote(pid(0x11), 50);
    desk.engine.settle(KEEPER, id, &quote, 10, 30).unwrap();
    assert_eq!(desk.balance(SELLER), units(100_000) + U256::from(1_000_000_000u64));

    match &desk
        .engine
        .events()
        .iter()
        .find(|e| matches!(e.payload, EventPayload::SettlementModeChanged(_)))
        .unwrap()
        .payload
    {
        EventPayload::SettlementModeChanged(e) => {
            assert_eq!(e.previous, SettlementMode::Accounting);
            assert_eq!(e.current, SettlementMode::Transfers);
        }
        _ => unreachable!(),
    }
}

#[test]
fn settlement_does_not_wait_for_leg_start() {
    let mut desk = Desk::accounting();
    let id = desk.open(pid(0x11));
    let start = desk.engine.swap(id).unwrap().buyer.start;
    assert!(desk.engine.time() < start);

    let quote = desk.quote(pid(0x11), 800);
    let result = desk.engine.settle(KEEPER, id, &quote, 15, 30).unwrap();
    assert_eq!(result.settled_at, desk.engine.time());
    assert_eq!(desk.engine.swap(id).unwrap().status, SwapStatus::Settled);
}

#[test]
fn pnl_uses_buyer_leg_terms() {
    let mut desk = Desk::accounting();
    let mut params = desk.params(pid(0x11));
    params.seller.spread = Bps(500);
    params.seller.notional = units(1);
    let id = desk.engine.propose(BUYER, params).unwrap();
    desk.engine.activate(BROKER, id).unwrap();

    let quote = desk.quote(pid(0x11), 800);
    let result = desk.engine.settle(KEEPER, id, &quote, 15, 30).unwrap();
    assert_eq!(result.pnl, signed(36_000_000_000));
}

#[test]
fn paused_settlement_succeeds_after_unpause() {
    let mut desk = Desk::accounting();
    let id = desk.open(pid(0x11));
    let quote = desk.quote(pid(0x11), 800);

    desk.engine.pause(GOV).unwrap();
    assert_eq!(desk.engine.settle(KEEPER, id, &quote, 15, 30), Err(EngineError::Paused));
    assert!(desk.engine.swap(id).unwrap().is_active());

    desk.engine.unpause(GOV).unwrap();
    desk.engine.settle(KEEPER, id, &quote, 15, 30).unwrap();
    assert!(is_executed(&desk.engine.recent_events(1)[0].payload));
}

#[test]
fn pnl_golden_vectors() {
    let n = units(1_000_000);
    let cases: [(u16, u16, u32, u32, i64); 5] = [
        (800, 80, 15, 30, 36_000_000_000),
        (50, 80, 10, 30, -1_000_000_000),
        (80, 80, 12, 30, 0),
        (81, 80, 1, 365, 273_973),
        (80, 81, 1, 365, -273_973),
    ];
    for (fair, fixed, elapsed, tenor, expected) in cases {
        assert_eq!(
            compute_pnl(Bps(fair), Bps(fixed), n, elapsed, tenor).unwrap(),
            signed(expected),
            "fair {fair} fixed {fixed} {elapsed}/{tenor}"
        );
    }
}
