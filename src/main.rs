//! CDS Swap Engine Simulation.
//!
//! Walks swaps through propose, activate and settle against locally signed quotes,
//! in both settlement modes, and shows the guard rails along the way.

use alloy_primitives::{address, B256, U256};
use cds_core::*;
use clap::Parser;
use serde_json::json;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

type SimResult = Result<(), Box<dyn Error>>;

const GOVERNOR: Principal = address!("0000000000000000000000000000000000000a01");
const BROKER: Principal = address!("0000000000000000000000000000000000000a02");
const BUYER: Principal = address!("0000000000000000000000000000000000000b01");
const SELLER: Principal = address!("0000000000000000000000000000000000000b02");
const KEEPER: Principal = address!("0000000000000000000000000000000000000b03");
const ORACLE_ADAPTER: Principal = address!("0000000000000000000000000000000000000d01");
const USDC: AssetId = address!("0000000000000000000000000000000000000c01");

const DECIMALS: u32 = 6;
const SIM_START: u64 = 1_700_000_000;

/// CDS swap engine simulator
#[derive(Parser, Debug)]
#[command(name = "cds-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Engine configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log every emitted event
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> SimResult {
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    config.verbose |= args.verbose;
    logging::init(config.verbose);

    println!("CDS Swap Engine Simulation");
    println!("Bilateral swaps, oracle-signed settlement quotes\n");

    let oracle = QuoteSigner::from_seed(42)?;
    println!("  Oracle signer: {}\n", oracle.address());

    scenario_1_seller_pays(&config, &oracle)?;
    scenario_2_buyer_pays(&config, &oracle)?;
    scenario_3_flat_spread(&config, &oracle)?;
    scenario_4_invalid_days(&config, &oracle)?;
    scenario_5_double_settle(&config, &oracle)?;
    scenario_6_pause(&config, &oracle)?;
    scenario_7_rejected_quotes(&config, &oracle)?;

    println!("\nAll simulations completed successfully.");
    Ok(())
}

fn units(amount: u64) -> Amount {
    U256::from(amount) * U256::from(10u64).pow(U256::from(DECIMALS))
}

fn show(amount: SignedAmount) -> String {
    match to_units(amount, DECIMALS) {
        Some(v) => format!("{v} USDC"),
        None => format!("{amount} raw"),
    }
}

/// Engine with roles, oracle and a funded ledger in the requested mode.
fn desk(base: &EngineConfig, mode: SettlementMode, oracle: &QuoteSigner) -> Result<Engine, EngineError> {
    let config = EngineConfig {
        settlement_mode: mode,
        settlement_asset: Some(USDC),
        ..base.clone()
    };
    let spender = config.engine_address;

    let roles = RoleRegistry::new()
        .with_grant(GOVERNOR, Capability::Governance)
        .with_grant(BROKER, Capability::Broker);

    let mut ledger = InMemoryLedger::new();
    for party in [BUYER, SELLER] {
        ledger.mint(USDC, party, units(100_000));
        ledger.approve(USDC, party, spender, units(100_000));
    }

    let mut engine = Engine::new(config, roles, ledger);
    engine.set_time(Timestamp::from_secs(SIM_START));
    engine.set_price_oracle_adapter(
        GOVERNOR,
        Arc::new(StaticOracleAdapter::new(ORACLE_ADAPTER, oracle.address())),
    )?;
    Ok(engine)
}

fn portfolio(tag: u8) -> PortfolioId {
    B256::repeat_byte(tag)
}

/// Propose and activate a one year swap, fixed spread 80 bps, notional 1,000,000.
fn open_swap(engine: &mut Engine, portfolio_id: PortfolioId) -> Result<SwapId, EngineError> {
    let start = engine.time().plus_days(1);
    let maturity = start.plus_days(365);
    let params = SwapParams {
        portfolio_id,
        buyer: Leg::new(BUYER, units(1_000_000), Bps(80), start, maturity),
        seller: Leg::new(SELLER, units(1_000_000), Bps(80), start, maturity),
        correlation: Bps(5_000),
    };
    let id = engine.propose(BUYER, params)?;
    engine.activate(BROKER, id)?;
    Ok(id)
}

/// Quote with a chosen fair spread, as the pricing service would sign it now.
fn quote_at(
    oracle: &QuoteSigner,
    portfolio_id: PortfolioId,
    as_of: Timestamp,
    fair_spread: u16,
) -> Result<PriceQuote, PricingError> {
    let features = json!({"leverage": 0.3, "size": 0.5, "volatility": 0.4});
    oracle.sign_payload(&QuotePayload {
        portfolio_id,
        as_of,
        risk_score: U256::from(420_000u64),
        correlation: Bps(5_000),
        fair_spread: Bps(fair_spread),
        model_id_hash: pricing::model_id_hash(pricing::DEFAULT_MODEL_ID),
        features_hash: pricing::features_hash(&features)?,
    })
}

fn show_balance(amount: Amount) -> String {
    SignedAmount::try_from(amount)
        .map(show)
        .unwrap_or_else(|_| format!("{amount} raw"))
}

fn print_balances(engine: &Engine) {
    let ledger = engine.ledger();
    println!(
        "  Balances: buyer {} / seller {}",
        show_balance(ledger.balance_of(USDC, BUYER)),
        show_balance(ledger.balance_of(USDC, SELLER))
    );
}

/// Fair spread above the fixed leg: protection seller pays the buyer.
fn scenario_1_seller_pays(config: &EngineConfig, oracle: &QuoteSigner) -> SimResult {
    println!("Scenario 1: Fair 800 bps vs fixed 80 bps, transfers mode\n");

    let mut engine = desk(config, SettlementMode::Transfers, oracle)?;
    let pid = portfolio(0x11);
    let id = open_swap(&mut engine, pid)?;
    print_balances(&engine);

    let quote = quote_at(oracle, pid, engine.time(), 800)?;
    let result = engine.settle(KEEPER, id, &quote, 15, 30)?;

    println!("  Settled {} over 15/30 days", id);
    println!("  PnL: {} ({} -> {})", show(result.pnl), result.payer, result.payee);
    print_balances(&engine);
    println!("  Total supply: {}\n", engine.ledger().total_supply(USDC));
    Ok(())
}

/// Fair spread below the fixed leg: protection buyer pays the seller.
fn scenario_2_buyer_pays(config: &EngineConfig, oracle: &QuoteSigner) -> SimResult {
    println!("Scenario 2: Fair 50 bps vs fixed 80 bps, transfers mode\n");

    let mut engine = desk(config, SettlementMode::Transfers, oracle)?;
    let pid = portfolio(0x22);
    let id = open_swap(&mut engine, pid)?;

    let quote = quote_at(oracle, pid, engine.time(), 50)?;
    let result = engine.settle(KEEPER, id, &quote, 10, 30)?;

    println!("  PnL: {} ({} -> {})", show(result.pnl), result.payer, result.payee);
    print_balances(&engine);
    println!();
    Ok(())
}

/// Flat spread settles with nothing to pay.
fn scenario_3_flat_spread(config: &EngineConfig, oracle: &QuoteSigner) -> SimResult {
    println!("Scenario 3: Fair equals fixed, accounting mode\n");

    let mut engine = desk(config, SettlementMode::Accounting, oracle)?;
    let pid = portfolio(0x33);
    let id = open_swap(&mut engine, pid)?;

    let quote = quote_at(oracle, pid, engine.time(), 80)?;
    let result = engine.settle(KEEPER, id, &quote, 12, 30)?;

    let paid = engine
        .events()
        .iter()
        .filter(|e| matches!(e.payload, EventPayload::SettlementPaid(_)))
        .count();
    println!("  PnL: {}, payment events: {}", show(result.pnl), paid);
    print_balances(&engine);
    println!();
    Ok(())
}

fn scenario_4_invalid_days(config: &EngineConfig, oracle: &QuoteSigner) -> SimResult {
    println!("Scenario 4: Zero elapsed days\n");

    let mut engine = desk(config, SettlementMode::Accounting, oracle)?;
    let pid = portfolio(0x44);
    let id = open_swap(&mut engine, pid)?;

    let quote = quote_at(oracle, pid, engine.time(), 800)?;
    match engine.settle(KEEPER, id, &quote, 0, 30) {
        Err(e) => println!("  Rejected: {}", e),
        Ok(_) => println!("  Unexpectedly settled"),
    }
    if let Some(swap) = engine.swap(id) {
        println!("  Status still: {}\n", swap.status);
    }
    Ok(())
}

fn scenario_5_double_settle(config: &EngineConfig, oracle: &QuoteSigner) -> SimResult {
    println!("Scenario 5: Settling twice\n");

    let mut engine = desk(config, SettlementMode::Accounting, oracle)?;
    let pid = portfolio(0x55);
    let id = open_swap(&mut engine, pid)?;

    let quote = quote_at(oracle, pid, engine.time(), 800)?;
    engine.settle(KEEPER, id, &quote, 15, 30)?;
    println!("  First settle ok");
    if let Err(e) = engine.settle(KEEPER, id, &quote, 15, 30) {
        println!("  Second settle: {}\n", e);
    }
    Ok(())
}

fn scenario_6_pause(config: &EngineConfig, oracle: &QuoteSigner) -> SimResult {
    println!("Scenario 6: Emergency pause\n");

    let mut engine = desk(config, SettlementMode::Accounting, oracle)?;
    let pid = portfolio(0x66);
    let id = open_swap(&mut engine, pid)?;
    let quote = quote_at(oracle, pid, engine.time(), 800)?;

    engine.pause(GOVERNOR)?;
    if let Err(e) = engine.settle(KEEPER, id, &quote, 15, 30) {
        println!("  While paused: {}", e);
    }
    println!("  Quote still verifies while paused: {}", engine.verify_quote(&quote, pid));

    engine.unpause(GOVERNOR)?;
    let result = engine.settle(KEEPER, id, &quote, 15, 30)?;
    println!("  After unpause: PnL {}", show(result.pnl));
    println!("  Last event: {:?}\n", engine.recent_events(1).first().map(|e| &e.payload));
    Ok(())
}

/// Quotes that fail authentication never move a swap.
fn scenario_7_rejected_quotes(config: &EngineConfig, oracle: &QuoteSigner) -> SimResult {
    println!("Scenario 7: Rejected quotes\n");

    let mut engine = desk(config, SettlementMode::Accounting, oracle)?;
    let pid = portfolio(0x77);
    let id = open_swap(&mut engine, pid)?;

    let stale = quote_at(oracle, pid, engine.time(), 800)?;
    engine.advance_time(STALENESS_WINDOW_SECS + 1);
    println!("  Stale quote verifies: {}", engine.verify_quote(&stale, pid));

    let impostor = QuoteSigner::random();
    let forged = quote_at(&impostor, pid, engine.time(), 800)?;
    println!("  Foreign signer verifies: {}", engine.verify_quote(&forged, pid));

    let request = QuoteRequest::new(pid, engine.time(), json!({"size": 0.5}));
    let priced = oracle.quote(&request)?;
    println!(
        "  Model quote: fair {} corr {} valid {}",
        priced.fair_spread,
        priced.correlation,
        engine.verify_quote(&priced, pid)
    );

    match engine.settle(KEEPER, id, &forged, 15, 30) {
        Err(e) => println!("  Forged settle: {}", e),
        Ok(_) => println!("  Forged settle went through"),
    }
    println!("  Swaps active: {}", engine.registry().ids_with_status(SwapStatus::Active).len());
    Ok(())
}
