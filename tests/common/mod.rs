//! Shared desk fixture: a governed engine with a funded ledger and a seeded oracle.

#![allow(dead_code)]

use alloy_primitives::{address, B256, U256};
use cds_core::*;
use std::sync::Arc;

pub const GOV: Principal = address!("0000000000000000000000000000000000000a01");
pub const BROKER: Principal = address!("0000000000000000000000000000000000000a02");
pub const BUYER: Principal = address!("0000000000000000000000000000000000000b01");
pub const SELLER: Principal = address!("0000000000000000000000000000000000000b02");
pub const KEEPER: Principal = address!("0000000000000000000000000000000000000b03");
pub const STRANGER: Principal = address!("0000000000000000000000000000000000000bff");
pub const ORACLE_ADAPTER: Principal = address!("0000000000000000000000000000000000000d01");
pub const USDC: AssetId = address!("0000000000000000000000000000000000000c01");

pub const NOW: u64 = 1_700_000_000;
pub const FIXED_BPS: u16 = 80;

/// 10^6 smallest units per whole unit.
pub fn units(amount: u64) -> Amount {
    U256::from(amount) * U256::from(1_000_000u64)
}

pub fn signed(v: i64) -> SignedAmount {
    SignedAmount::try_from(v).unwrap()
}

pub fn pid(tag: u8) -> PortfolioId {
    B256::repeat_byte(tag)
}

pub struct Desk {
    pub engine: Engine,
    pub oracle: QuoteSigner,
}

impl Desk {
    pub fn new(config: EngineConfig) -> Self {
        let oracle = QuoteSigner::from_seed(42).unwrap();
        let roles = RoleRegistry::new()
            .with_grant(GOV, Capability::Governance)
            .with_grant(BROKER, Capability::Broker);

        let spender = config.engine_address;
        let mut ledger = InMemoryLedger::new();
        for party in [BUYER, SELLER] {
            ledger.mint(USDC, party, units(100_000));
            ledger.approve(USDC, party, spender, units(100_000));
        }

        let mut engine = Engine::new(config, roles, ledger);
        engine.set_time(Timestamp::from_secs(NOW));
        engine
            .set_price_oracle_adapter(
                GOV,
                Arc::new(StaticOracleAdapter::new(ORACLE_ADAPTER, oracle.address())),
            )
            .unwrap();
        Self { engine, oracle }
    }

    pub fn accounting() -> Self {
        Self::new(EngineConfig::accounting())
    }

    pub fn transfers() -> Self {
        Self::new(EngineConfig::transfers(USDC))
    }

    /// One year swap starting tomorrow, 1,000,000 notional at 80 bps on both legs.
    pub fn params(&self, portfolio_id: PortfolioId) -> SwapParams {
        let start = self.engine.time().plus_days(1);
        let maturity = start.plus_days(365);
        SwapParams {
            portfolio_id,
            buyer: Leg::new(BUYER, units(1_000_000), Bps(FIXED_BPS), start, maturity),
            seller: Leg::new(SELLER, units(1_000_000), Bps(FIXED_BPS), start, maturity),
            correlation: Bps(5_000),
        }
    }

    pub fn propose(&mut self, portfolio_id: PortfolioId) -> SwapId {
        let params = self.params(portfolio_id);
        self.engine.propose(BUYER, params).unwrap()
    }

    pub fn open(&mut self, portfolio_id: PortfolioId) -> SwapId {
        let id = self.propose(portfolio_id);
        self.engine.activate(BROKER, id).unwrap();
        id
    }

    pub fn payload(&self, portfolio_id: PortfolioId, fair_bps: u16) -> QuotePayload {
        QuotePayload {
            portfolio_id,
            as_of: self.engine.time(),
            risk_score: U256::from(420_000u64),
            correlation: Bps(5_000),
            fair_spread: Bps(fair_bps),
            model_id_hash: pricing::model_id_hash(pricing::DEFAULT_MODEL_ID),
            features_hash: B256::repeat_byte(0xfe),
        }
    }

    pub fn quote(&self, portfolio_id: PortfolioId, fair_bps: u16) -> PriceQuote {
        self.sign(&self.payload(portfolio_id, fair_bps))
    }

    pub fn sign(&self, payload: &QuotePayload) -> PriceQuote {
        self.oracle.sign_payload(payload).unwrap()
    }

    pub fn balance(&self, who: Principal) -> Amount {
        self.engine.ledger().balance_of(USDC, who)
    }

    pub fn count_events(&self, pred: impl Fn(&EventPayload) -> bool) -> usize {
        self.engine.events().iter().filter(|e| pred(&e.payload)).count()
    }
}
