// 1.0: primitives. identifiers, basis points, timestamps.
// principals and hashes are the EVM-native alloy types so quote digests and signer
// recovery line up byte-for-byte with the off-chain signer.

use alloy_primitives::{Address, B256, I256, U256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An account that can propose, broker, govern or be a counterparty.
pub type Principal = Address;

/// Opaque key correlating a swap to an external risk/pricing portfolio.
pub type PortfolioId = B256;

/// Amount in the settlement asset's smallest unit.
pub type Amount = U256;

/// Signed amount in the settlement asset's smallest unit.
pub type SignedAmount = I256;

// 1.1: derived swap identifier. keccak of the proposal terms, proposer and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SwapId(pub B256);

impl SwapId {
    pub fn as_b256(&self) -> B256 {
        self.0
    }
}

impl From<B256> for SwapId {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl fmt::Display for SwapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.2: basis points. 100 bps = 1%, 10000 bps = 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Bps(pub u16);

impl Bps {
    pub const MAX: Bps = Bps(10_000);

    pub fn new(bps: u16) -> Self {
        Self(bps)
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn as_fraction(&self) -> Decimal {
        Decimal::new(self.0 as i64, 4)
    }
}

impl fmt::Display for Bps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bps", self.0)
    }
}

// 1.3: unix timestamp in seconds. quotes carry uint64 seconds so we do too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp().max(0) as u64)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    pub fn plus_days(&self, days: u64) -> Self {
        self.plus_secs(days.saturating_mul(86_400))
    }

    // None when `earlier` is actually later than self
    pub fn secs_since(&self, earlier: Timestamp) -> Option<u64> {
        self.0.checked_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match i64::try_from(self.0).ok().and_then(|s| DateTime::<Utc>::from_timestamp(s, 0)) {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}s", self.0),
        }
    }
}

/// Render a smallest-unit amount in whole units for display. None if it does not fit.
pub fn to_units(amount: SignedAmount, decimals: u32) -> Option<Decimal> {
    let raw = i128::try_from(amount).ok()?;
    Decimal::try_from_i128_with_scale(raw, decimals).ok()
}
