// 3.0 quote.rs: signed price quotes and their authentication.
//
// the off-chain pricer abi-encodes (portfolioId, asOf, riskScore, correlationBps,
// fairSpreadBps, modelIdHash, featuresHash) as (bytes32, uint64, uint256, uint16,
// uint16, bytes32, bytes32), hashes it with keccak-256 and signs the hash as an
// EIP-191 personal message. any drift in this encoding breaks every quote from
// that signer, so the layout is pinned by tests below.

use crate::types::{Bps, PortfolioId, Principal, Timestamp};
use alloy_primitives::{keccak256, Address, Bytes, Signature, B256, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

/// Maximum quote age accepted at settlement.
pub const STALENESS_WINDOW_SECS: u64 = 300;
pub const MIN_FAIR_SPREAD_BPS: u16 = 1;
pub const MAX_FAIR_SPREAD_BPS: u16 = 10_000;
pub const MIN_CORRELATION_BPS: u16 = 1_000;
pub const MAX_CORRELATION_BPS: u16 = 9_000;

// secp256k1 n / 2. signatures with a larger s are the malleable twin.
const SECP256K1N_HALF: U256 = U256::from_limbs([
    0xDFE9_2F46_681B_20A0,
    0x5D57_6E73_57A4_501D,
    0xFFFF_FFFF_FFFF_FFFF,
    0x7FFF_FFFF_FFFF_FFFF,
]);

/// A pricing quote as delivered by the oracle. Lives for one settlement call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub fair_spread: Bps,
    pub correlation: Bps,
    pub as_of: Timestamp,
    pub risk_score: U256,
    pub model_id_hash: B256,
    pub features_hash: B256,
    pub digest: B256,
    /// 65 bytes, r || s || v with v in {27, 28}.
    pub signature: Bytes,
}

impl PriceQuote {
    pub fn payload(&self, portfolio_id: PortfolioId) -> QuotePayload {
        QuotePayload {
            portfolio_id,
            as_of: self.as_of,
            risk_score: self.risk_score,
            correlation: self.correlation,
            fair_spread: self.fair_spread,
            model_id_hash: self.model_id_hash,
            features_hash: self.features_hash,
        }
    }
}

// 3.1: the signed tuple, in signing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotePayload {
    pub portfolio_id: PortfolioId,
    pub as_of: Timestamp,
    pub risk_score: U256,
    pub correlation: Bps,
    pub fair_spread: Bps,
    pub model_id_hash: B256,
    pub features_hash: B256,
}

impl QuotePayload {
    /// `abi.encode` of the typed tuple. 7 words, 224 bytes.
    pub fn encode(&self) -> Vec<u8> {
        (
            self.portfolio_id,
            self.as_of.as_secs(),
            self.risk_score,
            self.correlation.value(),
            self.fair_spread.value(),
            self.model_id_hash,
            self.features_hash,
        )
            .abi_encode()
    }

    pub fn digest(&self) -> B256 {
        keccak256(self.encode())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    #[error("No price oracle adapter configured")]
    NoOracle,

    #[error("Fair spread {0} outside [1, 10000] bps")]
    FairSpreadOutOfBounds(Bps),

    #[error("Correlation {0} outside [1000, 9000] bps")]
    CorrelationOutOfBounds(Bps),

    #[error("Quote is stale: {age_secs}s old, window {window_secs}s")]
    Stale { age_secs: u64, window_secs: u64 },

    #[error("Quote dated in the future: as_of {as_of}, now {now}")]
    FromFuture { as_of: Timestamp, now: Timestamp },

    #[error("Digest mismatch: carried {carried}, computed {computed}")]
    DigestMismatch { carried: B256, computed: B256 },

    #[error("Malformed signature")]
    MalformedSignature,

    #[error("Signer recovery failed")]
    Recovery,

    #[error("Signer {recovered} is not the oracle signer {expected}")]
    SignerMismatch { recovered: Address, expected: Address },
}

/// Strict 65-byte signature parse: v must be 27 or 28 and s must be in the lower half.
pub fn parse_signature(raw: &[u8]) -> Result<Signature, QuoteError> {
    if raw.len() != 65 {
        return Err(QuoteError::MalformedSignature);
    }
    let r = U256::try_from_be_slice(&raw[..32]).ok_or(QuoteError::MalformedSignature)?;
    let s = U256::try_from_be_slice(&raw[32..64]).ok_or(QuoteError::MalformedSignature)?;
    let parity = match raw[64] {
        27 => false,
        28 => true,
        _ => return Err(QuoteError::MalformedSignature),
    };
    if r.is_zero() || s.is_zero() || s > SECP256K1N_HALF {
        return Err(QuoteError::MalformedSignature);
    }
    Ok(Signature::new(r, s, parity))
}

/// Recover the account that signed `digest` as a personal message.
pub fn recover_signer(digest: B256, signature: &[u8]) -> Result<Address, QuoteError> {
    let sig = parse_signature(signature)?;
    sig.recover_address_from_msg(digest.as_slice())
        .map_err(|_| QuoteError::Recovery)
}

// 3.2: bounds, freshness, digest, signer. first failure wins.
#[derive(Debug, Clone, Copy)]
pub struct QuoteAuthenticator {
    staleness_window_secs: u64,
}

impl Default for QuoteAuthenticator {
    fn default() -> Self {
        Self {
            staleness_window_secs: STALENESS_WINDOW_SECS,
        }
    }
}

impl QuoteAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn staleness_window_secs(&self) -> u64 {
        self.staleness_window_secs
    }

    /// Returns the recovered signer on success.
    pub fn verify(
        &self,
        quote: &PriceQuote,
        portfolio_id: PortfolioId,
        oracle_signer: Option<Principal>,
        now: Timestamp,
    ) -> Result<Principal, QuoteError> {
        let expected = oracle_signer.ok_or(QuoteError::NoOracle)?;

        let fair = quote.fair_spread.value();
        if !(MIN_FAIR_SPREAD_BPS..=MAX_FAIR_SPREAD_BPS).contains(&fair) {
            return Err(QuoteError::FairSpreadOutOfBounds(quote.fair_spread));
        }
        let corr = quote.correlation.value();
        if !(MIN_CORRELATION_BPS..=MAX_CORRELATION_BPS).contains(&corr) {
            return Err(QuoteError::CorrelationOutOfBounds(quote.correlation));
        }

        let age_secs = now.secs_since(quote.as_of).ok_or(QuoteError::FromFuture {
            as_of: quote.as_of,
            now,
        })?;
        if age_secs > self.staleness_window_secs {
            return Err(QuoteError::Stale {
                age_secs,
                window_secs: self.staleness_window_secs,
            });
        }

        let computed = quote.payload(portfolio_id).digest();
        if computed != quote.digest {
            return Err(QuoteError::DigestMismatch {
                carried: quote.digest,
                computed,
            });
        }

        let recovered = recover_signer(computed, &quote.signature)?;
        if recovered != expected {
            return Err(QuoteError::SignerMismatch { recovered, expected });
        }
        Ok(recovered)
    }

    pub fn is_valid(
        &self,
        quote: &PriceQuote,
        portfolio_id: PortfolioId,
        oracle_signer: Option<Principal>,
        now: Timestamp,
    ) -> bool {
        self.verify(quote, portfolio_id, oracle_signer, now).is_ok()
    }
}
