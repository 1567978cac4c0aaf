// 11.0 pricing.rs: the quote producer side. hashes model ids and feature sets,
// derives stub pricing outputs deterministically, signs canonical payloads.
// the engine never calls this; tests and the simulator use it to mint quotes that
// the authenticator in quote.rs must accept.

use crate::quote::{PriceQuote, QuotePayload};
use crate::types::{Bps, PortfolioId, Principal, Timestamp};
use alloy_primitives::{keccak256, Bytes, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use serde_json::{Map, Value};
use std::io::{self, Write};

pub const DEFAULT_MODEL_ID: &str = "xgb-v0-stub";

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    Signer(#[from] alloy_signer::Error),

    #[error("Features not serializable: {0}")]
    Features(#[from] serde_json::Error),

    #[error("Canonical features not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub fn model_id_hash(model_id: &str) -> B256 {
    keccak256(model_id.as_bytes())
}

/// keccak of the canonical features JSON, see [`canonical_features_json`].
pub fn features_hash(features: &Value) -> Result<B256, PricingError> {
    Ok(keccak256(canonical_json_bytes(features)?))
}

/// Features rendered byte-for-byte as the pricing service's
/// `json.dumps(features, separators=(",", ":"), sort_keys=True)`: keys sorted at
/// every depth, no whitespace, non-ASCII escaped as `\uXXXX`, floats in Python repr.
/// Integers beyond 64 bits arrive here as floats and cannot match.
pub fn canonical_features_json(features: &Value) -> Result<String, PricingError> {
    Ok(String::from_utf8(canonical_json_bytes(features)?)?)
}

fn canonical_json_bytes(features: &Value) -> Result<Vec<u8>, PricingError> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, PythonJsonFormatter);
    canonicalize(features).serialize(&mut ser)?;
    Ok(out)
}

// compact output; serde_json already escapes quotes, backslashes and C0 controls the
// same way, the rest differs.
struct PythonJsonFormatter;

impl Formatter for PythonJsonFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(python_float_repr(value).as_bytes())
    }
}

// shortest round-trip digits; scientific below 1e-4 and from 1e16, exponent signed
// and at least two digits, integral values keep a trailing ".0".
fn python_float_repr(value: f64) -> String {
    let sci = format!("{value:e}");
    let parts = sci
        .split_once('e')
        .and_then(|(mantissa, exp)| exp.parse::<i32>().ok().map(|exp| (mantissa, exp)));
    match parts {
        Some((mantissa, exp)) if !(-4..16).contains(&exp) => format!("{mantissa}e{exp:+03}"),
        _ => {
            let plain = format!("{value}");
            if plain.contains('.') {
                plain
            } else {
                format!("{plain}.0")
            }
        }
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

// 11.1: stub model outputs. not a pricing model, just stable numbers per input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOutputs {
    pub risk_score: U256,
    pub correlation: Bps,
    pub fair_spread: Bps,
}

pub fn deterministic_outputs(
    portfolio_id: PortfolioId,
    as_of: Timestamp,
    features_hash: B256,
) -> ModelOutputs {
    let mut preimage = Vec::with_capacity(72);
    preimage.extend_from_slice(portfolio_id.as_slice());
    preimage.extend_from_slice(&as_of.as_secs().to_be_bytes());
    preimage.extend_from_slice(features_hash.as_slice());
    let x = U256::from_be_bytes(keccak256(&preimage).0);

    let risk_score = x % U256::from(10u64).pow(U256::from(24u64));
    let correlation = (x % U256::from(10_001u64)).to::<u16>();
    let fair_spread = 100 + (x % U256::from(1_901u64)).to::<u16>();

    ModelOutputs {
        risk_score,
        correlation: Bps(correlation),
        fair_spread: Bps(fair_spread),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub portfolio_id: PortfolioId,
    pub as_of: Timestamp,
    pub model_id: String,
    pub features: Value,
}

impl QuoteRequest {
    pub fn new(portfolio_id: PortfolioId, as_of: Timestamp, features: Value) -> Self {
        Self {
            portfolio_id,
            as_of,
            model_id: DEFAULT_MODEL_ID.to_string(),
            features,
        }
    }
}

/// Oracle-side signer for price quotes.
#[derive(Debug, Clone)]
pub struct QuoteSigner {
    signer: PrivateKeySigner,
}

impl QuoteSigner {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    pub fn random() -> Self {
        Self::new(PrivateKeySigner::random())
    }

    /// Reproducible key whose scalar is `seed`, for local runs and tests.
    pub fn from_seed(seed: u64) -> Result<Self, PricingError> {
        let key = B256::from(U256::from(seed));
        let signer = PrivateKeySigner::from_bytes(&key)
            .map_err(|e| PricingError::InvalidKey(e.to_string()))?;
        Ok(Self::new(signer))
    }

    pub fn address(&self) -> Principal {
        self.signer.address()
    }

    /// Digest the payload and sign it as a personal message.
    pub fn sign_payload(&self, payload: &QuotePayload) -> Result<PriceQuote, PricingError> {
        let digest = payload.digest();
        let signature = self.signer.sign_message_sync(digest.as_slice())?;
        Ok(PriceQuote {
            fair_spread: payload.fair_spread,
            correlation: payload.correlation,
            as_of: payload.as_of,
            risk_score: payload.risk_score,
            model_id_hash: payload.model_id_hash,
            features_hash: payload.features_hash,
            digest,
            signature: Bytes::from(signature.as_bytes().to_vec()),
        })
    }

    /// Price a request with the stub model and sign the result.
    pub fn quote(&self, request: &QuoteRequest) -> Result<PriceQuote, PricingError> {
        let fh = features_hash(&request.features)?;
        let outputs = deterministic_outputs(request.portfolio_id, request.as_of, fh);
        self.sign_payload(&QuotePayload {
            portfolio_id: request.portfolio_id,
            as_of: request.as_of,
            risk_score: outputs.risk_score,
            correlation: outputs.correlation,
            fair_spread: outputs.fair_spread,
            model_id_hash: model_id_hash(&request.model_id),
            features_hash: fh,
        })
    }
}
