// 4.0 pnl.rs: prorated settlement PnL. pure integer math, no I/O.
//
// pnl = (fair - fixed) * notional * elapsed / (10000 * tenor)
// rounded half-up on the magnitude with the sign restored afterwards, so a loss
// rounds exactly like the mirrored gain. off-chain replicas depend on this rule.

use crate::types::{Amount, Bps, SignedAmount};
use alloy_primitives::{Sign, U256};

pub const BPS_DENOMINATOR: u64 = 10_000;
pub const MAX_TENOR_DAYS: u32 = 36_500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PnlError {
    #[error("Invalid elapsed/tenor days")]
    InvalidDays { elapsed_days: u32, tenor_days: u32 },

    #[error("PnL arithmetic overflow")]
    Overflow,
}

/// Day-count check shared by the calculator and the engine.
pub fn validate_days(elapsed_days: u32, tenor_days: u32) -> Result<(), PnlError> {
    let tenor_ok = (1..=MAX_TENOR_DAYS).contains(&tenor_days);
    let elapsed_ok = elapsed_days >= 1 && elapsed_days <= tenor_days;
    if tenor_ok && elapsed_ok {
        Ok(())
    } else {
        Err(PnlError::InvalidDays {
            elapsed_days,
            tenor_days,
        })
    }
}

/// floor((n + d/2) / d). d must be non-zero.
pub fn round_half_up(numerator: U256, denominator: U256) -> Result<U256, PnlError> {
    let half = denominator / U256::from(2u8);
    let shifted = numerator.checked_add(half).ok_or(PnlError::Overflow)?;
    Ok(shifted / denominator)
}

// 4.1: positive => seller owes buyer, negative => buyer owes seller.
pub fn compute_pnl(
    fair_spread: Bps,
    fixed_spread: Bps,
    notional: Amount,
    elapsed_days: u32,
    tenor_days: u32,
) -> Result<SignedAmount, PnlError> {
    validate_days(elapsed_days, tenor_days)?;

    let delta = i32::from(fair_spread.value()) - i32::from(fixed_spread.value());
    if delta == 0 {
        return Ok(SignedAmount::ZERO);
    }

    let magnitude = U256::from(delta.unsigned_abs())
        .checked_mul(notional)
        .and_then(|v| v.checked_mul(U256::from(elapsed_days)))
        .ok_or(PnlError::Overflow)?;
    let denominator = U256::from(BPS_DENOMINATOR) * U256::from(tenor_days);

    let rounded = round_half_up(magnitude, denominator)?;
    let sign = if delta > 0 { Sign::Positive } else { Sign::Negative };
    SignedAmount::checked_from_sign_and_abs(sign, rounded).ok_or(PnlError::Overflow)
}
