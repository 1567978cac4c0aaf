// 14.3 engine/settle.rs: quote-driven settlement.
// status is written before the ledger is touched; a ledger refusal rolls the status
// back and publishes nothing.

use super::core::Engine;
use super::results::EngineError;
use crate::capability::CapabilityRegistry;
use crate::events::{EventPayload, SettlementExecutedEvent};
use crate::ledger::FungibleLedger;
use crate::pnl::compute_pnl;
use crate::quote::PriceQuote;
use crate::settlement::{SettlementResult, Transfer};
use crate::swap::SwapStatus;
use crate::types::{PortfolioId, Principal, SwapId};
use tracing::{info, warn};

impl<C: CapabilityRegistry, L: FungibleLedger> Engine<C, L> {
    /// Settle an active swap against a signed quote. Anyone may submit; the quote
    /// signature is the authority.
    pub fn settle(
        &mut self,
        caller: Principal,
        id: SwapId,
        quote: &PriceQuote,
        elapsed_days: u32,
        tenor_days: u32,
    ) -> Result<SettlementResult, EngineError> {
        self.ensure_not_paused()?;

        let swap = self.registry.get(id).ok_or(EngineError::NotFound(id))?;
        if !swap.status.can_transition_to(SwapStatus::Settled) {
            return Err(EngineError::invalid("Swap not in active status"));
        }
        let buyer = swap.buyer.counterparty;
        let seller = swap.seller.counterparty;
        let fixed = swap.buyer.spread;
        let notional = swap.buyer.notional;
        let portfolio_id = swap.portfolio_id;

        let now = self.current_time;
        if let Err(e) = self.authenticator.verify(quote, portfolio_id, self.oracle_signer(), now) {
            warn!(swap_id = %id, submitted_by = %caller, error = %e, "quote rejected");
            return Err(EngineError::invalid("Invalid quote signature"));
        }

        let pnl = compute_pnl(quote.fair_spread, fixed, notional, elapsed_days, tenor_days)?;
        let transfer = Transfer::from_pnl(pnl, buyer, seller);

        // phase 1
        self.registry.set_status(id, SwapStatus::Settled)?;

        // phase 2
        let spender = self.config.engine_address;
        let paid = match self.settlement.execute(&mut self.ledger, spender, id, &transfer) {
            Ok(paid) => paid,
            Err(e) => {
                self.registry.set_status(id, SwapStatus::Active)?;
                warn!(swap_id = %id, payer = %transfer.payer, error = %e, "settlement transfer refused");
                return Err(e.into());
            }
        };

        if let Some(paid) = paid {
            self.emit_event(EventPayload::SettlementPaid(paid));
        }
        self.emit_event(EventPayload::SettlementExecuted(SettlementExecutedEvent {
            swap_id: id,
            buyer,
            seller,
            pnl,
            settled_at: now,
            elapsed_days,
            tenor_days,
        }));

        info!(
            swap_id = %id,
            pnl = %pnl,
            mode = %self.settlement.mode(),
            fair_spread = %quote.fair_spread,
            "swap settled"
        );

        Ok(SettlementResult {
            swap_id: id,
            pnl,
            payer: transfer.payer,
            payee: transfer.payee,
            amount: transfer.amount,
            elapsed_days,
            tenor_days,
            settled_at: now,
            mode: self.settlement.mode(),
        })
    }

    /// Read-only quote check against the current oracle signer and clock.
    /// Pausing the engine does not affect it.
    pub fn verify_quote(&self, quote: &PriceQuote, portfolio_id: PortfolioId) -> bool {
        self.authenticator
            .is_valid(quote, portfolio_id, self.oracle_signer(), self.current_time)
    }
}
