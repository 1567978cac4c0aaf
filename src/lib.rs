// cds-core: bilateral credit default swap engine.
// swaps are proposed, brokered, then settled once against an oracle-signed quote.
// all computation is deterministic; the ledger and oracle are injected.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: SwapId, Bps, Timestamp, Principal, amounts
//   2.x  swap.rs: legs, proposal terms, swap record, status machine
//   3.x  quote.rs: quote payload encoding, signature recovery, authenticator
//   4.x  pnl.rs: prorated spread pnl, round half up
//   5.x  ledger.rs: fungible ledger trait + in-memory ledger
//   6.x  capability.rs: broker / governance capabilities
//   7.x  oracle.rs: price oracle adapter (which key signs quotes)
//   8.x  registry.rs: swap store
//   9.x  events.rs: state transition events for audit
//   10.x settlement.rs: accounting vs transfers settlement
//   11.x pricing.rs: quote production and signing (oracle side)
//   12.x config.rs: engine settings, presets, toml loading
//   13.x logging.rs: tracing subscriber setup
//   14.x engine/: lifecycle engine: propose, activate, cancel, settle, admin

// core modules
pub mod engine;
pub mod events;
pub mod pnl;
pub mod quote;
pub mod registry;
pub mod swap;
pub mod types;

// integration modules
pub mod capability;
pub mod config;
pub mod ledger;
pub mod logging;
pub mod oracle;
pub mod pricing;
pub mod settlement;

// re exports for convenience
pub use capability::*;
pub use config::*;
pub use engine::*;
pub use events::*;
pub use ledger::*;
pub use oracle::*;
pub use pnl::*;
pub use quote::*;
pub use registry::*;
pub use settlement::*;
pub use swap::*;
pub use types::*;
pub use pricing::{PricingError, QuoteRequest, QuoteSigner};
