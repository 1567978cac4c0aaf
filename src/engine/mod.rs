// 14.0: swap lifecycle engine. propose -> activate -> cancel/settle, capability
// checks, quote authentication, pnl, ledger adapter, event trail.
// every operation validates fully before it mutates, so a failed call leaves no trace.

mod admin;
mod core;
mod lifecycle;
mod results;
mod settle;
mod shared;

pub use self::core::Engine;
pub use results::{EngineError, EngineResult};
pub use shared::SharedEngine;
