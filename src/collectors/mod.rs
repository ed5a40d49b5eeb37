//! Market data collectors.
//!
//! Every collector is best-effort: failures are logged and turn into
//! absent or empty values, never errors.

pub mod crypto;
pub mod news;
pub mod onchain;
pub mod tradfi;

pub use crypto::CryptoCollector;
pub use news::NewsCollector;
pub use onchain::OnChainCollector;
pub use tradfi::TradFiCollector;
