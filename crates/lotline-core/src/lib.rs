//! # Lotline Core
//!
//! Shared domain vocabulary for the lotline campaign platform.
//!
//! This crate holds the types every other lotline crate speaks in:
//!
//! - [`Platform`] - the social platforms a campaign can target, with the
//!   mapping to the scheduling provider's network identifiers
//! - [`PostStatus`] - the publication state mirrored from the scheduler
//! - [`StockNumber`] - the inventory key a campaign hangs off, with the
//!   case-insensitive text matching reconciliation relies on

pub mod platform;
pub mod status;
pub mod stock;

pub use platform::Platform;
pub use status::PostStatus;
pub use stock::{ParseStockNumberError, StockNumber};
