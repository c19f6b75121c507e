//! Platform-agnostic core: corpus model, aggregation, statistics, search,
//! view state, and the share codec. Nothing in here touches the DOM.

pub mod aggregate;
pub mod dataset;
pub mod format;
pub mod platform;
pub mod search;
pub mod share;
pub mod state;
pub mod stats;
