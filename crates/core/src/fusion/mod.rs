//! Source fusion: plan senses from dictionary rows, then resolve every
//! output field against the auxiliary sources and caches.

pub mod controller;
pub mod planner;
pub mod proxy;

pub use controller::FusionContext;
pub use planner::{card_id, plan, HintRequest, JyutpingRequest, PlannedSense};
pub use proxy::ProxyIndex;
