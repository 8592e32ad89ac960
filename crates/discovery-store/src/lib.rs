pub mod feedback_store;
pub mod strategy_store;
pub mod venue_store;

pub use feedback_store::{FeedbackStore, InMemoryFeedbackStore};
pub use strategy_store::{InMemoryStrategyStore, StrategyStore, UsageOutcome};
pub use venue_store::{DiscoveredVenueStore, InMemoryVenueStore, VenueStats};
