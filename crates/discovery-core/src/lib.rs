pub mod chains;
pub mod config;
pub mod dish_extractor;
pub mod learner;
pub mod orchestrator;
pub mod product_extraction;
pub mod seed;

pub use chains::{BrandMisuseBlockList, VerifiedChainTable};
pub use config::{AiProvider, OrchestratorConfig};
pub use dish_extractor::{DishExtractionContext, DishExtractor, HttpPageFetcher, PageFetcher};
pub use learner::Learner;
pub use orchestrator::DiscoveryOrchestrator;
pub use product_extraction::extract_products;
