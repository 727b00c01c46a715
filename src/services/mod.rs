pub mod catalog;
pub mod recommendations;
pub mod resolution;
pub mod synthesis;

pub use recommendations::RecommendationService;
pub use resolution::{RecommendationPipeline, RecommendationSource};
