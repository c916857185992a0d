pub mod resolver;
pub mod scorer;

pub use resolver::{CatalogResolver, ResolverConfig};
pub use scorer::{MatchScore, MatchTarget, ScoredCandidate};
