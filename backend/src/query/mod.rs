pub mod facets;
pub mod orchestrator;
pub mod predicate;
