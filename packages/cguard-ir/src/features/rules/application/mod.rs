mod registry;

pub use registry::RuleRegistry;
