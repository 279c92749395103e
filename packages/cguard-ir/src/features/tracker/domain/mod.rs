mod fact_table;
mod options;

pub(crate) use fact_table::access_key;
pub use fact_table::{FactTable, PointerFact, SymbolFacts};
pub use options::TrackerOptions;
