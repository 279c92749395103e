/*
 * Symbol & Lifetime Tracker
 *
 * Walks one function's statements in order, keeping a FactTable of
 * buffers, pointer lifecycle states and value provenance. At each call it
 * resolves argument facts and runs the rule registry; at each indexed
 * access it asks the range checker; at each exit it checks for leaks.
 *
 * A fresh tracker (and table) is built per function; nothing is shared
 * between functions.
 */

pub mod application;
pub mod domain;

pub use application::LifetimeTracker;
pub use domain::{FactTable, PointerFact, SymbolFacts, TrackerOptions};
