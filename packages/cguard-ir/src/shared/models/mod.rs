mod span;

pub use span::Location;
