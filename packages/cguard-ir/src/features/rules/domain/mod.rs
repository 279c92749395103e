mod api;
mod resolved_call;

pub use api::{ApiClass, ApiSpec, CalleePattern};
pub use resolved_call::{ArgFact, ResolvedCall};
