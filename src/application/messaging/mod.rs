//! Message handling - routing, policies, parsing and the response sender

pub mod context;
pub mod dispatcher;
pub mod parser;
pub mod policy;
pub mod sender;

pub use context::{Context, Handler, HandlerResult, Outcome};
pub use dispatcher::{Dispatch, MessageDispatcher, Rule};
pub use policy::{throttled_probabilistic, FixedLimits, PolicyLimits, ProbabilityGate, Throttle};
pub use sender::ResponseSender;
