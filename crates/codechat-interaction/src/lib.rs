//! Interaction layer: the HTTP gateway to the analysis backend and the
//! per-turn resolvers the conversation engine routes through.

pub mod http_gateway;
pub mod resolver;

pub use http_gateway::HttpGateway;
pub use resolver::{DemoResolver, LiveResolver, Resolution, Resolver, Turn, demo_reply};
