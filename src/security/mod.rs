pub mod bot;
pub mod gate;
pub mod middleware;
pub mod rate_limit;
pub mod shield;

pub use gate::{Decision, DenyReason, SecurityGate};

/// Request metadata the gate decides on. Recomputed for every request;
/// nothing here is persisted.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub ip: String,
    pub user_agent: Option<String>,
    pub method: String,
    pub path: String,
    pub query: Option<String>,
}

#[cfg(test)]
pub(crate) fn test_meta(ip: &str, user_agent: Option<&str>, path: &str) -> RequestMeta {
    RequestMeta {
        ip: ip.to_string(),
        user_agent: user_agent.map(str::to_string),
        method: "GET".to_string(),
        path: path.to_string(),
        query: None,
    }
}
