use thiserror::Error;

/// Errors raised by the simulator.
///
/// Everything except `ConsistencyViolation` and the I/O variants is a
/// configuration problem detected before the first call is generated.
/// A call that cannot be routed or assigned is not an error, it is blocked.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("No network named \"{0}\"")]
    UnknownTopology(String),
    #[error("Topology file {path} has an invalid edge at line {line}")]
    InvalidTopologyFile { path: String, line: usize },
    #[error("Unknown {kind} algorithm \"{name}\"")]
    UnknownPolicy { kind: &'static str, name: String },
    #[error("RWA algorithm \"{0}\" is not available")]
    UnsupportedPolicy(String),
    #[error("RWA algorithm not specified")]
    MissingPolicy,
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("Node {node} is out of range for a topology of {node_count} nodes")]
    NodeOutOfRange { node: usize, node_count: usize },
    #[error("Consistency violation: {0}")]
    ConsistencyViolation(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML config: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter { name, reason: reason.into() }
    }
}
