//! Upstream endpoint management, fan-out and consensus.
//!
//! Components, leaves first:
//! - [`UpstreamEndpoint`]: one remote JSON-RPC service (balance query and liveness probe)
//! - [`EndpointRegistry`]: the fixed endpoint set plus one availability flag per endpoint
//! - [`HealthMonitor`]: probes endpoints and writes availability into the registry
//! - [`FanoutEngine`]: sends one query to every available endpoint and joins the replies
//! - [`consensus`]: plurality vote over the successful replies
//!
//! ## Data Flow
//!
//! ```text
//! HealthMonitor ──set_availability──▶ EndpointRegistry ◀──list_available── FanoutEngine
//!                                                                             │
//!                                                   successful replies ───────┘
//!                                                           │
//!                                                           ▼
//!                                                  consensus::resolve
//! ```
//!
//! Failed balance queries are logged and counted but never written back into the registry:
//! availability is driven by the liveness probe alone.

pub mod consensus;
pub mod endpoint;
pub mod errors;
pub mod fanout;
pub mod health;
pub mod http_client;
pub mod registry;

pub use consensus::{BalanceReply, ConsensusResult};
pub use endpoint::UpstreamEndpoint;
pub use errors::{BalanceError, FailureReason, UpstreamError};
pub use fanout::{FanoutEngine, QueryReply};
pub use health::{HealthMonitor, SweepHandle};
pub use http_client::{HttpClient, HttpClientConfig};
pub use registry::{EndpointRegistry, EndpointStatus, RegistryError};
