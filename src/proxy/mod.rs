pub mod error;
pub mod handler;
pub mod upstream;

pub use error::{ErrorEnvelope, ProxyError};
pub use handler::{ProxyState, create_router};
pub use upstream::UpstreamClient;
