//! Custom request extractors.

mod client_ip;
mod validated_json;

pub use client_ip::ClientIp;
pub use validated_json::ValidatedJson;
