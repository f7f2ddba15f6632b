//! Send capability: trait, error type, and sink implementations.

pub mod udp;

#[cfg(any(test, feature = "sink-mock"))]
pub mod mock;

use std::net::Ipv4Addr;

use async_trait::async_trait;

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("setting ttl: {0}")]
    Ttl(#[source] std::io::Error),
    #[error("send: {0}")]
    Send(#[source] std::io::Error),
    #[error("short send: {sent} of {expected} bytes")]
    ShortSend { sent: usize, expected: usize },
    #[error("injected failure")]
    Injected,
}

/// The one capability the scheduler is handed: deliver a datagram to the
/// configured group at a per-session port and TTL. The scheduler never owns
/// socket lifecycle and treats every failure as transient.
#[async_trait]
pub trait PacketSink: Send {
    async fn send(
        &mut self,
        payload: &[u8],
        group: Ipv4Addr,
        port: u16,
        ttl: u8,
    ) -> Result<(), SinkError>;
}
