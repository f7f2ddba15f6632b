//! Recording sink for tests: captures every send, optionally failing
//! selected destination ports.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use async_trait::async_trait;
use bytes::Bytes;

use super::{PacketSink, SinkError};

#[derive(Debug, Clone)]
pub struct SentPacket {
    pub payload: Bytes,
    pub group: Ipv4Addr,
    pub port: u16,
    pub ttl: u8,
}

#[derive(Debug, Default)]
pub struct MockSink {
    pub sent: Vec<SentPacket>,
    pub attempts: u64,
    fail_ports: HashSet<u16>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send to `port` will fail with [`SinkError::Injected`].
    pub fn fail_port(&mut self, port: u16) {
        self.fail_ports.insert(port);
    }

    pub fn sent_to(&self, port: u16) -> Vec<&SentPacket> {
        self.sent.iter().filter(|p| p.port == port).collect()
    }
}

#[async_trait]
impl PacketSink for MockSink {
    async fn send(
        &mut self,
        payload: &[u8],
        group: Ipv4Addr,
        port: u16,
        ttl: u8,
    ) -> Result<(), SinkError> {
        self.attempts += 1;
        if self.fail_ports.contains(&port) {
            return Err(SinkError::Injected);
        }
        self.sent.push(SentPacket {
            payload: Bytes::copy_from_slice(payload),
            group,
            port,
            ttl,
        });
        Ok(())
    }
}
