//! UDP multicast sink on a single unbound-port socket.

use std::net::{Ipv4Addr, SocketAddrV4};

use async_trait::async_trait;
use tokio::net::UdpSocket;

use super::{PacketSink, SinkError};

pub struct UdpSink {
    socket: UdpSocket,
    /// Last TTL written to the socket; skips the setsockopt when a session
    /// emits at the same clamped TTL as the previous packet.
    last_ttl: Option<u8>,
}

impl UdpSink {
    pub async fn bind() -> std::io::Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        Ok(Self {
            socket,
            last_ttl: None,
        })
    }
}

#[async_trait]
impl PacketSink for UdpSink {
    async fn send(
        &mut self,
        payload: &[u8],
        group: Ipv4Addr,
        port: u16,
        ttl: u8,
    ) -> Result<(), SinkError> {
        if self.last_ttl != Some(ttl) {
            self.socket
                .set_multicast_ttl_v4(ttl as u32)
                .map_err(SinkError::Ttl)?;
            self.last_ttl = Some(ttl);
        }
        let dest = SocketAddrV4::new(group, port);
        let sent = self
            .socket
            .send_to(payload, dest)
            .await
            .map_err(SinkError::Send)?;
        if sent != payload.len() {
            return Err(SinkError::ShortSend {
                sent,
                expected: payload.len(),
            });
        }
        Ok(())
    }
}
