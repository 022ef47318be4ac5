//! Broadcast transport for the ringchat protocol
//!
//! The protocol only ever broadcasts: "targeted" messages carry the
//! receiver's name in their payload and everybody else filters them out.
//! This module provides the transport seam and its production
//! implementation, UDP multicast on a shared group and port.

use std::io;
use std::net::{IpAddr, Ipv4Addr};

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::debug;

use crate::errors::{Result, RuntimeError};

// ----------------------------------------------------------------------------
// Transport Trait
// ----------------------------------------------------------------------------

/// Send-to-all / receive-from-all datagram channel, possibly lossy.
#[async_trait]
pub trait Broadcast: Send {
    /// Send one datagram to the whole group.
    async fn send(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Receive the next datagram and the address it originated from.
    async fn recv(&mut self) -> io::Result<(Vec<u8>, IpAddr)>;

    /// This endpoint's own source address, used to discard its own
    /// broadcasts as they loop back.
    fn local_ip(&self) -> Option<IpAddr>;
}

// ----------------------------------------------------------------------------
// UDP Multicast Transport
// ----------------------------------------------------------------------------

/// Maximum datagram the transport will accept.
const RECV_BUFFER_BYTES: usize = 64 * 1024;

/// UDP multicast implementation of [`Broadcast`].
pub struct UdpMulticastTransport {
    socket: UdpSocket,
    group: Ipv4Addr,
    port: u16,
    local_ip: Option<IpAddr>,
    buffer: Vec<u8>,
}

impl UdpMulticastTransport {
    /// Bind the shared port and join the multicast group. Failure here is
    /// the one unrecoverable startup error of a node.
    pub async fn open(group: Ipv4Addr, port: u16) -> Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map_err(RuntimeError::TransportSetup)?;
        socket
            .join_multicast_v4(group, Ipv4Addr::UNSPECIFIED)
            .map_err(RuntimeError::TransportSetup)?;

        let local_ip = discover_local_ip(group, port);
        debug!(%group, port, ?local_ip, "joined multicast group");

        Ok(Self {
            socket,
            group,
            port,
            local_ip,
            buffer: vec![0u8; RECV_BUFFER_BYTES],
        })
    }
}

#[async_trait]
impl Broadcast for UdpMulticastTransport {
    async fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.socket.send_to(bytes, (self.group, self.port)).await?;
        Ok(())
    }

    async fn recv(&mut self) -> io::Result<(Vec<u8>, IpAddr)> {
        let (len, addr) = self.socket.recv_from(&mut self.buffer).await?;
        Ok((self.buffer[..len].to_vec(), addr.ip()))
    }

    fn local_ip(&self) -> Option<IpAddr> {
        self.local_ip
    }
}

/// Best-effort discovery of the address our datagrams will carry, by asking
/// the routing table which interface reaches the group. No traffic is sent.
fn discover_local_ip(group: Ipv4Addr, port: u16) -> Option<IpAddr> {
    let probe = std::net::UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    probe.connect((group, port)).ok()?;
    probe.local_addr().ok().map(|addr| addr.ip())
}
