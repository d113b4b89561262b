// Wake-on-LAN magic packet
//
// 6 × 0xFF followed by the target MAC repeated 16 times, sent as a UDP
// broadcast. Bravia sets keep the NIC listening in standby once WOL has
// been enabled (registration requests it).

use std::net::{Ipv4Addr, SocketAddr};

use tokio::net::UdpSocket;
use tracing::debug;

use crate::client::BraviaClient;
use crate::error::Error;

/// Length of a magic packet in bytes.
pub const MAGIC_PACKET_LEN: usize = 6 + 16 * 6;

/// Parse a MAC address written as `AA:BB:CC:DD:EE:FF`, `AA-BB-...` or
/// twelve bare hex digits.
pub fn parse_mac(mac: &str) -> Result<[u8; 6], Error> {
    let digits: String = mac.chars().filter(|c| !matches!(c, ':' | '-')).collect();
    let mut octets = [0_u8; 6];
    hex::decode_to_slice(&digits, &mut octets).map_err(|_| Error::InvalidMac(mac.to_owned()))?;
    Ok(octets)
}

/// Build the magic packet for `mac`.
pub fn magic_packet(mac: &str) -> Result<[u8; MAGIC_PACKET_LEN], Error> {
    let octets = parse_mac(mac)?;
    let mut packet = [0xFF_u8; MAGIC_PACKET_LEN];
    for chunk in packet[6..].chunks_exact_mut(6) {
        chunk.copy_from_slice(&octets);
    }
    Ok(packet)
}

/// Broadcast the magic packet for `mac` to `target`.
pub async fn send_magic_packet(mac: &str, target: SocketAddr) -> Result<(), Error> {
    let packet = magic_packet(mac)?;
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .await
        .map_err(Error::WakeOnLan)?;
    socket.set_broadcast(true).map_err(Error::WakeOnLan)?;
    socket
        .send_to(&packet, target)
        .await
        .map_err(Error::WakeOnLan)?;
    debug!(mac, %target, "magic packet sent");
    Ok(())
}

impl BraviaClient {
    /// Send a Wake-on-LAN packet to the device.
    ///
    /// Returns `false` without sending anything when the MAC is unknown.
    pub async fn send_wol_req(&self) -> Result<bool, Error> {
        let Some(mac) = self.mac() else {
            debug!("no MAC address known, skipping Wake-on-LAN");
            return Ok(false);
        };
        send_magic_packet(mac, self.transport().wol_target).await?;
        Ok(true)
    }
}
