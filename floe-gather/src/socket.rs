//! Non-blocking UDPv4 sockets and the readiness set that multiplexes them.
//!
//! Everything above this module works with host-order [`Ipv4Address`]
//! values; the `sockaddr` marshaling lives here and nowhere else.

use std::collections::HashMap;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use mio::net::UdpSocket;
use mio::{Events, Interest, Poll, Token};

use floe_protocol::Ipv4Address;

const MAX_EVENTS: usize = 32;

fn unexpected_ipv6(peer: std::net::SocketAddrV6) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("unexpected IPv6 peer {peer}"),
    )
}

/// A non-blocking IPv4 UDP socket bound to an ephemeral local port.
///
/// The socket closes when the channel drops.
#[derive(Debug)]
pub struct UdpChannel {
    socket: UdpSocket,
}

impl UdpChannel {
    /// Binds a fresh socket. `mio` sockets are non-blocking by construction.
    pub fn open() -> io::Result<Self> {
        let bind_addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0));
        let socket = UdpSocket::bind(bind_addr)?;
        Ok(Self { socket })
    }

    /// Sends one datagram. A transient would-block counts as a send failure
    /// and propagates like any other error.
    pub fn send_to(&self, data: &[u8], dest: Ipv4Address) -> io::Result<usize> {
        self.socket.send_to(data, SocketAddr::V4(dest.into()))
    }

    /// Receives one datagram if any is queued. Would-block is the ordinary
    /// "no data" result, reported as `Ok(None)`.
    pub fn recv_from(&self, buf: &mut [u8]) -> io::Result<Option<(usize, Ipv4Address)>> {
        match self.socket.recv_from(buf) {
            Ok((count, SocketAddr::V4(peer))) => Ok(Some((count, peer.into()))),
            Ok((_, SocketAddr::V6(peer))) => Err(unexpected_ipv6(peer)),
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Waits up to `timeout` for this socket to become readable, then
    /// receives. Expiry is not a failure; it yields `Ok(None)`.
    pub fn recv_timeout(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> io::Result<Option<(usize, Ipv4Address)>> {
        let mut poll = Poll::new()?;
        poll.registry()
            .register(&mut self.socket, Token(0), Interest::READABLE)?;
        let mut events = Events::with_capacity(1);
        let waited = poll_retrying_interrupts(&mut poll, &mut events, timeout);
        poll.registry().deregister(&mut self.socket)?;
        waited?;
        if events.is_empty() {
            return Ok(None);
        }
        self.recv_from(buf)
    }

    /// The locally-bound address in host order.
    pub fn local_addr(&self) -> io::Result<Ipv4Address> {
        match self.socket.local_addr()? {
            SocketAddr::V4(addr) => Ok(addr.into()),
            SocketAddr::V6(addr) => Err(unexpected_ipv6(addr)),
        }
    }
}

fn poll_retrying_interrupts(
    poll: &mut Poll,
    events: &mut Events,
    timeout: Duration,
) -> io::Result<()> {
    loop {
        match poll.poll(events, Some(timeout)) {
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

/// A set of channels waiting to become readable.
///
/// The `select`-equivalent: channels are enrolled with
/// [`insert`](Self::insert), [`wait`](Self::wait) blocks the calling thread
/// until some subset is readable or the timeout passes, and
/// [`remove`](Self::remove) hands a channel back for receiving.
#[derive(Debug)]
pub struct ReadySet {
    poll: Poll,
    events: Events,
    channels: HashMap<Token, UdpChannel>,
    next_token: usize,
}

impl ReadySet {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            poll: Poll::new()?,
            events: Events::with_capacity(MAX_EVENTS),
            channels: HashMap::new(),
            next_token: 0,
        })
    }

    /// Registers a channel for readable events and takes ownership of it.
    pub fn insert(&mut self, mut channel: UdpChannel) -> io::Result<Token> {
        let token = Token(self.next_token);
        self.next_token += 1;
        self.poll
            .registry()
            .register(&mut channel.socket, token, Interest::READABLE)?;
        self.channels.insert(token, channel);
        Ok(token)
    }

    /// Deregisters a channel and hands it back to the caller.
    pub fn remove(&mut self, token: Token) -> Option<UdpChannel> {
        let mut channel = self.channels.remove(&token)?;
        let _ = self.poll.registry().deregister(&mut channel.socket);
        Some(channel)
    }

    /// Waits for any enrolled channel to become readable. Returns the ready
    /// tokens in the order the poller reported them; the empty list means
    /// the timeout passed with nothing ready.
    pub fn wait(&mut self, timeout: Duration) -> io::Result<Vec<Token>> {
        poll_retrying_interrupts(&mut self.poll, &mut self.events, timeout)?;
        Ok(self.events.iter().map(|event| event.token()).collect())
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
