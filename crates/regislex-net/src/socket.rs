//! TCP and UDP sockets.
//!
//! A [`Socket`] owns exactly one native descriptor and a type fixed at
//! creation. `send` and `recv` are partial-transfer primitives: they return
//! the number of bytes actually moved and callers loop for the rest.
//! `recv` returning `0` on a TCP socket means the peer closed in order.

use std::io::{self, Read};
use std::mem::MaybeUninit;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use regislex_core::{PalError, PalResult};
use socket2::{Domain, Protocol, SockAddr, Type};
use tracing::debug;

use crate::NetContext;

/// Transport of a socket, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketType {
    Tcp,
    Udp,
}

impl SocketType {
    fn socket2(self) -> (Type, Protocol) {
        match self {
            SocketType::Tcp => (Type::STREAM, Protocol::TCP),
            SocketType::Udp => (Type::DGRAM, Protocol::UDP),
        }
    }
}

/// Address family of a socket, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressFamily {
    #[default]
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    fn domain(self) -> Domain {
        match self {
            AddressFamily::Ipv4 => Domain::IPV4,
            AddressFamily::Ipv6 => Domain::IPV6,
        }
    }

    fn matches(self, addr: &SocketAddr) -> bool {
        match self {
            AddressFamily::Ipv4 => addr.is_ipv4(),
            AddressFamily::Ipv6 => addr.is_ipv6(),
        }
    }

    fn unspecified(self) -> IpAddr {
        match self {
            AddressFamily::Ipv4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            AddressFamily::Ipv6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        }
    }
}

/// Which halves of a connection [`Socket::shutdown`] closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownHow {
    Read,
    Write,
    Both,
}

impl From<ShutdownHow> for Shutdown {
    fn from(how: ShutdownHow) -> Self {
        match how {
            ShutdownHow::Read => Shutdown::Read,
            ShutdownHow::Write => Shutdown::Write,
            ShutdownHow::Both => Shutdown::Both,
        }
    }
}

/// One TCP or UDP socket.
///
/// Everything except connecting takes `&self`, so one thread may send while
/// another receives on the same socket.
#[derive(Debug)]
pub struct Socket {
    inner: socket2::Socket,
    kind: SocketType,
    family: AddressFamily,
    nonblocking: AtomicBool,
    ctx: NetContext,
}

impl Socket {
    /// Create an IPv4 socket.
    pub fn create(ctx: &NetContext, kind: SocketType) -> PalResult<Self> {
        Self::create_with_family(ctx, kind, AddressFamily::Ipv4)
    }

    /// Create a socket of the given family.
    ///
    /// The context's default send/receive timeouts are applied.
    pub fn create_with_family(
        ctx: &NetContext,
        kind: SocketType,
        family: AddressFamily,
    ) -> PalResult<Self> {
        let (ty, protocol) = kind.socket2();
        let inner = socket2::Socket::new(family.domain(), ty, Some(protocol))
            .map_err(|e| PalError::from_io("socket_create", e))?;

        let socket = Self {
            inner,
            kind,
            family,
            nonblocking: AtomicBool::new(false),
            ctx: ctx.clone(),
        };
        let config = ctx.config();
        socket.set_timeout(config.send_timeout_ms, config.recv_timeout_ms)?;

        debug!(?kind, ?family, "socket created");
        Ok(socket)
    }

    pub fn socket_type(&self) -> SocketType {
        self.kind
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    pub fn is_nonblocking(&self) -> bool {
        self.nonblocking.load(Ordering::Relaxed)
    }

    // ========================================================================
    // Connection setup
    // ========================================================================

    /// Resolve `host` and connect to the first address that accepts.
    ///
    /// Resolution blocks. Addresses of the other family are skipped. A
    /// descriptor whose connect failed is not reused: each further address
    /// is tried on a fresh descriptor carrying the same timeouts and
    /// blocking mode, which then replaces the old one.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `host` resolves to no usable address
    /// - the error of the last attempt if every address fails
    pub fn connect(&mut self, host: &str, port: u16) -> PalResult<()> {
        let addrs = resolve(host, port, self.family)?;
        self.connect_each(&addrs, |sock, addr| sock.connect(addr))
    }

    /// Like [`Socket::connect`], giving up on each address after `timeout`.
    pub fn connect_timeout(&mut self, host: &str, port: u16, timeout: Duration) -> PalResult<()> {
        if timeout.is_zero() {
            return Err(PalError::invalid_argument("connect timeout must be non-zero"));
        }
        let addrs = resolve(host, port, self.family)?;
        self.connect_each(&addrs, |sock, addr| sock.connect_timeout(addr, timeout))
    }

    fn connect_each<F>(&mut self, addrs: &[SocketAddr], attempt: F) -> PalResult<()>
    where
        F: Fn(&socket2::Socket, &SockAddr) -> io::Result<()>,
    {
        let mut last_error = None;
        for &addr in addrs {
            if last_error.is_some() {
                self.inner = self.fresh_descriptor()?;
            }
            match attempt(&self.inner, &SockAddr::from(addr)) {
                Ok(()) => {
                    debug!(%addr, "socket connected");
                    return Ok(());
                }
                Err(e) => {
                    debug!(%addr, error = %e, "connect attempt failed");
                    last_error = Some(e);
                }
            }
        }
        Err(match last_error {
            Some(e) => self.map_io("socket_connect", e),
            None => PalError::not_found("socket_connect"),
        })
    }

    /// A new unconnected descriptor with this socket's options.
    fn fresh_descriptor(&self) -> PalResult<socket2::Socket> {
        let to_pal = |e: io::Error| PalError::from_io("socket_connect", e);
        let (ty, protocol) = self.kind.socket2();
        let fresh =
            socket2::Socket::new(self.family.domain(), ty, Some(protocol)).map_err(to_pal)?;
        fresh
            .set_read_timeout(self.inner.read_timeout().map_err(to_pal)?)
            .map_err(to_pal)?;
        fresh
            .set_write_timeout(self.inner.write_timeout().map_err(to_pal)?)
            .map_err(to_pal)?;
        fresh
            .set_nonblocking(self.is_nonblocking())
            .map_err(to_pal)?;
        Ok(fresh)
    }

    /// Bind to `host:port` with address reuse enabled.
    ///
    /// An empty `host` or `"*"` binds every local interface. Port 0 lets
    /// the OS choose; see [`Socket::local_addr`].
    pub fn bind(&self, host: &str, port: u16) -> PalResult<()> {
        let addr = if host.is_empty() || host == "*" {
            SocketAddr::new(self.family.unspecified(), port)
        } else {
            resolve(host, port, self.family)?
                .into_iter()
                .next()
                .ok_or_else(|| PalError::not_found("socket_bind"))?
        };

        self.inner
            .set_reuse_address(true)
            .map_err(|e| PalError::from_io("socket_bind", e))?;
        self.inner
            .bind(&SockAddr::from(addr))
            .map_err(|e| PalError::from_io("socket_bind", e))?;
        debug!(%addr, "socket bound");
        Ok(())
    }

    /// Start accepting connections on a bound TCP socket.
    pub fn listen(&self, backlog: i32) -> PalResult<()> {
        if self.kind != SocketType::Tcp {
            return Err(PalError::invalid_argument("listen requires a TCP socket"));
        }
        self.inner
            .listen(backlog)
            .map_err(|e| PalError::from_io("socket_listen", e))
    }

    /// [`Socket::listen`] with the context's configured backlog.
    pub fn listen_default(&self) -> PalResult<()> {
        self.listen(self.ctx.config().listen_backlog)
    }

    /// Wait for a peer and return the connected socket and its address.
    ///
    /// The new socket inherits this socket's type and family and starts in
    /// blocking mode.
    pub fn accept(&self) -> PalResult<(Socket, SocketAddr)> {
        let (inner, peer) = self
            .inner
            .accept()
            .map_err(|e| self.map_io("socket_accept", e))?;
        let peer = peer
            .as_socket()
            .ok_or_else(|| PalError::failed("socket_accept", "peer is not an IP address"))?;

        // Some platforms let the accepted socket inherit O_NONBLOCK
        inner
            .set_nonblocking(false)
            .map_err(|e| PalError::from_io("socket_accept", e))?;

        let socket = Socket {
            inner,
            kind: self.kind,
            family: self.family,
            nonblocking: AtomicBool::new(false),
            ctx: self.ctx.clone(),
        };
        let config = self.ctx.config();
        socket.set_timeout(config.send_timeout_ms, config.recv_timeout_ms)?;

        debug!(%peer, "connection accepted");
        Ok((socket, peer))
    }

    // ========================================================================
    // Data transfer
    // ========================================================================

    /// Send up to `buf.len()` bytes; returns how many were sent.
    pub fn send(&self, buf: &[u8]) -> PalResult<usize> {
        self.inner
            .send(buf)
            .map_err(|e| self.map_io("socket_send", e))
    }

    /// Send the whole buffer, looping over partial sends.
    pub fn send_all(&self, mut buf: &[u8]) -> PalResult<()> {
        while !buf.is_empty() {
            match self.inner.send(buf) {
                Ok(0) => {
                    return Err(PalError::failed("socket_send", "connection closed mid-send"))
                }
                Ok(n) => buf = &buf[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(self.map_io("socket_send", e)),
            }
        }
        Ok(())
    }

    /// Receive up to `buf.len()` bytes; returns how many arrived.
    ///
    /// `Ok(0)` on a TCP socket means the peer closed the connection.
    pub fn recv(&self, buf: &mut [u8]) -> PalResult<usize> {
        (&self.inner)
            .read(buf)
            .map_err(|e| self.map_io("socket_recv", e))
    }

    /// Send one datagram to `host:port`.
    pub fn send_to(&self, buf: &[u8], host: &str, port: u16) -> PalResult<usize> {
        let addr = resolve(host, port, self.family)?
            .into_iter()
            .next()
            .ok_or_else(|| PalError::not_found("socket_send_to"))?;
        self.inner
            .send_to(buf, &SockAddr::from(addr))
            .map_err(|e| self.map_io("socket_send_to", e))
    }

    /// Receive one datagram and the address it came from.
    pub fn recv_from(&self, buf: &mut [u8]) -> PalResult<(usize, SocketAddr)> {
        // SAFETY: an initialized buffer is a valid MaybeUninit buffer and
        // recv_from only writes initialized bytes into it.
        let uninit = unsafe { &mut *(buf as *mut [u8] as *mut [MaybeUninit<u8>]) };
        let (n, from) = self
            .inner
            .recv_from(uninit)
            .map_err(|e| self.map_io("socket_recv_from", e))?;
        let from = from
            .as_socket()
            .ok_or_else(|| PalError::failed("socket_recv_from", "sender is not an IP address"))?;
        Ok((n, from))
    }

    // ========================================================================
    // Options
    // ========================================================================

    /// Set send and receive timeouts in milliseconds; 0 blocks indefinitely.
    ///
    /// A blocking call that hits its timeout fails with `Timeout`.
    pub fn set_timeout(&self, send_ms: u64, recv_ms: u64) -> PalResult<()> {
        let as_option = |ms: u64| (ms > 0).then(|| Duration::from_millis(ms));
        self.inner
            .set_write_timeout(as_option(send_ms))
            .map_err(|e| PalError::from_io("socket_set_timeout", e))?;
        self.inner
            .set_read_timeout(as_option(recv_ms))
            .map_err(|e| PalError::from_io("socket_set_timeout", e))
    }

    /// Toggle non-blocking mode. While enabled, `send`, `recv` and `accept`
    /// fail with `WouldBlock` instead of waiting.
    pub fn set_nonblocking(&self, nonblocking: bool) -> PalResult<()> {
        self.inner
            .set_nonblocking(nonblocking)
            .map_err(|e| PalError::from_io("socket_set_nonblocking", e))?;
        self.nonblocking.store(nonblocking, Ordering::Relaxed);
        Ok(())
    }

    pub fn local_addr(&self) -> PalResult<SocketAddr> {
        let addr = self
            .inner
            .local_addr()
            .map_err(|e| PalError::from_io("socket_local_addr", e))?;
        addr.as_socket()
            .ok_or_else(|| PalError::failed("socket_local_addr", "not an IP address"))
    }

    pub fn peer_addr(&self) -> PalResult<SocketAddr> {
        let addr = self
            .inner
            .peer_addr()
            .map_err(|e| PalError::from_io("socket_peer_addr", e))?;
        addr.as_socket()
            .ok_or_else(|| PalError::failed("socket_peer_addr", "not an IP address"))
    }

    pub fn shutdown(&self, how: ShutdownHow) -> PalResult<()> {
        self.inner
            .shutdown(how.into())
            .map_err(|e| PalError::from_io("socket_shutdown", e))
    }

    /// Release the descriptor.
    pub fn close(self) {
        debug!(kind = ?self.kind, "socket closed");
    }

    /// Unix reports an expired SO_RCVTIMEO/SO_SNDTIMEO as EAGAIN. On a
    /// blocking socket that can only mean the timeout fired.
    fn map_io(&self, operation: &str, e: io::Error) -> PalError {
        if e.kind() == io::ErrorKind::WouldBlock && !self.is_nonblocking() {
            PalError::Timeout
        } else {
            PalError::from_io(operation, e)
        }
    }
}

fn resolve(host: &str, port: u16, family: AddressFamily) -> PalResult<Vec<SocketAddr>> {
    if host.is_empty() {
        return Err(PalError::invalid_argument("host must not be empty"));
    }
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|_| PalError::not_found("resolve"))?
        .filter(|addr| family.matches(addr))
        .collect();
    if addrs.is_empty() {
        return Err(PalError::not_found("resolve"));
    }
    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_filters_family() {
        let v4 = resolve("127.0.0.1", 80, AddressFamily::Ipv4).unwrap();
        assert_eq!(v4, vec!["127.0.0.1:80".parse::<SocketAddr>().unwrap()]);
        assert!(matches!(
            resolve("127.0.0.1", 80, AddressFamily::Ipv6),
            Err(PalError::NotFound { .. })
        ));
    }

    #[test]
    fn resolve_rejects_empty_host() {
        assert!(matches!(
            resolve("", 80, AddressFamily::Ipv4),
            Err(PalError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn listen_requires_tcp() {
        let ctx = NetContext::init().unwrap();
        let udp = Socket::create(&ctx, SocketType::Udp).unwrap();
        assert!(matches!(udp.listen(1), Err(PalError::InvalidArgument { .. })));
    }

    #[test]
    fn zero_connect_timeout_rejected() {
        let ctx = NetContext::init().unwrap();
        let mut tcp = Socket::create(&ctx, SocketType::Tcp).unwrap();
        let err = tcp
            .connect_timeout("127.0.0.1", 9, Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, PalError::InvalidArgument { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn failed_attempt_moves_to_fresh_descriptor() {
        use std::os::fd::AsRawFd;

        let ctx = NetContext::init().unwrap();
        let listener = Socket::create(&ctx, SocketType::Tcp).unwrap();
        listener.bind("127.0.0.1", 0).unwrap();
        listener.listen(4).unwrap();
        let open = listener.local_addr().unwrap();

        let refused = {
            let gone = Socket::create(&ctx, SocketType::Tcp).unwrap();
            gone.bind("127.0.0.1", 0).unwrap();
            gone.local_addr().unwrap()
        };

        let mut client = Socket::create(&ctx, SocketType::Tcp).unwrap();
        client.set_timeout(0, 2_000).unwrap();
        let first_fd = client.inner.as_raw_fd();

        client
            .connect_each(&[refused, open], |sock, addr| sock.connect(addr))
            .unwrap();
        assert_ne!(client.inner.as_raw_fd(), first_fd);
        assert_eq!(client.peer_addr().unwrap(), open);
        assert_eq!(
            client.inner.read_timeout().unwrap(),
            Some(Duration::from_millis(2_000))
        );
    }

    #[test]
    fn bind_any_reports_assigned_port() {
        let ctx = NetContext::init().unwrap();
        let sock = Socket::create(&ctx, SocketType::Udp).unwrap();
        sock.bind("", 0).unwrap();
        let local = sock.local_addr().unwrap();
        assert!(local.ip().is_unspecified());
        assert_ne!(local.port(), 0);
    }
}
