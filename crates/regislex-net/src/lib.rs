//! Blocking and non-blocking TCP/UDP sockets.
//!
//! Networking starts with a [`NetContext`]. Sockets are created against a
//! context and keep it alive, so the platform socket subsystem (Winsock on
//! Windows) stays initialized for as long as any socket is open.
//!
//! ## Example
//!
//! ```rust,no_run
//! use regislex_net::{NetContext, Socket, SocketType};
//!
//! let ctx = NetContext::init()?;
//! let mut client = Socket::create(&ctx, SocketType::Tcp)?;
//! client.connect("example.com", 80)?;
//! client.send_all(b"HEAD / HTTP/1.0\r\n\r\n")?;
//! # Ok::<(), regislex_net::PalError>(())
//! ```

mod context;
mod socket;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

pub use context::{NetConfig, NetContext};
pub use socket::{AddressFamily, ShutdownHow, Socket, SocketType};

pub use regislex_core::{PalError, PalResult};
