//! Networking context and socket exports.

use std::os::raw::c_char;
use std::slice;

use regislex_net::{NetContext, Socket, SocketType};

use crate::args::{opt_str_arg, str_arg, try_arg, try_pal, write_out};
use crate::error::{status, RegislexErrorCode};

/// Stream (TCP) socket type for `regislex_socket_create`.
pub const REGISLEX_SOCK_TCP: i32 = 0;
/// Datagram (UDP) socket type for `regislex_socket_create`.
pub const REGISLEX_SOCK_UDP: i32 = 1;

/// Opaque networking context. Sockets created from it keep the platform
/// stack initialized until they are closed.
pub struct RegislexNetContext {
    inner: NetContext,
}

/// Opaque socket.
///
/// Calls other than connect and close may run concurrently on one handle,
/// e.g. a send on one thread and a recv on another.
pub struct RegislexSocket {
    inner: Socket,
}

unsafe fn socket_ref<'a>(socket: *mut RegislexSocket) -> Result<&'a Socket, RegislexErrorCode> {
    socket
        .as_ref()
        .map(|s| &s.inner)
        .ok_or(RegislexErrorCode::InvalidArgument)
}

// ============================================================================
// Context
// ============================================================================

/// Initialize the platform networking stack.
///
/// # Safety
///
/// `ctx_out` must be valid for writes. Release with `regislex_net_cleanup`.
#[no_mangle]
pub unsafe extern "C" fn regislex_net_init(
    ctx_out: *mut *mut RegislexNetContext,
) -> RegislexErrorCode {
    if ctx_out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    let inner = try_pal!(NetContext::init());
    write_out(ctx_out, Box::into_raw(Box::new(RegislexNetContext { inner })))
}

/// Release a context handle. Null is a no-op.
///
/// # Safety
///
/// `ctx` must be null or come from `regislex_net_init`, released once.
#[no_mangle]
pub unsafe extern "C" fn regislex_net_cleanup(ctx: *mut RegislexNetContext) {
    if !ctx.is_null() {
        Box::from_raw(ctx).inner.cleanup();
    }
}

// ============================================================================
// Socket lifecycle
// ============================================================================

/// Create an IPv4 socket of `socket_type` (`REGISLEX_SOCK_TCP` or
/// `REGISLEX_SOCK_UDP`).
///
/// # Safety
///
/// `ctx` must come from `regislex_net_init` and `socket_out` be valid for
/// writes. Release with `regislex_socket_close`.
///
/// # Example (C)
///
/// ```c
/// RegislexNetContext* ctx;
/// RegislexSocket* sock;
/// regislex_net_init(&ctx);
/// if (regislex_socket_create(ctx, REGISLEX_SOCK_TCP, &sock) == REGISLEX_OK &&
///     regislex_socket_connect(sock, "docket.example", 443) == REGISLEX_OK) {
///     /* ... */
/// }
/// regislex_socket_close(sock);
/// regislex_net_cleanup(ctx);
/// ```
#[no_mangle]
pub unsafe extern "C" fn regislex_socket_create(
    ctx: *mut RegislexNetContext,
    socket_type: i32,
    socket_out: *mut *mut RegislexSocket,
) -> RegislexErrorCode {
    let Some(ctx) = ctx.as_ref() else {
        return RegislexErrorCode::InvalidArgument;
    };
    let kind = match socket_type {
        REGISLEX_SOCK_TCP => SocketType::Tcp,
        REGISLEX_SOCK_UDP => SocketType::Udp,
        _ => return RegislexErrorCode::InvalidArgument,
    };
    if socket_out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    let inner = try_pal!(Socket::create(&ctx.inner, kind));
    write_out(socket_out, Box::into_raw(Box::new(RegislexSocket { inner })))
}

/// Close a socket. Null is a no-op.
///
/// # Safety
///
/// `socket` must be null or a live socket, closed once.
#[no_mangle]
pub unsafe extern "C" fn regislex_socket_close(socket: *mut RegislexSocket) {
    if !socket.is_null() {
        Box::from_raw(socket).inner.close();
    }
}

// ============================================================================
// Addressing
// ============================================================================

/// Connect to `host:port`, trying each resolved address in turn.
///
/// # Safety
///
/// `socket` must be live and not in use by any other thread for the
/// duration of the call; `host` must be a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn regislex_socket_connect(
    socket: *mut RegislexSocket,
    host: *const c_char,
    port: u16,
) -> RegislexErrorCode {
    let Some(socket) = socket.as_mut().map(|s| &mut s.inner) else {
        return RegislexErrorCode::InvalidArgument;
    };
    let host = try_arg!(str_arg(host));
    status(socket.connect(host, port))
}

/// Bind to `host:port`. A null or empty `host` binds every interface.
///
/// # Safety
///
/// `socket` must be live and `host` null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn regislex_socket_bind(
    socket: *mut RegislexSocket,
    host: *const c_char,
    port: u16,
) -> RegislexErrorCode {
    let socket = try_arg!(socket_ref(socket));
    let host = try_arg!(opt_str_arg(host)).unwrap_or("");
    status(socket.bind(host, port))
}

/// Mark a bound TCP socket as listening. `backlog <= 0` uses the context's
/// configured backlog.
///
/// # Safety
///
/// `socket` must be live.
#[no_mangle]
pub unsafe extern "C" fn regislex_socket_listen(
    socket: *mut RegislexSocket,
    backlog: i32,
) -> RegislexErrorCode {
    let socket = try_arg!(socket_ref(socket));
    if backlog <= 0 {
        status(socket.listen_default())
    } else {
        status(socket.listen(backlog))
    }
}

/// Accept one connection into a new blocking socket.
///
/// # Safety
///
/// `socket` must be live and `client_out` valid for writes.
#[no_mangle]
pub unsafe extern "C" fn regislex_socket_accept(
    socket: *mut RegislexSocket,
    client_out: *mut *mut RegislexSocket,
) -> RegislexErrorCode {
    let socket = try_arg!(socket_ref(socket));
    if client_out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    let (inner, _peer) = try_pal!(socket.accept());
    write_out(client_out, Box::into_raw(Box::new(RegislexSocket { inner })))
}

/// Local port the socket is bound to (useful after binding port 0).
///
/// # Safety
///
/// `socket` must be live and `port_out` valid for writes.
#[no_mangle]
pub unsafe extern "C" fn regislex_socket_local_port(
    socket: *mut RegislexSocket,
    port_out: *mut u16,
) -> RegislexErrorCode {
    let socket = try_arg!(socket_ref(socket));
    if port_out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    write_out(port_out, try_pal!(socket.local_addr()).port())
}

// ============================================================================
// Data transfer
// ============================================================================

/// Send up to `len` bytes; `*sent_out` receives the count actually sent.
///
/// # Safety
///
/// `socket` must be live, `buf` readable for `len` bytes (may be null when
/// `len` is 0) and `sent_out` valid for writes.
#[no_mangle]
pub unsafe extern "C" fn regislex_socket_send(
    socket: *mut RegislexSocket,
    buf: *const u8,
    len: usize,
    sent_out: *mut usize,
) -> RegislexErrorCode {
    let socket = try_arg!(socket_ref(socket));
    if sent_out.is_null() || (buf.is_null() && len > 0) {
        return RegislexErrorCode::InvalidArgument;
    }
    let data = if len == 0 {
        &[][..]
    } else {
        slice::from_raw_parts(buf, len)
    };
    write_out(sent_out, try_pal!(socket.send(data)))
}

/// Receive up to `len` bytes; `*received_out` is 0 on orderly shutdown.
///
/// # Safety
///
/// `socket` must be live, `buf` writable for `len` bytes and
/// `received_out` valid for writes.
#[no_mangle]
pub unsafe extern "C" fn regislex_socket_recv(
    socket: *mut RegislexSocket,
    buf: *mut u8,
    len: usize,
    received_out: *mut usize,
) -> RegislexErrorCode {
    let socket = try_arg!(socket_ref(socket));
    if received_out.is_null() || buf.is_null() || len == 0 {
        return RegislexErrorCode::InvalidArgument;
    }
    let data = slice::from_raw_parts_mut(buf, len);
    write_out(received_out, try_pal!(socket.recv(data)))
}

// ============================================================================
// Options
// ============================================================================

/// Set send and receive timeouts in milliseconds; 0 disables a timeout.
///
/// # Safety
///
/// `socket` must be live.
#[no_mangle]
pub unsafe extern "C" fn regislex_socket_set_timeout(
    socket: *mut RegislexSocket,
    send_ms: u64,
    recv_ms: u64,
) -> RegislexErrorCode {
    let socket = try_arg!(socket_ref(socket));
    status(socket.set_timeout(send_ms, recv_ms))
}

/// Switch non-blocking mode on or off.
///
/// # Safety
///
/// `socket` must be live.
#[no_mangle]
pub unsafe extern "C" fn regislex_socket_set_nonblocking(
    socket: *mut RegislexSocket,
    nonblocking: bool,
) -> RegislexErrorCode {
    let socket = try_arg!(socket_ref(socket));
    status(socket.set_nonblocking(nonblocking))
}
