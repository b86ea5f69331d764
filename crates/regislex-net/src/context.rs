//! Network subsystem lifetime and socket defaults.

use std::sync::Arc;

use regislex_core::PalResult;
use tracing::debug;

#[cfg(unix)]
use crate::unix as platform;
#[cfg(windows)]
use crate::windows as platform;

/// Defaults applied to sockets created under a [`NetContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetConfig {
    /// Backlog used by [`crate::Socket::listen_default`].
    ///
    /// Default: 128
    pub listen_backlog: i32,

    /// Send timeout applied to each new socket, in milliseconds.
    ///
    /// Default: 0 (block indefinitely)
    pub send_timeout_ms: u64,

    /// Receive timeout applied to each new socket, in milliseconds.
    ///
    /// Default: 0 (block indefinitely)
    pub recv_timeout_ms: u64,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            listen_backlog: 128,
            send_timeout_ms: 0,
            recv_timeout_ms: 0,
        }
    }
}

/// Initialized network subsystem.
///
/// Every socket is created against a context and keeps it alive, so the
/// platform teardown (Winsock cleanup on Windows) runs only after the
/// context handle and every socket created from it are gone. Contexts are
/// independent; creating several is safe.
#[derive(Debug, Clone)]
pub struct NetContext {
    inner: Arc<ContextInner>,
}

#[derive(Debug)]
struct ContextInner {
    config: NetConfig,
}

impl Drop for ContextInner {
    fn drop(&mut self) {
        platform::cleanup();
        debug!("network subsystem released");
    }
}

impl NetContext {
    /// Initialize networking with default settings.
    pub fn init() -> PalResult<Self> {
        Self::with_config(NetConfig::default())
    }

    pub fn with_config(config: NetConfig) -> PalResult<Self> {
        platform::startup()?;
        debug!(?config, "network subsystem initialized");
        Ok(Self {
            inner: Arc::new(ContextInner { config }),
        })
    }

    pub fn config(&self) -> &NetConfig {
        &self.inner.config
    }

    /// Give up this handle. Teardown happens once the last socket created
    /// from the context is closed as well.
    pub fn cleanup(self) {
        drop(self);
    }
}
