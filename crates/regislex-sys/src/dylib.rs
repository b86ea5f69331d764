//! Dynamic library loading.
//!
//! A missing library or symbol is reported as `NotFound`; it never aborts
//! the process.

use std::ffi::c_void;
use std::fmt;

use libloading::Symbol;
use regislex_core::{PalError, PalResult};
use tracing::debug;

/// Platform file name for a library stem: `libfoo.so`, `libfoo.dylib`, `foo.dll`.
pub fn library_filename(stem: &str) -> String {
    libloading::library_filename(stem)
        .to_string_lossy()
        .into_owned()
}

/// One loaded shared library.
pub struct Library {
    inner: libloading::Library,
    path: String,
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library").field("path", &self.path).finish()
    }
}

impl Library {
    /// Load the library at `path` (or by bare name through the platform
    /// search path).
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty path or one containing NUL
    /// - `NotFound` if the library cannot be found or loaded
    pub fn load(path: &str) -> PalResult<Self> {
        if path.is_empty() || path.contains('\0') {
            return Err(PalError::invalid_argument("library path must be non-empty without NUL"));
        }

        // SAFETY: running the library's initializers is inherent to loading
        // it; callers choose which libraries they trust.
        let inner = unsafe { libloading::Library::new(path) }.map_err(|e| {
            debug!(path, error = %e, "library load failed");
            PalError::not_found("library_load")
        })?;

        debug!(path, "library loaded");
        Ok(Self {
            inner,
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Look up a typed symbol.
    ///
    /// # Safety
    ///
    /// `T` must match the symbol's real type (for functions, the exact
    /// signature and ABI).
    pub unsafe fn symbol<T>(&self, name: &str) -> PalResult<Symbol<'_, T>> {
        check_symbol_name(name)?;
        self.inner.get::<T>(name.as_bytes()).map_err(|e| {
            debug!(library = %self.path, symbol = name, error = %e, "symbol lookup failed");
            PalError::not_found("library_symbol")
        })
    }

    /// Address of a symbol, for handing across an untyped boundary.
    pub fn symbol_address(&self, name: &str) -> PalResult<*mut c_void> {
        // SAFETY: the symbol is read only as an address, never called or
        // dereferenced here.
        let symbol = unsafe { self.symbol::<*mut c_void>(name)? };
        Ok(*symbol)
    }

    /// Unload the library. Symbols borrowed from it cannot outlive this.
    pub fn unload(self) -> PalResult<()> {
        let path = self.path;
        self.inner
            .close()
            .map_err(|e| PalError::failed("library_unload", e.to_string()))?;
        debug!(path, "library unloaded");
        Ok(())
    }
}

fn check_symbol_name(name: &str) -> PalResult<()> {
    if name.is_empty() || name.contains('\0') {
        return Err(PalError::invalid_argument("symbol name must be non-empty without NUL"));
    }
    Ok(())
}
