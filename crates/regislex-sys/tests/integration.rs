//! Integration tests for regislex-sys.

use regislex_sys::{
    available_memory, library_filename, random_bytes, system_info, total_memory, Library,
    PalError,
};

// ============================================================================
// Randomness
// ============================================================================

#[test]
fn consecutive_draws_differ_and_are_never_zero() {
    for trial in 0..1000 {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        random_bytes(&mut a).unwrap();
        random_bytes(&mut b).unwrap();

        assert_ne!(a, b, "trial {trial}: identical draws");
        assert!(a.iter().any(|&x| x != 0), "trial {trial}: all-zero draw");
        assert!(b.iter().any(|&x| x != 0), "trial {trial}: all-zero draw");
    }
}

// ============================================================================
// Memory
// ============================================================================

#[test]
#[cfg(any(target_os = "linux", target_os = "macos", windows))]
fn memory_figures_are_plausible() {
    let total = total_memory().unwrap();
    let available = available_memory().unwrap();
    // Every supported CI host has more than 64 MiB
    assert!(total > 64 * 1024 * 1024);
    assert!(available > 0 && available <= total);
}

#[test]
fn system_info_serializes_with_schema() {
    let info = system_info();
    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["schema_id"], info.schema_id);
    assert_eq!(json["pid"], std::process::id());
    assert!(json["cpu_count"].as_u64().unwrap() >= 1);
    assert!(json["warnings"].is_array());
}

// ============================================================================
// Dynamic loading
// ============================================================================

#[cfg(target_os = "linux")]
const SYSTEM_LIBRARY: (&str, &str) = ("libc.so.6", "strlen");
#[cfg(target_os = "macos")]
const SYSTEM_LIBRARY: (&str, &str) = ("/usr/lib/libSystem.B.dylib", "strlen");
#[cfg(windows)]
const SYSTEM_LIBRARY: (&str, &str) = ("kernel32.dll", "GetTickCount");

#[test]
#[cfg(any(target_os = "linux", target_os = "macos", windows))]
fn load_system_library_and_resolve_symbol() {
    let (path, symbol) = SYSTEM_LIBRARY;
    let lib = Library::load(path).unwrap();
    assert_eq!(lib.path(), path);

    let address = lib.symbol_address(symbol).unwrap();
    assert!(!address.is_null());

    let err = lib.symbol_address("regislex_no_such_symbol").unwrap_err();
    assert!(matches!(err, PalError::NotFound { .. }));

    lib.unload().unwrap();
}

#[test]
#[cfg(any(target_os = "linux", target_os = "macos"))]
fn typed_symbol_is_callable() {
    use std::ffi::{c_char, CStr};

    let (path, _) = SYSTEM_LIBRARY;
    let lib = Library::load(path).unwrap();
    let strlen = unsafe {
        lib.symbol::<unsafe extern "C" fn(*const c_char) -> usize>("strlen")
            .unwrap()
    };
    let text: &CStr = c"regislex";
    assert_eq!(unsafe { strlen(text.as_ptr()) }, 8);
}

#[test]
fn missing_library_is_not_found() {
    let name = library_filename("regislex_definitely_missing");
    let err = Library::load(&name).unwrap_err();
    assert!(matches!(err, PalError::NotFound { .. }));
    assert_eq!(err.error_code(), -4);
}
