// SPDX-License-Identifier: MIT

//! # flagship-wasm
//!
//! WebAssembly bindings for the Flagship feature-flag registry.
//!
//! This crate exposes the `flagship-core` API to JavaScript and TypeScript
//! consumers running in browser or edge-worker environments via
//! `wasm-bindgen`.
//!
//! ## Architecture
//!
//! Each handle maps to a [`SharedFeatureFlags`] plus a long-lived override
//! box.  Registries are stored in a thread-local map keyed by integer
//! handles because WASM is single-threaded and `wasm_bindgen` cannot export
//! opaque Rust structs across the JS boundary without serialisation
//! overhead.
//!
//! ## Exported Functions
//!
//! | Function          | Description                                            |
//! |-------------------|--------------------------------------------------------|
//! | `create_registry` | Wrap a JSON flag declaration document into a registry  |
//! | `check_config`    | Dry-run the consistency check, returning the defect    |
//! | `is_enabled`      | Resolve one flag to a boolean                          |
//! | `state`           | Snapshot of every flag as a JS array                   |
//! | `state_json`      | The same snapshot as a JSON string                     |
//! | `test_enable`     | Pin a flag on until `test_reset`                       |
//! | `test_disable`    | Pin a flag off until `test_reset`                      |
//! | `test_reset`      | Undo every pin, restoring recorded values              |
//! | `destroy_registry`| Release a registry handle and free its memory          |
//!
//! ## JavaScript Usage
//!
//! ```js
//! import init, {
//!   create_registry,
//!   is_enabled,
//!   state,
//!   test_enable,
//!   test_reset,
//! } from '@flagship/wasm';
//!
//! await init();
//!
//! const handle = create_registry(JSON.stringify({
//!   flags: [
//!     { name: 'checkout_v2', description: 'redesigned checkout', enabled: true },
//!     { name: 'beta_search', description: 'search rewrite', enabled: { dev: true } },
//!   ],
//!   environments: { available: ['dev', 'qa'], current: 'qa' },
//! }));
//!
//! console.log(is_enabled(handle, 'checkout_v2')); // true
//!
//! test_enable(handle, 'beta_search');
//! console.log(is_enabled(handle, 'beta_search')); // true
//! test_reset(handle);
//!
//! console.table(state(handle));
//! ```

use flagship_core::{RegistryDoc, SharedFeatureFlags, SharedTestBox};
use std::cell::RefCell;
use std::collections::HashMap;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Registry map
// ---------------------------------------------------------------------------

/// One live registry: the shared handle plus the override box that carries
/// `test_enable`/`test_disable` records between calls.
struct Entry {
    flags: SharedFeatureFlags,
    overrides: SharedTestBox,
}

// WASM is single-threaded; RefCell<HashMap<...>> is safe here.
thread_local! {
    static REGISTRIES: RefCell<HashMap<u32, Entry>> = RefCell::new(HashMap::new());
    static NEXT_HANDLE: RefCell<u32> = RefCell::new(0);
}

/// Allocate a new registry handle. Handles wrap around at `u32::MAX - 1` to
/// reserve `u32::MAX` as the error sentinel.
fn next_handle() -> u32 {
    NEXT_HANDLE.with(|counter| {
        let handle = *counter.borrow();
        let next = if handle >= u32::MAX - 1 { 0 } else { handle + 1 };
        *counter.borrow_mut() = next;
        handle
    })
}

/// Helper: run a closure with mutable access to an entry. Returns
/// `Err(message)` if the handle is unknown.
fn with_entry_mut<F, R>(handle: u32, callback: F) -> Result<R, String>
where
    F: FnOnce(&mut Entry) -> R,
{
    REGISTRIES.with(|registries| {
        let mut map = registries.borrow_mut();
        match map.get_mut(&handle) {
            Some(entry) => Ok(callback(entry)),
            None => Err(format!("unknown registry handle {}", handle)),
        }
    })
}

/// Helper: run a closure with shared access to an entry.
fn with_entry<F, R>(handle: u32, callback: F) -> Result<R, String>
where
    F: FnOnce(&Entry) -> R,
{
    REGISTRIES.with(|registries| {
        let map = registries.borrow();
        match map.get(&handle) {
            Some(entry) => Ok(callback(entry)),
            None => Err(format!("unknown registry handle {}", handle)),
        }
    })
}

fn wrap_document(config_json: &str) -> Result<SharedFeatureFlags, String> {
    let doc: RegistryDoc =
        serde_json::from_str(config_json).map_err(|error| error.to_string())?;
    SharedFeatureFlags::wrap(doc.into_config()).map_err(|error| error.to_string())
}

// ---------------------------------------------------------------------------
// Registry lifecycle
// ---------------------------------------------------------------------------

/// Wrap a flag declaration document into a registry and return its integer
/// handle.
///
/// `config_json` must be a JSON string matching the [`RegistryDoc`] shape:
///
/// ```json
/// {
///   "flags": [
///     { "name": "checkout_v2", "description": "redesigned checkout", "enabled": true }
///   ],
///   "environments": { "available": ["dev", "qa"], "current": "qa" }
/// }
/// ```
///
/// Returns the integer registry handle, or `u32::MAX` when the JSON does
/// not parse or the declarations fail the consistency check (use
/// [`check_config`] to see which).
#[wasm_bindgen]
pub fn create_registry(config_json: &str) -> u32 {
    let flags = match wrap_document(config_json) {
        Ok(flags) => flags,
        Err(_) => return u32::MAX,
    };
    let handle = next_handle();
    let overrides = flags.test_box();
    REGISTRIES.with(|registries| {
        registries
            .borrow_mut()
            .insert(handle, Entry { flags, overrides });
    });
    handle
}

/// Dry-run the parse and consistency check over `config_json`.
///
/// Returns the empty string when the document would wrap cleanly, otherwise
/// the defect's message (for example which flag is missing a description).
#[wasm_bindgen]
pub fn check_config(config_json: &str) -> String {
    match wrap_document(config_json) {
        Ok(_) => String::new(),
        Err(message) => message,
    }
}

/// Release the registry associated with `handle`, freeing its memory.
///
/// After calling this function the handle is no longer valid.  Pending test
/// overrides are discarded, not replayed.
#[wasm_bindgen]
pub fn destroy_registry(handle: u32) {
    REGISTRIES.with(|registries| {
        registries.borrow_mut().remove(&handle);
    });
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Resolve one flag to a boolean.
///
/// Returns `false` when the handle is unknown or the flag was never
/// declared; [`state`] distinguishes a declared-but-off flag from a missing
/// one.
#[wasm_bindgen]
pub fn is_enabled(handle: u32, name: &str) -> bool {
    with_entry(handle, |entry| {
        entry.flags.is_enabled(name).unwrap_or(false)
    })
    .unwrap_or(false)
}

/// Snapshot every flag's name, resolved value, and description as a JS
/// array of `{ name, enabled, description }` objects.
///
/// Returns an empty array when the handle is unknown.
#[wasm_bindgen]
pub fn state(handle: u32) -> JsValue {
    let snapshot = with_entry(handle, |entry| entry.flags.state()).unwrap_or_default();
    serde_wasm_bindgen::to_value(&snapshot).unwrap_or(JsValue::NULL)
}

/// The same snapshot as [`state`], serialised to a JSON string.
///
/// Returns `"[]"` when the handle is unknown.
#[wasm_bindgen]
pub fn state_json(handle: u32) -> String {
    let snapshot = with_entry(handle, |entry| entry.flags.state()).unwrap_or_default();
    serde_json::to_string(&snapshot).unwrap_or_else(|_| "[]".into())
}

// ---------------------------------------------------------------------------
// Test overrides
// ---------------------------------------------------------------------------

/// Pin a flag on until [`test_reset`].
///
/// Returns `true` on success, `false` when the handle or flag is unknown.
#[wasm_bindgen]
pub fn test_enable(handle: u32, name: &str) -> bool {
    with_entry_mut(handle, |entry| entry.overrides.enable(name).is_ok()).unwrap_or(false)
}

/// Pin a flag off until [`test_reset`].
///
/// Returns `true` on success, `false` when the handle or flag is unknown.
#[wasm_bindgen]
pub fn test_disable(handle: u32, name: &str) -> bool {
    with_entry_mut(handle, |entry| entry.overrides.disable(name).is_ok()).unwrap_or(false)
}

/// Undo every pending override, restoring each flag to the value it
/// resolved to when it was first pinned.
#[wasm_bindgen]
pub fn test_reset(handle: u32) {
    let _ = with_entry_mut(handle, |entry| entry.overrides.reset());
}

// ---------------------------------------------------------------------------
// wasm-bindgen-test stubs
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Native unit tests (run with `cargo test` outside of WASM)
// ---------------------------------------------------------------------------

#[cfg(test)]
#[cfg(not(target_arch = "wasm32"))]
mod native_tests {
    use super::*;

    const CONFIG: &str = r#"{
        "flags": [
            { "name": "checkout_v2", "description": "redesigned checkout", "enabled": true },
            { "name": "beta_search", "description": "search rewrite", "enabled": false },
            { "name": "cool_feature", "description": "dev only", "enabled": { "dev": true } }
        ],
        "environments": { "available": ["dev", "qa"], "current": "qa" }
    }"#;

    #[test]
    fn test_registry_lifecycle() {
        let handle = create_registry(CONFIG);
        assert_ne!(handle, u32::MAX);
        destroy_registry(handle);
        assert!(!is_enabled(handle, "checkout_v2"));
    }

    #[test]
    fn test_invalid_json_is_the_sentinel() {
        assert_eq!(create_registry("not json"), u32::MAX);
    }

    #[test]
    fn test_inconsistent_config_is_the_sentinel() {
        let handle = create_registry(r#"{"flags": [{"name": "bare"}]}"#);
        assert_eq!(handle, u32::MAX);
    }

    #[test]
    fn test_check_config_names_the_defect() {
        assert_eq!(check_config(CONFIG), "");
        let message = check_config(r#"{"flags": [{"name": "bare"}]}"#);
        assert!(message.contains("bare"));
    }

    #[test]
    fn test_queries_resolve_through_the_environment() {
        let handle = create_registry(CONFIG);
        assert!(is_enabled(handle, "checkout_v2"));
        // No qa entry and no sources, so the per-environment flag is off.
        assert!(!is_enabled(handle, "cool_feature"));
        // Unknown flags read as plain false over this boundary.
        assert!(!is_enabled(handle, "missing_feature"));
        destroy_registry(handle);
    }

    #[test]
    fn test_overrides_round_trip() {
        let handle = create_registry(CONFIG);

        assert!(test_enable(handle, "beta_search"));
        assert!(test_disable(handle, "checkout_v2"));
        assert!(is_enabled(handle, "beta_search"));
        assert!(!is_enabled(handle, "checkout_v2"));

        test_reset(handle);
        assert!(!is_enabled(handle, "beta_search"));
        assert!(is_enabled(handle, "checkout_v2"));

        destroy_registry(handle);
    }

    #[test]
    fn test_overriding_an_unknown_flag_fails() {
        let handle = create_registry(CONFIG);
        assert!(!test_enable(handle, "missing_feature"));
        destroy_registry(handle);
    }

    #[test]
    fn test_state_json_lists_every_flag() {
        let handle = create_registry(CONFIG);
        let json = state_json(handle);
        assert!(json.contains("checkout_v2"));
        assert!(json.contains("beta_search"));
        assert!(json.contains("cool_feature"));
        destroy_registry(handle);

        assert_eq!(state_json(handle), "[]");
    }
}
