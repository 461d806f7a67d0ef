/// Supply Provenance - owner-gated provenance registries
///
/// This is the root crate that provides workspace-level documentation.
/// Actual implementation is in the subcrates:
/// - `provenance-core`: Registries, ledger facade, clock and configuration
/// - `provenance-cli`: Command-line front end acting as the calling transport

/// Returns the version of the package.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
