//! Shared integration-test setup.

/// Route `log` output through env_logger so the diagnostic traces of
/// verbose contexts show up under `RUST_LOG=debug`. Safe to call from
/// every test; only the first call in a binary installs the logger.
pub fn init_logger() {
    let _ = env_logger::builder()
        .format_timestamp(None)
        .is_test(true)
        .try_init();
}
