#![allow(dead_code)]

pub mod synthetic;

/// Route `log` output through the test harness; `RUST_LOG=debug` shows it.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
