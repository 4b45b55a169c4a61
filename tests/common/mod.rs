#![allow(dead_code)]

pub use autoupdate_test_utils::builders;
pub use autoupdate_test_utils::{init_tracing, with_timeout, ManualClock};
