#![allow(dead_code)]

pub use assetflow_test_utils::{init_tracing, with_timeout};
pub use assetflow_test_utils::builders;
