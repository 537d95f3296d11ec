//! Unit tests for the reservation module.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
#![expect(
    clippy::needless_pass_by_value,
    reason = "rstest injects fixtures by value"
)]

mod limit_tests;
mod support;
