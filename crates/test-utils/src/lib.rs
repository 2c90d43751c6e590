//! Shared test utilities for the amesh workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Canned upstream responses (timestamp index, lightning, geocoder)
//! - Synthetic PNG tile generators
//! - Approximate float assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, solid_tile_png};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use generators::*;

/// Assert that two numbers differ by at most `tolerance`.
///
/// All three arguments are converted to `f64`, so integer pixel
/// coordinates can be compared against projected floats directly.
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(project(0.0, 0.0, 0).0, 128.0, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let actual = $actual as f64;
        let expected = $expected as f64;
        let tolerance = $tolerance as f64;
        let diff = (actual - expected).abs();
        assert!(
            diff <= tolerance,
            "values differ by more than {}: actual {} expected {} (diff {})",
            tolerance,
            actual,
            expected,
            diff
        );
    }};
}

/// [`assert_approx_eq!`] for `(x, y)` or `(lat, lng)` pairs.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let (ax, ay): (f64, f64) = $actual;
        let (ex, ey): (f64, f64) = $expected;
        $crate::assert_approx_eq!(ax, ex, $tolerance);
        $crate::assert_approx_eq!(ay, ey, $tolerance);
    }};
}
