//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the host adapters wired
//! together the way `main` wires them on the device. All tests run on the
//! host (x86_64) with no real hardware required.

mod host_loop_tests;
mod mock_hw;
