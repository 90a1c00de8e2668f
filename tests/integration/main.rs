//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises one subsystem against
//! the mock board.  All tests run on the host with no real hardware.

mod control_tests;
mod handler_tests;
mod mock_board;
mod scheduler_tests;
