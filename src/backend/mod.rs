//! Display backends.
//!
//! Device bring-up and rendering live outside this crate. The headless backend stands in for
//! them: it exposes one fixed output and drives animation frames from an estimated vblank timer.

mod headless;

pub use headless::{Headless, LoggingProtocol};
