//! QuickOSINT Runtime
//!
//! Drives one investigation from input to report:
//! - Interactive or directive target and operation selection
//! - Sequential DNS, geolocation and social lookups
//! - Geolocation address selection
//! - Report printing and saving

pub mod console;
pub mod investigation;

pub use console::*;
pub use investigation::*;
