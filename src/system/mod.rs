//! System-level modules
//!
//! Process-wide concerns that sit outside the link pipeline itself:
//! logging initialization.

pub mod logging;
