pub mod capture;
#[path = "display/compose.rs"]
pub mod compose;
pub mod config;
#[path = "input/entry.rs"]
pub mod entry;
pub mod logging;
#[path = "display/present.rs"]
pub mod present;
pub mod runtime;
pub mod session;

pub use runtime::app::run;
