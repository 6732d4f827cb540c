//! bcrypt Queue Harness
//!
//! An in-process stand-in for the embedding scripting host: script instances
//! that export callbacks, a shared log of every callback they ran, argument
//! lists for calling natives, and a tick driver.

pub mod args;
pub mod driver;
pub mod script;

pub use args::{NativeArg, ScriptArgs};
pub use driver::{tick_until, TickOutcome};
pub use script::{Invocation, InvocationLog, ScriptHost, ScriptValue};
