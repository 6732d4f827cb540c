//! Host instance abstraction
//!
//! A host instance is one loaded script of the embedding virtual machine. The
//! dispatcher only needs to look up an exported callback by name and call it
//! with a short list of scalar arguments.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CallbackError;

/// Opaque identity of a host instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HostHandle(pub u64);

impl fmt::Display for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host#{}", self.0)
    }
}

/// Host-specific slot of an exported callback, as returned by `find_callback`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackIndex(pub i32);

/// One argument pushed to a host callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackArg<'a> {
    Int(i32),
    Bool(bool),
    Str(&'a str),
}

pub trait Host {
    fn handle(&self) -> HostHandle;

    /// Locate an exported callback; `None` when the host does not define it
    fn find_callback(&self, name: &str) -> Option<CallbackIndex>;

    /// Run a callback synchronously with arguments in declaration order
    fn execute(
        &mut self,
        callback: CallbackIndex,
        args: &[CallbackArg<'_>],
    ) -> Result<(), CallbackError>;
}

impl<H: Host + ?Sized> Host for Box<H> {
    fn handle(&self) -> HostHandle {
        (**self).handle()
    }

    fn find_callback(&self, name: &str) -> Option<CallbackIndex> {
        (**self).find_callback(name)
    }

    fn execute(
        &mut self,
        callback: CallbackIndex,
        args: &[CallbackArg<'_>],
    ) -> Result<(), CallbackError> {
        (**self).execute(callback, args)
    }
}
