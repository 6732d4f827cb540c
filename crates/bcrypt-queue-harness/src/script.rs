//! Simulated script instances

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bcrypt_queue_core::{
    CallbackArg, CallbackError, CallbackIndex, CallbackNames, Host, HostHandle,
};
use serde::Serialize;
use tracing::trace;

// ----------------------------------------------------------------------------
// Invocation Log
// ----------------------------------------------------------------------------

/// Owned copy of a callback argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ScriptValue {
    Int(i32),
    Bool(bool),
    Str(String),
}

impl From<&CallbackArg<'_>> for ScriptValue {
    fn from(arg: &CallbackArg<'_>) -> Self {
        match arg {
            CallbackArg::Int(v) => ScriptValue::Int(*v),
            CallbackArg::Bool(v) => ScriptValue::Bool(*v),
            CallbackArg::Str(v) => ScriptValue::Str(v.to_string()),
        }
    }
}

/// One callback run by a script instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub host: HostHandle,
    pub callback: String,
    pub args: Vec<ScriptValue>,
}

impl Invocation {
    /// `(caller_index, caller_id)` of the delivered record
    pub fn tag(&self) -> Option<(i32, i32)> {
        match self.args.as_slice() {
            [ScriptValue::Int(index), ScriptValue::Int(id), ..] => Some((*index, *id)),
            _ => None,
        }
    }
}

/// Append-only record shared between hosts and the test observing them
#[derive(Debug, Clone, Default)]
pub struct InvocationLog {
    entries: Arc<Mutex<Vec<Invocation>>>,
}

impl InvocationLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, invocation: Invocation) {
        self.lock().push(invocation);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<Invocation> {
        self.lock().clone()
    }

    /// Invocations of `callback`, in delivery order
    pub fn calls_to(&self, callback: &str) -> Vec<Invocation> {
        self.lock()
            .iter()
            .filter(|i| i.callback == callback)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Invocation>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ----------------------------------------------------------------------------
// Script Host
// ----------------------------------------------------------------------------

/// A loaded script exporting some set of public callbacks
#[derive(Debug, Clone)]
pub struct ScriptHost {
    handle: HostHandle,
    name: String,
    publics: Vec<String>,
    failing: HashSet<String>,
    log: InvocationLog,
}

impl ScriptHost {
    /// A script that exports no callbacks
    pub fn new<N: Into<String>>(id: u64, name: N, log: InvocationLog) -> Self {
        Self {
            handle: HostHandle(id),
            name: name.into(),
            publics: Vec::new(),
            failing: HashSet::new(),
            log,
        }
    }

    /// A script exporting both result callbacks under their default names
    pub fn standard<N: Into<String>>(id: u64, name: N, log: InvocationLog) -> Self {
        let names = CallbackNames::default();
        Self::new(id, name, log)
            .with_public(names.hashed)
            .with_public(names.verified)
    }

    pub fn with_public<P: Into<String>>(mut self, public: P) -> Self {
        self.publics.push(public.into());
        self
    }

    /// Make `public` report a script error every time it runs
    pub fn failing_on<P: Into<String>>(mut self, public: P) -> Self {
        self.failing.insert(public.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Host for ScriptHost {
    fn handle(&self) -> HostHandle {
        self.handle
    }

    fn find_callback(&self, name: &str) -> Option<CallbackIndex> {
        self.publics
            .iter()
            .position(|p| p == name)
            .map(|i| CallbackIndex(i as i32))
    }

    fn execute(
        &mut self,
        callback: CallbackIndex,
        args: &[CallbackArg<'_>],
    ) -> Result<(), CallbackError> {
        let public = usize::try_from(callback.0)
            .ok()
            .and_then(|i| self.publics.get(i))
            .ok_or_else(|| CallbackError::new(format!("#{}", callback.0), "no such public"))?;

        if self.failing.contains(public) {
            return Err(CallbackError::new(public.clone(), "run time error"));
        }

        trace!("{} ({}) running {}", self.handle, self.name, public);
        self.log.push(Invocation {
            host: self.handle,
            callback: public.clone(),
            args: args.iter().map(ScriptValue::from).collect(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_exports() {
        let host = ScriptHost::standard(1, "gamemode", InvocationLog::new());
        assert_eq!(host.find_callback("OnHashed"), Some(CallbackIndex(0)));
        assert_eq!(host.find_callback("OnVerified"), Some(CallbackIndex(1)));
        assert_eq!(host.find_callback("OnGameModeInit"), None);
        assert_eq!(host.name(), "gamemode");
    }

    #[test]
    fn test_execute_records_arguments() {
        let log = InvocationLog::new();
        let mut host = ScriptHost::standard(3, "fs", log.clone());
        host.execute(
            CallbackIndex(0),
            &[
                CallbackArg::Int(1),
                CallbackArg::Int(2),
                CallbackArg::Str("$2y$..."),
            ],
        )
        .unwrap();

        let entries = log.snapshot();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].host, HostHandle(3));
        assert_eq!(entries[0].tag(), Some((1, 2)));
        assert_eq!(entries[0].args[2], ScriptValue::Str("$2y$...".to_string()));
    }

    #[test]
    fn test_failing_public_and_bad_index() {
        let log = InvocationLog::new();
        let mut host = ScriptHost::standard(1, "fs", log.clone()).failing_on("OnVerified");

        assert!(host.execute(CallbackIndex(1), &[]).is_err());
        assert!(host.execute(CallbackIndex(7), &[]).is_err());
        assert!(host.execute(CallbackIndex(-1), &[]).is_err());
        assert!(log.is_empty());
    }
}
