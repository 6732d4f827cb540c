//! Registry of attached host instances
//!
//! Set semantics keyed by `HostHandle`, iterated in attach order. Only the
//! consumer thread touches it, which `BcryptPlugin` enforces by owning the
//! registry and exposing it through `&mut self` alone.

use tracing::debug;

use crate::host::{Host, HostHandle};

pub struct Registry<H> {
    hosts: Vec<H>,
}

impl<H> Default for Registry<H> {
    fn default() -> Self {
        Self { hosts: Vec::new() }
    }
}

impl<H: Host> Registry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a host; returns `false` if its handle is already registered
    pub fn attach(&mut self, host: H) -> bool {
        let handle = host.handle();
        if self.contains(handle) {
            debug!("{} already attached", handle);
            return false;
        }
        self.hosts.push(host);
        true
    }

    /// Remove a host; absent handles are ignored
    pub fn detach(&mut self, handle: HostHandle) -> Option<H> {
        let position = self.hosts.iter().position(|h| h.handle() == handle)?;
        Some(self.hosts.remove(position))
    }

    pub fn contains(&self, handle: HostHandle) -> bool {
        self.hosts.iter().any(|h| h.handle() == handle)
    }

    pub fn get(&self, handle: HostHandle) -> Option<&H> {
        self.hosts.iter().find(|h| h.handle() == handle)
    }

    pub fn handles(&self) -> Vec<HostHandle> {
        self.hosts.iter().map(Host::handle).collect()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut H> {
        self.hosts.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn clear(&mut self) {
        self.hosts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CallbackError;
    use crate::host::{CallbackArg, CallbackIndex};

    struct Stub(u64);

    impl Host for Stub {
        fn handle(&self) -> HostHandle {
            HostHandle(self.0)
        }

        fn find_callback(&self, _name: &str) -> Option<CallbackIndex> {
            None
        }

        fn execute(&mut self, _: CallbackIndex, _: &[CallbackArg<'_>]) -> Result<(), CallbackError> {
            Ok(())
        }
    }

    #[test]
    fn test_attach_is_set_like() {
        let mut registry = Registry::new();
        assert!(registry.attach(Stub(1)));
        assert!(registry.attach(Stub(2)));
        assert!(!registry.attach(Stub(1)));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.handles(), vec![HostHandle(1), HostHandle(2)]);
    }

    #[test]
    fn test_detach_absent_is_noop() {
        let mut registry: Registry<Stub> = Registry::new();
        assert!(registry.detach(HostHandle(9)).is_none());

        registry.attach(Stub(9));
        assert!(registry.detach(HostHandle(9)).is_some());
        assert!(registry.detach(HostHandle(9)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_detach_keeps_remaining_order() {
        let mut registry = Registry::new();
        for id in 1..=4 {
            registry.attach(Stub(id));
        }
        registry.detach(HostHandle(2));
        assert_eq!(
            registry.handles(),
            vec![HostHandle(1), HostHandle(3), HostHandle(4)]
        );
        assert!(registry.get(HostHandle(3)).is_some());
        assert!(!registry.contains(HostHandle(2)));
    }
}
