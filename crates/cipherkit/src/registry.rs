//! Catalogue of named cipher descriptors
//!
//! A [`Registry`] is an explicit value owned by the host application. It maps
//! case-insensitive names to [`CipherDescriptor`]s, tracks how many contexts
//! are bound to each descriptor, and notifies observers when ciphers come and
//! go. Mutation takes `&mut self`; hosts sharing a registry between threads
//! wrap it in their own lock.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::algorithm::{CipherFactory, CipherKind};
use crate::capabilities::{Capabilities, Operation};
use crate::context::CipherContext;
use crate::error::{CipherError, Result};

/// Named handle bundling an algorithm and its supported operations
pub struct CipherDescriptor {
    name: String,
    kind: CipherKind,
    operations: Capabilities,
    live_contexts: AtomicUsize,
}

impl CipherDescriptor {
    fn new(name: &str, kind: CipherKind) -> Self {
        let operations = kind.capabilities();
        Self {
            name: name.to_string(),
            kind,
            operations,
            live_contexts: AtomicUsize::new(0),
        }
    }

    /// Name the cipher was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Operations the cipher implements
    pub fn capabilities(&self) -> Capabilities {
        self.operations
    }

    /// Whether the cipher implements `op`
    pub fn supports(&self, op: Operation) -> bool {
        self.operations.contains(op)
    }

    /// Number of contexts currently bound to this descriptor
    pub fn live_contexts(&self) -> usize {
        self.live_contexts.load(Ordering::Acquire)
    }

    pub(crate) fn kind(&self) -> &CipherKind {
        &self.kind
    }

    pub(crate) fn acquire(&self) {
        self.live_contexts.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn release(&self) {
        self.live_contexts.fetch_sub(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for CipherDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherDescriptor")
            .field("name", &self.name)
            .field("operations", &self.operations.to_string())
            .field("live_contexts", &self.live_contexts())
            .finish()
    }
}

/// Change notification delivered to registry observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A cipher was registered
    CipherAdded(String),
    /// A cipher was unregistered
    CipherRemoved(String),
}

type Observer = Box<dyn Fn(&RegistryEvent) + Send + Sync>;

/// Registry of cipher descriptors
#[derive(Default)]
pub struct Registry {
    ciphers: Vec<Arc<CipherDescriptor>>,
    observers: Vec<Observer>,
}

impl Registry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in algorithms in startup order:
    /// md5, sha1, sha256, md4, hmac, des, des3, rc4
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, kind) in CipherKind::builtins() {
            registry
                .ciphers
                .push(Arc::new(CipherDescriptor::new(name, kind)));
        }
        tracing::debug!("Registered {} built-in ciphers", registry.len());
        registry
    }

    /// Register `kind` under `name`
    ///
    /// # Errors
    ///
    /// `DuplicateRegistration` when the name is taken (ignoring ASCII case),
    /// `EmptyOperations` when the algorithm declares no operations.
    pub fn register(&mut self, name: &str, kind: CipherKind) -> Result<Arc<CipherDescriptor>> {
        if self.find(name).is_some() {
            tracing::warn!("Cipher {name} is already registered");
            return Err(CipherError::DuplicateRegistration(name.to_string()));
        }
        if kind.capabilities().is_empty() {
            tracing::warn!("Cipher {name} declares no operations");
            return Err(CipherError::EmptyOperations(name.to_string()));
        }

        let descriptor = Arc::new(CipherDescriptor::new(name, kind));
        self.ciphers.push(Arc::clone(&descriptor));
        tracing::debug!(
            "Registered cipher {name} with operations [{}]",
            descriptor.capabilities()
        );
        self.notify(&RegistryEvent::CipherAdded(name.to_string()));
        Ok(descriptor)
    }

    /// Register an algorithm supplied from outside this crate
    pub fn register_custom(
        &mut self,
        name: &str,
        factory: Arc<dyn CipherFactory>,
    ) -> Result<Arc<CipherDescriptor>> {
        self.register(name, CipherKind::Custom(factory))
    }

    /// Case-insensitive lookup
    pub fn find(&self, name: &str) -> Option<Arc<CipherDescriptor>> {
        self.ciphers
            .iter()
            .find(|cipher| cipher.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Remove `descriptor` from the registry
    ///
    /// # Errors
    ///
    /// `CipherInUse` while contexts are bound to it, `NotFound` when it is
    /// not registered here.
    pub fn unregister(&mut self, descriptor: &Arc<CipherDescriptor>) -> Result<()> {
        let live = descriptor.live_contexts();
        if live > 0 {
            tracing::warn!(
                "Refusing to unregister cipher {} with {live} live context(s)",
                descriptor.name
            );
            return Err(CipherError::CipherInUse {
                name: descriptor.name.clone(),
                live_contexts: live,
            });
        }

        let index = self
            .ciphers
            .iter()
            .position(|cipher| Arc::ptr_eq(cipher, descriptor))
            .ok_or_else(|| CipherError::NotFound(descriptor.name.clone()))?;
        let removed = self.ciphers.remove(index);

        tracing::debug!("Unregistered cipher {}", removed.name);
        self.notify(&RegistryEvent::CipherRemoved(removed.name.clone()));
        Ok(())
    }

    /// Unregister every cipher without live contexts, returning how many
    /// remain registered
    pub fn unregister_all(&mut self) -> usize {
        let snapshot: Vec<_> = self.ciphers.clone();
        for descriptor in &snapshot {
            // In-use ciphers stay registered and are counted below
            let _ = self.unregister(descriptor);
        }
        self.ciphers.len()
    }

    /// Registered ciphers in registration order
    pub fn ciphers(&self) -> impl Iterator<Item = &Arc<CipherDescriptor>> {
        self.ciphers.iter()
    }

    /// Number of registered ciphers
    pub fn len(&self) -> usize {
        self.ciphers.len()
    }

    /// Whether no ciphers are registered
    pub fn is_empty(&self) -> bool {
        self.ciphers.is_empty()
    }

    /// Call `observer` for every subsequent registration change
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&RegistryEvent) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    fn notify(&self, event: &RegistryEvent) {
        for observer in &self.observers {
            observer(event);
        }
    }

    /// Create a context bound to the cipher called `name`
    pub fn context(&self, name: &str) -> Result<CipherContext> {
        let descriptor = self
            .find(name)
            .ok_or_else(|| CipherError::NotFound(name.to_string()))?;
        Ok(CipherContext::new(&descriptor))
    }

    /// Hash `data` with the named digest in one call, returning lowercase hex
    pub fn digest_region(&self, name: &str, data: &[u8]) -> Result<String> {
        let mut context = self.context(name)?;
        context.append(data)?;
        context.hex_digest()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("ciphers", &self.ciphers)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_builtin_order() {
        let registry = Registry::with_builtins();
        let names: Vec<&str> = registry.ciphers().map(|c| c.name()).collect();
        assert_eq!(
            names,
            ["md5", "sha1", "sha256", "md4", "hmac", "des", "des3", "rc4"]
        );
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let registry = Registry::with_builtins();
        assert_eq!(registry.find("SHA256").unwrap().name(), "sha256");
        assert_eq!(registry.find("Des3").unwrap().name(), "des3");
        assert!(registry.find("blowfish").is_none());
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = Registry::new();
        registry.register("Sha1", CipherKind::Sha1).unwrap();
        assert_eq!(
            registry.register("SHA1", CipherKind::Sha256).unwrap_err(),
            CipherError::DuplicateRegistration("SHA1".into())
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_in_use() {
        let mut registry = Registry::with_builtins();
        let des = registry.find("des").unwrap();
        let context = CipherContext::new(&des);
        assert_eq!(des.live_contexts(), 1);

        assert!(matches!(
            registry.unregister(&des),
            Err(CipherError::CipherInUse {
                live_contexts: 1,
                ..
            })
        ));

        drop(context);
        assert_eq!(des.live_contexts(), 0);
        registry.unregister(&des).unwrap();
        assert!(registry.find("des").is_none());
        assert!(matches!(
            registry.unregister(&des),
            Err(CipherError::NotFound(_))
        ));
    }

    #[test]
    fn test_observers_see_add_and_remove() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);

        let mut registry = Registry::new();
        registry.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        let md5 = registry.register("md5", CipherKind::Md5).unwrap();
        let _ = registry.register("MD5", CipherKind::Md5);
        registry.unregister(&md5).unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            [
                RegistryEvent::CipherAdded("md5".into()),
                RegistryEvent::CipherRemoved("md5".into()),
            ]
        );
    }

    #[test]
    fn test_unregister_all_keeps_in_use() {
        let mut registry = Registry::with_builtins();
        let _held = registry.context("rc4").unwrap();
        assert_eq!(registry.unregister_all(), 1);
        assert_eq!(registry.ciphers().next().unwrap().name(), "rc4");
    }

    #[test]
    fn test_digest_region() {
        let registry = Registry::with_builtins();
        assert_eq!(
            registry.digest_region("sha1", b"abc").unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            registry.digest_region("md5", b"").unwrap(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert!(matches!(
            registry.digest_region("rc4", b"abc"),
            Err(CipherError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            registry.digest_region("whirlpool", b"abc"),
            Err(CipherError::NotFound(_))
        ));
    }
}
