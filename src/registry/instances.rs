//! Polymorphic reconstruction registry.
//!
//! A type opts into polymorphic persistence by exposing a proxy key (its
//! discriminator) and its own metadata representation. Decoding keeps the
//! pair as a [`ProxyValue`]; an [`InstanceGetter`] turns it back into the
//! concrete type through the factory registered under the discriminator.
//!
//! There is intentionally no process-wide default registry: every consumer
//! constructs (or is handed) an explicit `InstanceGetter`, keeping the wiring
//! visible and testable.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::core::{Key, Metadata, ProxyValue, Value};
use crate::util::{Error, Result};

/// A type storable in polymorphic contexts.
pub trait StorableAsMetadata {
    /// Discriminator identifying this concrete type on the wire.
    fn proxy_key() -> Key<Self>
    where
        Self: Sized;

    /// This object's own metadata representation.
    fn to_metadata(&self) -> Metadata;

    /// Capture as a proxy value ready to be put into a document.
    fn to_value(&self) -> Value
    where
        Self: Sized,
    {
        Value::Proxy(ProxyValue {
            type_key: Self::proxy_key().as_untyped(),
            metadata: self.to_metadata(),
        })
    }
}

type BuildFn = Box<dyn Fn(&Metadata) -> Result<Box<dyn Any>> + Send + Sync>;

struct Factory {
    type_id: TypeId,
    type_name: &'static str,
    build: BuildFn,
}

/// Proxy-key -> factory registry for rebuilding concrete types.
///
/// Registration is statically typed: the key's phantom type, the factory's
/// return type and the `TypeId` recorded at registration must all agree, so a
/// key id can never be rebound to (or read as) a different concrete type.
#[derive(Default)]
pub struct InstanceGetter {
    factories: HashMap<String, Factory>,
}

impl InstanceGetter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a factory under a proxy key. Fails if the key is already bound.
    pub fn register<T: 'static>(
        &mut self,
        key: &Key<T>,
        factory: impl Fn(&Metadata) -> Result<T> + Send + Sync + 'static,
    ) -> Result<()> {
        if self.factories.contains_key(key.id()) {
            return Err(Error::AlreadyRegistered(key.id().to_string()));
        }
        self.factories.insert(
            key.id().to_string(),
            Factory {
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
                build: Box::new(move |md| factory(md).map(|v| Box::new(v) as Box<dyn Any>)),
            },
        );
        Ok(())
    }

    /// Remove a binding. Fails if the key is not bound.
    pub fn deregister<T>(&mut self, key: &Key<T>) -> Result<()> {
        self.factories
            .remove(key.id())
            .map(|_| ())
            .ok_or_else(|| Error::NotRegistered(key.id().to_string()))
    }

    pub fn is_registered<T>(&self, key: &Key<T>) -> bool {
        self.factories.contains_key(key.id())
    }

    /// Build a `T` from its metadata via the factory bound under `key`.
    ///
    /// Fails if the key is unbound, or if it was registered for a different
    /// concrete type than the one requested.
    pub fn provide<T: 'static>(&self, key: &Key<T>, source: &Metadata) -> Result<T> {
        let factory = self
            .factories
            .get(key.id())
            .ok_or_else(|| Error::NotRegistered(key.id().to_string()))?;
        if factory.type_id != TypeId::of::<T>() {
            return Err(Error::mismatch(factory.type_name, type_name::<T>()));
        }
        let built = (factory.build)(source)?;
        built
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| Error::other("factory produced a value of the wrong type"))
    }

    /// Rebuild the concrete type behind a decoded proxy value.
    pub fn resolve<T: 'static>(&self, proxy: &ProxyValue) -> Result<T> {
        self.provide(&proxy.type_key.retyped::<T>(), &proxy.metadata)
    }
}

impl fmt::Debug for InstanceGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("InstanceGetter").field("keys", &ids).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Version;

    #[derive(Debug, PartialEq)]
    struct Sphere {
        radius: f64,
    }

    impl StorableAsMetadata for Sphere {
        fn proxy_key() -> Key<Self> {
            Key::of("structure.sphere")
        }

        fn to_metadata(&self) -> Metadata {
            let mut b = Metadata::builder(Version::of(1, 0));
            b.put(&Key::of("radius"), self.radius);
            b.build()
        }
    }

    fn sphere_factory(md: &Metadata) -> Result<Sphere> {
        Ok(Sphere {
            radius: md.get_as(&Key::of("radius"))?,
        })
    }

    #[test]
    fn test_register_provide_roundtrip() {
        let mut getter = InstanceGetter::new();
        getter.register(&Sphere::proxy_key(), sphere_factory).unwrap();

        let original = Sphere { radius: 2.5 };
        let Value::Proxy(proxy) = original.to_value() else {
            panic!("expected proxy value");
        };
        let rebuilt: Sphere = getter.resolve(&proxy).unwrap();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_duplicate_register_fails() {
        let mut getter = InstanceGetter::new();
        getter.register(&Sphere::proxy_key(), sphere_factory).unwrap();
        let err = getter
            .register(&Sphere::proxy_key(), sphere_factory)
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyRegistered(_)));
    }

    #[test]
    fn test_unbound_key_fails() {
        let getter = InstanceGetter::new();
        let md = Metadata::builder(Version::of(1, 0)).build();
        let err = getter.provide(&Sphere::proxy_key(), &md).unwrap_err();
        assert!(matches!(err, Error::NotRegistered(_)));
    }

    #[test]
    fn test_wrong_type_fails() {
        let mut getter = InstanceGetter::new();
        getter.register(&Sphere::proxy_key(), sphere_factory).unwrap();

        let md = Metadata::builder(Version::of(1, 0)).build();
        let key: Key<String> = Sphere::proxy_key().retyped();
        let err = getter.provide(&key, &md).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_deregister() {
        let mut getter = InstanceGetter::new();
        getter.register(&Sphere::proxy_key(), sphere_factory).unwrap();
        getter.deregister(&Sphere::proxy_key()).unwrap();
        assert!(!getter.is_registered(&Sphere::proxy_key()));

        let err = getter.deregister(&Sphere::proxy_key()).unwrap_err();
        assert!(matches!(err, Error::NotRegistered(_)));
    }
}
