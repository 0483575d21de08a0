use crate::{ScopeKey, StyleStore, normalize_property_name};
use anyhow::Result;
use log::trace;

/// Reads and writes custom properties on a single scope of a [`StyleStore`].
///
/// The scope is fixed at construction. Nothing is cached; every read goes to the
/// store, so values written by other parties are visible immediately.
#[derive(Debug, Clone)]
pub struct CustomPropertiesManager<S: StyleStore> {
    store: S,
    target: ScopeKey,
}

impl<S: StyleStore> CustomPropertiesManager<S> {
    /// Bind to the store's root scope.
    #[inline]
    pub fn new(store: S) -> Self {
        let target = store.root_scope();
        Self { store, target }
    }

    /// Bind to an explicit scope.
    #[inline]
    pub const fn with_target(store: S, target: ScopeKey) -> Self {
        Self { store, target }
    }

    /// The scope this manager writes to.
    #[inline]
    pub const fn target(&self) -> ScopeKey {
        self.target
    }

    /// The underlying store.
    #[inline]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Set one custom property. `name` may be given with or without the `--` prefix;
    /// `value` is forwarded unchanged.
    ///
    /// # Errors
    /// Propagates any rejection from the store.
    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        let property = normalize_property_name(name);
        trace!("set {property} = {value:?} on scope {}", self.target.0);
        self.store.set_property(self.target, &property, value)
    }

    /// Set every `(name, value)` pair in iteration order.
    ///
    /// Stops at the first rejected entry. Entries applied before it stay applied.
    ///
    /// # Errors
    /// Propagates the first rejection from the store.
    pub fn set_many<I, K, V>(&self, properties: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in properties {
            self.set(name.as_ref(), value.as_ref())?;
        }
        Ok(())
    }

    /// The computed value of a custom property, trimmed. `None` when the store has
    /// no value for it.
    ///
    /// # Errors
    /// Only store-level failures; an unset property yields `Ok(None)`.
    pub fn get(&self, name: &str) -> Result<Option<String>> {
        let property = normalize_property_name(name);
        let computed = self.store.computed_value(self.target, &property)?;
        let trimmed = computed.trim();
        trace!("get {property} on scope {} -> {trimmed:?}", self.target.0);
        Ok((!trimmed.is_empty()).then(|| trimmed.to_owned()))
    }

    /// Remove a custom property from the scope's inline style. Removing a property
    /// that is not set does nothing.
    ///
    /// # Errors
    /// Propagates any rejection from the store.
    pub fn remove(&self, name: &str) -> Result<()> {
        let property = normalize_property_name(name);
        trace!("remove {property} on scope {}", self.target.0);
        self.store.remove_property(self.target, &property)
    }
}
