//! The host style engine as seen by the accessor.

use crate::ScopeKey;
use anyhow::Result;
use core::fmt::{Display, Formatter, Result as FmtResult};
use std::error::Error;
use std::rc::Rc;

/// Property get/set/remove primitives of a style engine, addressed by scope.
///
/// Methods take `&self` so several accessors can share one store; implementations
/// that mutate use interior mutability.
pub trait StyleStore {
    /// The scope used when an accessor is built without an explicit target.
    fn root_scope(&self) -> ScopeKey;

    /// Set `name` to `value` on the inline style of `scope`.
    ///
    /// # Errors
    /// Returns an error if the engine rejects the name, the value, or the scope.
    fn set_property(&self, scope: ScopeKey, name: &str, value: &str) -> Result<()>;

    /// Remove `name` from the inline style of `scope`. Removing an absent property
    /// is not an error.
    ///
    /// # Errors
    /// Returns an error if the engine rejects the name or the scope.
    fn remove_property(&self, scope: ScopeKey, name: &str) -> Result<()>;

    /// The computed value of `name` on `scope`, or the empty string when unset.
    ///
    /// # Errors
    /// Only engine-level failures; a missing property is not one.
    fn computed_value(&self, scope: ScopeKey, name: &str) -> Result<String>;
}

impl<T: StyleStore + ?Sized> StyleStore for &T {
    #[inline]
    fn root_scope(&self) -> ScopeKey {
        (**self).root_scope()
    }

    #[inline]
    fn set_property(&self, scope: ScopeKey, name: &str, value: &str) -> Result<()> {
        (**self).set_property(scope, name, value)
    }

    #[inline]
    fn remove_property(&self, scope: ScopeKey, name: &str) -> Result<()> {
        (**self).remove_property(scope, name)
    }

    #[inline]
    fn computed_value(&self, scope: ScopeKey, name: &str) -> Result<String> {
        (**self).computed_value(scope, name)
    }
}

impl<T: StyleStore + ?Sized> StyleStore for Rc<T> {
    #[inline]
    fn root_scope(&self) -> ScopeKey {
        (**self).root_scope()
    }

    #[inline]
    fn set_property(&self, scope: ScopeKey, name: &str, value: &str) -> Result<()> {
        (**self).set_property(scope, name, value)
    }

    #[inline]
    fn remove_property(&self, scope: ScopeKey, name: &str) -> Result<()> {
        (**self).remove_property(scope, name)
    }

    #[inline]
    fn computed_value(&self, scope: ScopeKey, name: &str) -> Result<String> {
        (**self).computed_value(scope, name)
    }
}

/// Errors raised by style stores in this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StyleStoreError {
    /// The property name is not acceptable to the engine.
    InvalidName(String),
    /// The value cannot be stored for the property.
    InvalidValue {
        /// Property the value was meant for.
        property: String,
        /// The rejected value.
        value: String,
    },
    /// The scope is unknown or has been detached.
    MissingScope(ScopeKey),
}

impl Display for StyleStoreError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::InvalidName(name) => write!(formatter, "invalid property name: {name:?}"),
            Self::InvalidValue { property, value } => {
                write!(formatter, "invalid value for {property}: {value:?}")
            }
            Self::MissingScope(scope) => write!(formatter, "scope {} does not exist", scope.0),
        }
    }
}

impl Error for StyleStoreError {}
