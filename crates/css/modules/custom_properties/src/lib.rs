//! Scoped access to CSS custom properties on top of a host style engine.
//!
//! [`CustomPropertiesManager`] binds to one scope (an element) and forwards
//! set/get/remove calls to a [`StyleStore`], adding the `--` prefix to names that
//! lack it. [`MemoryStyleStore`] is a self-contained engine with inline styles,
//! rule-supplied values, inheritance and `var()` substitution.
//!
//! Spec: <https://www.w3.org/TR/css-variables-1/>

#![forbid(unsafe_code)]

use std::borrow::Cow;

pub use css_variables::CUSTOM_PROPERTY_PREFIX;

mod manager;
pub use manager::CustomPropertiesManager;

mod store;
pub use store::{StyleStore, StyleStoreError};

mod memory;
pub use memory::MemoryStyleStore;

/// Opaque handle to a styleable node inside a [`StyleStore`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ScopeKey(pub u64);

impl ScopeKey {
    /// The document root scope.
    pub const ROOT: Self = Self(0);
}

/// Prefix `name` with `--` unless it already starts with it.
///
/// Applying this twice yields the same result as applying it once.
#[inline]
pub fn normalize_property_name(name: &str) -> Cow<'_, str> {
    if name.starts_with(CUSTOM_PROPERTY_PREFIX) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned([CUSTOM_PROPERTY_PREFIX, name].concat())
    }
}
