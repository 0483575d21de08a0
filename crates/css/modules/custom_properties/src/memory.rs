//! An in-process style engine: a scope tree with inline declarations, rule-supplied
//! declarations, custom property inheritance and `var()` substitution.

use crate::{ScopeKey, StyleStore, StyleStoreError};
use anyhow::Result;
use css_style_attr::{
    Declaration, normalize_property, parse_style_attribute, serialize_declarations, unquoted_chars,
};
use css_variables::{is_custom_property_name, resolve_custom_property, resolve_vars_in_value};
use log::{debug, warn};
use std::cell::RefCell;
use std::collections::HashMap;

/// Which declaration list of a scope an operation targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Layer {
    /// The element's own `style` attribute.
    Inline,
    /// Values matched from stylesheets or set by other actors.
    Rules,
}

/// Per-scope data.
#[derive(Debug, Default)]
struct ScopeEntry {
    parent: Option<ScopeKey>,
    children: Vec<ScopeKey>,
    inline: Vec<Declaration>,
    rules: Vec<Declaration>,
}

impl ScopeEntry {
    fn layer_mut(&mut self, layer: Layer) -> &mut Vec<Declaration> {
        match layer {
            Layer::Inline => &mut self.inline,
            Layer::Rules => &mut self.rules,
        }
    }

    /// Own declared value: inline wins over rules.
    fn declared(&self, property: &str) -> Option<&str> {
        find_value(&self.inline, property).or_else(|| find_value(&self.rules, property))
    }
}

#[derive(Debug)]
struct StoreState {
    scopes: HashMap<ScopeKey, ScopeEntry>,
    next_scope: u64,
}

impl StoreState {
    fn entry_mut(&mut self, scope: ScopeKey) -> Result<&mut ScopeEntry> {
        self.scopes
            .get_mut(&scope)
            .ok_or_else(|| StyleStoreError::MissingScope(scope).into())
    }

    /// Computed value of a custom property: own declaration with references
    /// substituted, otherwise inherited from the parent.
    ///
    /// Spec: <https://www.w3.org/TR/css-variables-1/#defining-variables>
    fn computed_custom(&self, scope: ScopeKey, property: &str) -> Option<String> {
        let entry = self.scopes.get(&scope)?;
        match entry.declared(property) {
            Some(declared) => resolve_custom_property(property, declared, |reference| {
                self.reference_value(scope, reference)
            }),
            None => self.computed_custom(entry.parent?, property),
        }
    }

    /// Value seen by a `var()` reference on `scope`: the raw own declaration, or the
    /// already substituted value inherited from the parent.
    fn reference_value(&self, scope: ScopeKey, property: &str) -> Option<String> {
        let entry = self.scopes.get(&scope)?;
        match entry.declared(property) {
            Some(declared) => Some(declared.to_owned()),
            None => self.computed_custom(entry.parent?, property),
        }
    }

    fn computed(&self, scope: ScopeKey, property: &str) -> Option<String> {
        if is_custom_property_name(property) {
            return self.computed_custom(scope, property);
        }
        let declared = self.scopes.get(&scope)?.declared(property)?;
        resolve_vars_in_value(declared, |reference| self.reference_value(scope, reference))
    }

    fn remove_subtree(&mut self, scope: ScopeKey) {
        if let Some(entry) = self.scopes.remove(&scope) {
            for child in entry.children {
                self.remove_subtree(child);
            }
        }
    }
}

/// A [`StyleStore`] that keeps everything in memory.
///
/// Not thread-safe; share it by reference or through `Rc`.
#[derive(Debug)]
pub struct MemoryStyleStore {
    state: RefCell<StoreState>,
}

impl MemoryStyleStore {
    /// Create a store holding only [`ScopeKey::ROOT`].
    pub fn new() -> Self {
        let mut scopes = HashMap::new();
        scopes.insert(ScopeKey::ROOT, ScopeEntry::default());
        Self {
            state: RefCell::new(StoreState {
                scopes,
                next_scope: 1,
            }),
        }
    }

    /// Create a child of `parent` and return its key.
    ///
    /// # Errors
    /// [`StyleStoreError::MissingScope`] if `parent` does not exist.
    pub fn create_scope(&self, parent: ScopeKey) -> Result<ScopeKey> {
        let mut state = self.state.borrow_mut();
        let scope = ScopeKey(state.next_scope);
        state.entry_mut(parent)?.children.push(scope);
        state.next_scope += 1;
        state.scopes.insert(
            scope,
            ScopeEntry {
                parent: Some(parent),
                ..ScopeEntry::default()
            },
        );
        debug!("created scope {} under {}", scope.0, parent.0);
        Ok(scope)
    }

    /// Remove `scope` and all of its descendants. Detaching an unknown scope does
    /// nothing; the root cannot be detached.
    pub fn detach(&self, scope: ScopeKey) {
        if scope == ScopeKey::ROOT {
            warn!("ignoring request to detach the root scope");
            return;
        }
        let mut state = self.state.borrow_mut();
        let parent = state.scopes.get(&scope).and_then(|entry| entry.parent);
        if let Some(parent_entry) = parent.and_then(|key| state.scopes.get_mut(&key)) {
            parent_entry.children.retain(|child| *child != scope);
        }
        state.remove_subtree(scope);
        debug!("detached scope {}", scope.0);
    }

    /// Whether `scope` is currently attached.
    pub fn contains(&self, scope: ScopeKey) -> bool {
        self.state.borrow().scopes.contains_key(&scope)
    }

    /// Set a value in the rule layer of `scope`, as a matching stylesheet rule would.
    /// Inline declarations take precedence over it.
    ///
    /// # Errors
    /// Same validation as [`StyleStore::set_property`].
    pub fn set_rule_property(&self, scope: ScopeKey, name: &str, value: &str) -> Result<()> {
        self.write(Layer::Rules, scope, name, value)
    }

    /// Remove a value from the rule layer of `scope`.
    ///
    /// # Errors
    /// Same validation as [`StyleStore::remove_property`].
    pub fn remove_rule_property(&self, scope: ScopeKey, name: &str) -> Result<()> {
        self.erase(Layer::Rules, scope, name)
    }

    /// The value declared in the inline style of `scope`, exactly as stored.
    pub fn inline_value(&self, scope: ScopeKey, name: &str) -> Option<String> {
        let state = self.state.borrow();
        let entry = state.scopes.get(&scope)?;
        find_value(&entry.inline, &normalize_property(name)).map(str::to_owned)
    }

    /// Serialized inline style of `scope`; empty for unknown scopes.
    ///
    /// Spec: <https://drafts.csswg.org/cssom/#dom-cssstyledeclaration-csstext>
    pub fn css_text(&self, scope: ScopeKey) -> String {
        self.state
            .borrow()
            .scopes
            .get(&scope)
            .map(|entry| serialize_declarations(&entry.inline))
            .unwrap_or_default()
    }

    /// Replace the inline style of `scope` with declarations parsed from `text`.
    /// Declarations the store would reject are dropped.
    ///
    /// # Errors
    /// [`StyleStoreError::MissingScope`] if `scope` does not exist.
    pub fn set_css_text(&self, scope: ScopeKey, text: &str) -> Result<()> {
        let mut inline: Vec<Declaration> = Vec::new();
        for declaration in parse_style_attribute(text) {
            if let Err(error) = validate(&declaration.property, &declaration.value) {
                debug!("dropping declaration from cssText: {error}");
                continue;
            }
            upsert(&mut inline, declaration.property, &declaration.value);
        }
        let mut state = self.state.borrow_mut();
        state.entry_mut(scope)?.inline = inline;
        Ok(())
    }

    fn write(&self, layer: Layer, scope: ScopeKey, name: &str, value: &str) -> Result<()> {
        let property = normalize_property(name);
        if value.is_empty() {
            // Setting the empty string removes the declaration.
            return self.erase(layer, scope, &property);
        }
        validate(&property, value)?;
        let mut state = self.state.borrow_mut();
        let declarations = state.entry_mut(scope)?.layer_mut(layer);
        debug!("{layer:?} {property}: {value:?} on scope {}", scope.0);
        upsert(declarations, property, value);
        Ok(())
    }

    fn erase(&self, layer: Layer, scope: ScopeKey, name: &str) -> Result<()> {
        let property = normalize_property(name);
        validate_name(&property)?;
        let mut state = self.state.borrow_mut();
        let declarations = state.entry_mut(scope)?.layer_mut(layer);
        let before = declarations.len();
        declarations.retain(|declaration| declaration.property != property);
        if declarations.len() != before {
            debug!("{layer:?} removed {property} on scope {}", scope.0);
        }
        Ok(())
    }
}

impl Default for MemoryStyleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleStore for MemoryStyleStore {
    #[inline]
    fn root_scope(&self) -> ScopeKey {
        ScopeKey::ROOT
    }

    fn set_property(&self, scope: ScopeKey, name: &str, value: &str) -> Result<()> {
        self.write(Layer::Inline, scope, name, value)
    }

    fn remove_property(&self, scope: ScopeKey, name: &str) -> Result<()> {
        self.erase(Layer::Inline, scope, name)
    }

    fn computed_value(&self, scope: ScopeKey, name: &str) -> Result<String> {
        let property = normalize_property(name);
        Ok(self
            .state
            .borrow()
            .computed(scope, &property)
            .unwrap_or_default())
    }
}

fn find_value<'decls>(declarations: &'decls [Declaration], property: &str) -> Option<&'decls str> {
    declarations
        .iter()
        .find(|declaration| declaration.property == property)
        .map(|declaration| declaration.value.as_str())
}

/// Replace the value in place if the property exists, otherwise append.
fn upsert(declarations: &mut Vec<Declaration>, property: String, value: &str) {
    match declarations
        .iter_mut()
        .find(|declaration| declaration.property == property)
    {
        Some(existing) => value.clone_into(&mut existing.value),
        None => declarations.push(Declaration {
            property,
            value: value.to_owned(),
        }),
    }
}

/// Custom property names are `--` plus at least one character; other names must be
/// non-empty and free of whitespace, `:` and `;`.
///
/// Spec: <https://www.w3.org/TR/css-variables-1/#custom-property>
fn validate_name(property: &str) -> Result<(), StyleStoreError> {
    let well_formed = if property.starts_with("--") {
        is_custom_property_name(property)
    } else {
        !property.is_empty()
            && !property
                .chars()
                .any(|character| character.is_whitespace() || matches!(character, ':' | ';'))
    };
    if well_formed {
        Ok(())
    } else {
        Err(StyleStoreError::InvalidName(property.to_owned()))
    }
}

/// Reject values with a top-level `;` or unbalanced brackets. String contents and
/// escaped characters are not inspected.
///
/// Spec: <https://www.w3.org/TR/css-syntax-3/#typedef-declaration-value>
fn validate(property: &str, value: &str) -> Result<(), StyleStoreError> {
    validate_name(property)?;
    let mut open: Vec<char> = Vec::new();
    let balanced = unquoted_chars(value).all(|(_, character)| match character {
        '(' => {
            open.push(')');
            true
        }
        '[' => {
            open.push(']');
            true
        }
        '{' => {
            open.push('}');
            true
        }
        ')' | ']' | '}' => open.pop() == Some(character),
        ';' => !open.is_empty(),
        _ => true,
    });
    if balanced && open.is_empty() {
        Ok(())
    } else {
        Err(StyleStoreError::InvalidValue {
            property: property.to_owned(),
            value: value.to_owned(),
        })
    }
}
