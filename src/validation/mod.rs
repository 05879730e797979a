// Copyright (c) 2025 - Cowboy AI, Inc.
//! Form Validation Layer
//!
//! Every editable record type exposes a [`Form`]: a list of fields, each
//! carrying pure predicates over the candidate record and a read-only view
//! of the committed document. Nothing here mutates or fails; a field is
//! simply valid or invalid, enabled or disabled, shown or hidden.
//!
//! # Example
//!
//! ```rust
//! use craig_store::config::StoreConfig;
//! use craig_store::domain::ResourceGroup;
//! use craig_store::store::Store;
//! use craig_store::validation::Form;
//!
//! let store = Store::new(StoreConfig::default()).unwrap();
//! let ctx = store.validation_context();
//!
//! let draft = ResourceGroup { name: "service-rg".into(), ..Default::default() };
//! assert!(draft.should_disable_save(&ctx));
//! ```

mod forms;
pub mod rules;

use serde::Serialize;

use crate::domain::{ConfigDocument, Locator, Options, Vpc};
use crate::registry::Registry;

/// Read-only view a form is evaluated against
///
/// `parents` locates the collection the candidate belongs to; `original_name`
/// is set when an existing record is edited so it does not collide with
/// itself.
#[derive(Debug, Clone)]
pub struct ValidationContext<'a> {
    pub document: &'a ConfigDocument,
    pub registry: &'a Registry,
    pub parents: Vec<String>,
    pub original_name: Option<String>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(document: &'a ConfigDocument, registry: &'a Registry) -> Self {
        Self {
            document,
            registry,
            parents: Vec::new(),
            original_name: None,
        }
    }

    /// Context for a new record under `parents`
    pub fn within<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self.original_name = None;
        self
    }

    /// Context for editing the record at `locator`
    pub fn editing(mut self, locator: &Locator) -> Self {
        self.parents = locator.parents.clone();
        self.original_name = Some(locator.name.clone());
        self
    }

    pub fn options(&self) -> &Options {
        &self.document.options
    }

    /// VPC enclosing the candidate, for VPC-nested records
    pub fn parent_vpc(&self) -> Option<&'a Vpc> {
        self.parents.first().and_then(|name| self.document.vpc(name))
    }

    /// Check if `name` is the record being edited
    pub fn is_original(&self, name: &str) -> bool {
        self.original_name.as_deref() == Some(name)
    }
}

/// Predicate over a candidate record
pub type Predicate<T> = Box<dyn Fn(&T, &ValidationContext<'_>) -> bool>;

/// Message shown for an invalid field
pub type Message<T> = Box<dyn Fn(&T, &ValidationContext<'_>) -> String>;

/// One input of a form
pub struct Field<T> {
    pub name: &'static str,
    invalid: Predicate<T>,
    invalid_text: Message<T>,
    disabled: Predicate<T>,
    hide_when: Predicate<T>,
}

impl<T> Field<T> {
    /// Field that is always valid, enabled and visible
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            invalid: Box::new(|_, _| false),
            invalid_text: Box::new(|_, _| String::new()),
            disabled: Box::new(|_, _| false),
            hide_when: Box::new(|_, _| false),
        }
    }

    pub fn invalid(mut self, predicate: impl Fn(&T, &ValidationContext<'_>) -> bool + 'static) -> Self {
        self.invalid = Box::new(predicate);
        self
    }

    pub fn invalid_text(
        mut self,
        message: impl Fn(&T, &ValidationContext<'_>) -> String + 'static,
    ) -> Self {
        self.invalid_text = Box::new(message);
        self
    }

    /// Fixed message
    pub fn text(self, message: &'static str) -> Self {
        self.invalid_text(move |_, _| message.to_string())
    }

    pub fn disabled(mut self, predicate: impl Fn(&T, &ValidationContext<'_>) -> bool + 'static) -> Self {
        self.disabled = Box::new(predicate);
        self
    }

    pub fn hide_when(mut self, predicate: impl Fn(&T, &ValidationContext<'_>) -> bool + 'static) -> Self {
        self.hide_when = Box::new(predicate);
        self
    }

    pub fn is_invalid(&self, candidate: &T, ctx: &ValidationContext<'_>) -> bool {
        (self.invalid)(candidate, ctx)
    }

    pub fn is_disabled(&self, candidate: &T, ctx: &ValidationContext<'_>) -> bool {
        (self.disabled)(candidate, ctx)
    }

    pub fn is_hidden(&self, candidate: &T, ctx: &ValidationContext<'_>) -> bool {
        (self.hide_when)(candidate, ctx)
    }

    /// Evaluate every predicate of the field
    pub fn state(&self, candidate: &T, ctx: &ValidationContext<'_>) -> FieldState {
        let invalid = self.is_invalid(candidate, ctx);
        FieldState {
            name: self.name,
            invalid,
            invalid_text: invalid.then(|| (self.invalid_text)(candidate, ctx)),
            disabled: self.is_disabled(candidate, ctx),
            hidden: self.is_hidden(candidate, ctx),
        }
    }
}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

/// Evaluated field, as rendered by a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldState {
    pub name: &'static str,
    pub invalid: bool,
    pub invalid_text: Option<String>,
    pub disabled: bool,
    pub hidden: bool,
}

/// Record type with an editing form
pub trait Form: Sized {
    fn fields() -> Vec<Field<Self>>;

    /// Evaluated predicates of every field
    fn field_states(&self, ctx: &ValidationContext<'_>) -> Vec<FieldState> {
        Self::fields().iter().map(|f| f.state(self, ctx)).collect()
    }

    /// Save is disabled while any visible field is invalid
    fn should_disable_save(&self, ctx: &ValidationContext<'_>) -> bool {
        Self::fields()
            .iter()
            .any(|f| !f.is_hidden(self, ctx) && f.is_invalid(self, ctx))
    }

    /// Messages of visible invalid fields
    fn invalid_fields(&self, ctx: &ValidationContext<'_>) -> Vec<FieldState> {
        self.field_states(ctx)
            .into_iter()
            .filter(|s| s.invalid && !s.hidden)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ResourceGroup, Template};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hidden_invalid_fields_do_not_block_save() {
        struct Draft(bool);
        impl Form for Draft {
            fn fields() -> Vec<Field<Self>> {
                vec![Field::new("flag")
                    .invalid(|_, _| true)
                    .text("always invalid")
                    .hide_when(|d: &Draft, _| d.0)]
            }
        }

        let doc = ConfigDocument::from_template(Template::Empty);
        let registry = Registry::from_document(&doc);
        let ctx = ValidationContext::new(&doc, &registry);

        assert!(Draft(false).should_disable_save(&ctx));
        assert!(!Draft(true).should_disable_save(&ctx));
        assert_eq!(
            Draft(false).field_states(&ctx)[0].invalid_text.as_deref(),
            Some("always invalid")
        );
    }

    #[test]
    fn test_editing_context_ignores_own_name() {
        let doc = ConfigDocument::from_template(Template::Default);
        let registry = Registry::from_document(&doc);
        let rg = ResourceGroup {
            name: "service-rg".into(),
            ..Default::default()
        };

        let create = ValidationContext::new(&doc, &registry);
        assert!(rg.should_disable_save(&create));

        let edit = ValidationContext::new(&doc, &registry).editing(&Locator::new("service-rg"));
        assert!(!rg.should_disable_save(&edit));
        assert!(edit.is_original("service-rg"));
    }
}
