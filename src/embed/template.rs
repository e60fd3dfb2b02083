//! Embedded text with typed placeholder substitution.

use std::marker::PhantomData;

/// Values substituted into a [`Template`].
pub trait TemplateVars {
    /// `(placeholder, value)` pairs, applied in order.
    fn substitutions(&self) -> Vec<(&'static str, String)>;
}

/// Static text whose placeholders are filled from `V`.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _vars: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _vars: PhantomData,
        }
    }

    pub const fn content(&self) -> &'static str {
        self.content
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.substitutions()
            .into_iter()
            .fold(self.content.to_string(), |text, (placeholder, value)| {
                text.replace(placeholder, &value)
            })
    }

    /// Placeholders from `V` that the text does not contain.
    pub fn missing(&self, vars: &V) -> Vec<&'static str> {
        vars.substitutions()
            .into_iter()
            .map(|(placeholder, _)| placeholder)
            .filter(|placeholder| !self.content.contains(placeholder))
            .collect()
    }
}
