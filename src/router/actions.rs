use crate::router::Bindings;
use eyre::Result;
use indexmap::IndexMap;

/// A handler reached through an action identifier such as `loadbalancers#show`.
pub type Action<C, T> = Box<dyn Fn(&C, &Bindings) -> Result<T>>;

/// Resolves action identifiers to handlers.
pub trait ActionRegistry<C, T> {
    fn resolve(&self, action: &str) -> Option<&Action<C, T>>;
}

/// Registry backed by an ordered map.
pub struct ActionTable<C, T> {
    actions: IndexMap<String, Action<C, T>>,
}

impl<C, T> ActionTable<C, T> {
    pub fn new() -> Self {
        Self { actions: IndexMap::new() }
    }

    /// Registers `handler` under `action`, replacing any previous handler.
    pub fn register<F>(mut self, action: &str, handler: F) -> Self
    where
        F: Fn(&C, &Bindings) -> Result<T> + 'static,
    {
        self.insert(action, handler);
        self
    }

    pub fn insert<F>(&mut self, action: &str, handler: F)
    where
        F: Fn(&C, &Bindings) -> Result<T> + 'static,
    {
        self.actions.insert(action.to_string(), Box::new(handler));
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<C, T> Default for ActionTable<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, T> ActionRegistry<C, T> for ActionTable<C, T> {
    fn resolve(&self, action: &str) -> Option<&Action<C, T>> {
        self.actions.get(action)
    }
}
