//! HandlerRegistry - the ordered, fixed-at-startup handler list
//!
//! # 設計
//! - Built during initialization (mutable), shared read-only afterwards
//! - Order of registration is execution order
//! - Names are unique; a second handler with the same name is rejected

use std::sync::Arc;

use super::handler::EffectHandler;
use super::handlers;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("effect handler '{0}' is already registered")]
    AlreadyRegistered(String),
}

#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn EffectHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in handlers in their documented order.
    pub fn canonical() -> Self {
        Self {
            handlers: handlers::canonical(),
        }
    }

    /// Append a handler at the end of the pipeline.
    pub fn register(&mut self, handler: Arc<dyn EffectHandler>) -> Result<(), RegistryError> {
        if self.contains(handler.name()) {
            return Err(RegistryError::AlreadyRegistered(handler.name().to_string()));
        }
        self.handlers.push(handler);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.iter().any(|h| h.name() == name)
    }

    /// Names in execution order.
    pub fn names(&self) -> Vec<String> {
        self.handlers.iter().map(|h| h.name().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn EffectHandler>> {
        self.handlers.iter()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EffectContribution, HandlerError};
    use crate::pipeline::EffectContext;
    use async_trait::async_trait;

    struct Named(&'static str);

    #[async_trait]
    impl EffectHandler for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn run(
            &self,
            _ctx: &mut EffectContext<'_>,
        ) -> Result<Option<EffectContribution>, HandlerError> {
            Ok(None)
        }
    }

    #[test]
    fn keeps_registration_order() {
        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(Named("b"))).unwrap();
        registry.register(Arc::new(Named("a"))).unwrap();
        registry.register(Arc::new(Named("c"))).unwrap();
        assert_eq!(registry.names(), vec!["b", "a", "c"]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(Named("Implings"))).unwrap();
        let err = registry.register(Arc::new(Named("Implings"))).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered(name) if name == "Implings"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn canonical_order_ends_with_loot_doubling() {
        let names = HandlerRegistry::canonical().names();
        assert_eq!(
            names,
            vec![
                "Implings",
                "Random Events",
                "Custom Pet Perk",
                "Voidling",
                "Message in a Bottle",
                "Crate Spawns",
                "Moonlight Mutator",
                "Loot Doubling",
            ]
        );
    }
}
