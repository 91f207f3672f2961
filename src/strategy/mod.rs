//! Single-shot search strategies selected by index name.
//!
//! Unlike the agentic loop, a strategy runs exactly one search and one chat
//! completion. [`StrategyFactory`] picks the first registered strategy whose
//! [`SearchStrategy::can_handle`] accepts the index name.

pub mod semantic;

pub use semantic::SemanticSearchStrategy;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AgentError;

/// A search-then-answer flow for one family of indexes.
#[async_trait]
pub trait SearchStrategy: Send + Sync {
    /// Short identifier (e.g. `"semantic"`).
    fn strategy_type(&self) -> &'static str;

    /// Returns `true` if this strategy applies to `index_name`.
    fn can_handle(&self, index_name: &str) -> bool;

    /// Searches `index_name` for `user_prompt` and answers from the results.
    ///
    /// # Errors
    ///
    /// Propagates search and chat failures the strategy does not translate
    /// into a user-facing message.
    async fn execute_search_and_chat(
        &self,
        index_name: &str,
        user_prompt: &str,
    ) -> Result<String, AgentError>;
}

/// Ordered set of strategies consulted by index name.
#[derive(Clone, Default)]
pub struct StrategyFactory {
    strategies: Vec<Arc<dyn SearchStrategy>>,
}

impl StrategyFactory {
    /// Creates a factory over strategies in priority order.
    #[must_use]
    pub fn new(strategies: Vec<Arc<dyn SearchStrategy>>) -> Self {
        Self { strategies }
    }

    /// Returns the first strategy that accepts `index_name`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NoStrategy`] naming the index when none matches.
    pub fn get_strategy(&self, index_name: &str) -> Result<Arc<dyn SearchStrategy>, AgentError> {
        let strategy = self
            .strategies
            .iter()
            .find(|s| s.can_handle(index_name))
            .ok_or_else(|| AgentError::NoStrategy {
                index_name: index_name.to_string(),
            })?;
        debug!(
            index = index_name,
            strategy = strategy.strategy_type(),
            "selected search strategy"
        );
        Ok(Arc::clone(strategy))
    }

    /// Identifiers of the registered strategies.
    #[must_use]
    pub fn strategy_types(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.strategy_type()).collect()
    }
}

impl std::fmt::Debug for StrategyFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyFactory")
            .field("strategies", &self.strategy_types())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::agent::agentic_loop::tests::ScriptedProvider;
    use crate::search::testing::MockSearchBackend;

    use proptest::prelude::*;
    use test_case::test_case;

    fn factory() -> StrategyFactory {
        let strategy = SemanticSearchStrategy::new(
            Arc::new(ScriptedProvider::new(Vec::new())),
            Arc::new(MockSearchBackend::default()),
            "default",
        );
        StrategyFactory::new(vec![Arc::new(strategy)])
    }

    #[test_case("ProductsSemanticV2" ; "mixed case")]
    #[test_case("semantic-index" ; "prefix")]
    #[test_case("assets-SEMANTIC" ; "upper case suffix")]
    fn test_semantic_selected(index: &str) {
        let strategy = factory()
            .get_strategy(index)
            .unwrap_or_else(|e| panic!("no strategy: {e}"));
        assert_eq!(strategy.strategy_type(), "semantic");
    }

    #[test_case("products-v1" ; "plain")]
    #[test_case("assets-hybrid" ; "hybrid")]
    #[test_case("" ; "empty")]
    fn test_no_strategy_names_index(index: &str) {
        match factory().get_strategy(index) {
            Err(AgentError::NoStrategy { index_name }) => assert_eq!(index_name, index),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("expected no strategy for {index}"),
        }
    }

    #[test]
    fn test_no_strategy_message() {
        let message = factory()
            .get_strategy("products-v1")
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(message.contains("'products-v1'"));
    }

    #[test]
    fn test_empty_factory() {
        let factory = StrategyFactory::default();
        assert!(factory.get_strategy("ProductsSemanticV2").is_err());
        assert!(factory.strategy_types().is_empty());
    }

    proptest! {
        #[test]
        fn semantic_anywhere_is_selected(
            prefix in "[a-z0-9-]{0,12}",
            suffix in "[a-z0-9-]{0,12}",
            upper in any::<bool>(),
        ) {
            let word = if upper { "SeMaNtIc" } else { "semantic" };
            let index = format!("{prefix}{word}{suffix}");
            prop_assert!(factory().get_strategy(&index).is_ok());
        }

        #[test]
        fn without_semantic_is_rejected(index in "[a-rt-z0-9-]{0,24}") {
            // no 's' means the substring cannot occur
            prop_assert!(factory().get_strategy(&index).is_err());
        }
    }
}
