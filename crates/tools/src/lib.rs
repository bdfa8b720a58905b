//! Agent tools for SupportDesk.
//!
//! The agent chooses among one tool per document corpus, each answering
//! through its own retrieval chain, and an optional web search.

pub mod corpus;
pub mod web_search;

use std::sync::Arc;
use supportdesk_config::{AppConfig, CorpusConfig};
use supportdesk_core::tool::ToolRegistry;
use supportdesk_retrieval::Responder;

pub use corpus::CorpusTool;
pub use web_search::WebSearchTool;

/// Create the agent's tool registry.
///
/// Web search comes first when configured, followed by the corpus tools in
/// the order given.
pub fn build_registry(
    config: &AppConfig,
    corpora: Vec<(CorpusConfig, Arc<dyn Responder>)>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    if let Some(search) = WebSearchTool::from_config(&config.web_search) {
        registry.register(Box::new(search));
    }

    for (corpus, responder) in corpora {
        registry.register(Box::new(CorpusTool::new(
            corpus.tool_name(),
            corpus.description.clone(),
            responder,
        )));
    }

    tracing::debug!(tools = ?registry.names(), "Built tool registry");
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use supportdesk_core::message::Message;

    struct Fixed;

    #[async_trait]
    impl Responder for Fixed {
        async fn respond(&self, _: &str, _: &[Message]) -> supportdesk_core::Result<String> {
            Ok("fixed".into())
        }
    }

    fn corpora(config: &AppConfig) -> Vec<(CorpusConfig, Arc<dyn Responder>)> {
        config
            .corpora
            .iter()
            .map(|c| (c.clone(), Arc::new(Fixed) as Arc<dyn Responder>))
            .collect()
    }

    #[test]
    fn registry_without_search_key() {
        let config = AppConfig::default();
        let registry = build_registry(&config, corpora(&config));
        assert_eq!(
            registry.names(),
            vec!["service_docs", "customer_interactions", "company_info"]
        );
    }

    #[test]
    fn registry_with_search() {
        let mut config = AppConfig::default();
        config.web_search.api_key = Some("serp".into());
        let registry = build_registry(&config, corpora(&config));
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.names()[0], "web_search");
        assert!(registry.describe().contains("service_docs: "));
    }
}
