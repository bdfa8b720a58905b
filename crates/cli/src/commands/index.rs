//! `supportdesk index`: build or rebuild every corpus index.

use std::path::Path;
use supportdesk_retrieval::{build_index, rebuild_index};

use super::{load_config, require_api_key};

pub async fn run(config_path: Option<&Path>, rebuild: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    require_api_key(&config)?;
    let provider = supportdesk_providers::build_from_config(&config);

    let corpora = std::iter::once(&config.default_corpus).chain(config.corpora.iter());
    for corpus in corpora {
        let retriever = if rebuild {
            rebuild_index(corpus, &config.retrieval, &config.embedding_model, provider.clone()).await?
        } else {
            build_index(corpus, &config.retrieval, &config.embedding_model, provider.clone()).await?
        };
        println!(
            "  {:<12} {:>6} chunks  {} -> {}",
            corpus.name,
            retriever.len(),
            corpus.folder.display(),
            corpus.store.display()
        );
    }

    Ok(())
}
