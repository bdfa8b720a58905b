//! `supportdesk doctor`: diagnose configuration and corpus folders.

use std::path::Path;
use supportdesk_agent::FaqTree;
use supportdesk_config::AppConfig;
use supportdesk_retrieval::IndexStore;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("SupportDesk Doctor: System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => AppConfig::config_dir().join("config.toml"),
    };
    if !path.exists() {
        println!("  [!!] No config file at {}: run `supportdesk onboard`", path.display());
        println!("       Checking built-in defaults instead.");
        issues += 1;
    }

    let config = match AppConfig::load_file(&path) {
        Ok(config) => {
            println!("  [ok] Config valid");
            config
        }
        Err(e) => {
            println!("  [!!] Config invalid: {e}");
            println!("\n  1 issue found; fix the config and re-run.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  [ok] API key configured");
    } else {
        println!("  [!!] No API key: set OPENAI_API_KEY or api_key in the config");
        issues += 1;
    }

    if config.web_search.enabled && config.web_search.api_key.is_none() {
        println!("  [--] Web search enabled but no SERPAPI_API_KEY; the tool will be skipped");
    }

    for corpus in std::iter::once(&config.default_corpus).chain(config.corpora.iter()) {
        if !corpus.folder.is_dir() {
            println!("  [!!] Corpus '{}': folder {} not found", corpus.name, corpus.folder.display());
            issues += 1;
            continue;
        }
        match IndexStore::load(&corpus.store) {
            Ok(Some(store)) if !store.is_empty() => {
                println!("  [ok] Corpus '{}': {} chunks indexed", corpus.name, store.len());
            }
            Ok(_) => println!(
                "  [--] Corpus '{}': not indexed yet (built on first use or by `supportdesk index`)",
                corpus.name
            ),
            Err(e) => {
                println!("  [!!] Corpus '{}': {e}", corpus.name);
                issues += 1;
            }
        }
    }

    if let Some(faq_path) = &config.faq_path {
        match FaqTree::load(faq_path) {
            Ok(tree) => println!("  [ok] FAQ loaded: {} top-level categories", tree.roots().len()),
            Err(e) => {
                println!("  [!!] FAQ {}: {e}", faq_path.display());
                issues += 1;
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
