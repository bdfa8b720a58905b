//! `supportdesk onboard`: first-time setup.

use std::path::Path;
use supportdesk_config::AppConfig;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = match config_path {
        Some(path) => path.to_path_buf(),
        None => AppConfig::config_dir().join("config.toml"),
    };

    println!("SupportDesk: First-Time Setup");
    println!("=============================\n");

    if let Some(dir) = config_path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        std::fs::create_dir_all(dir)?;
        println!("  Created config directory: {}", dir.display());
    }

    if config_path.exists() {
        println!("  Config already exists at: {}", config_path.display());
        println!("  Edit it manually or delete it and re-run onboard.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("  Created config at: {}", config_path.display());

    let defaults = AppConfig::default();
    println!("\n  Next steps:");
    println!("   1. Add your API key to the config (or set OPENAI_API_KEY)");
    println!("   2. Put support documents (.txt, .md, .docx) under:");
    println!("        {}", defaults.default_corpus.folder.display());
    for corpus in &defaults.corpora {
        println!("        {}", corpus.folder.display());
    }
    println!("   3. Run: supportdesk index");
    println!("   4. Run: supportdesk chat\n");

    Ok(())
}
