//! `supportdesk ask`: answer one question and exit.

use std::path::Path;
use supportdesk_agent::{Mode, SupportDesk};

use super::{load_config, require_api_key};

pub async fn run(
    config_path: Option<&Path>,
    message: String,
    agent: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    require_api_key(&config)?;
    let provider = supportdesk_providers::build_from_config(&config);
    let desk = SupportDesk::from_config(&config, provider).await?;

    let mode = Mode::from_agent_flag(agent || config.session.agent_by_default);
    let mut session = desk.new_session_with_mode(mode);

    eprint!("  Thinking...");
    let result = desk.handle_message(&mut session, &message).await;
    eprint!("\r              \r");
    println!("{}", result?);

    Ok(())
}
