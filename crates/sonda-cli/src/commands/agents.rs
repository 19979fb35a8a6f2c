use anyhow::Result;
use sonda_core::ChatApi;
use std::sync::Arc;

pub async fn run(api: Arc<dyn ChatApi>) -> Result<()> {
    let agents = api.list_agents().await?;
    if agents.is_empty() {
        println!("No agents available.");
        return Ok(());
    }

    for agent in agents {
        println!("{:>6}  {}  [{}]", agent.id, agent.name, agent.selected_model);
        if let Some(description) = agent.description {
            println!("        {description}");
        }
    }
    Ok(())
}
