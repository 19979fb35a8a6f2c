use anyhow::Result;
use sonda_application::{ChatEvent, ChatOrchestrator, PollPolicy};
use sonda_core::ChatApi;
use std::sync::Arc;

pub async fn run(
    api: Arc<dyn ChatApi>,
    agent_id: i64,
    session_id: Option<i64>,
    question: &str,
) -> Result<()> {
    let (orchestrator, mut events) = ChatOrchestrator::new(api.clone(), PollPolicy::default());

    if let Some(session_id) = session_id {
        let session = api.get_session(session_id).await?;
        orchestrator.select_session(session).await?;
    }

    let ticket = orchestrator.send(agent_id, question).await?;
    println!(
        "📨 Run {} submitted to session {}, waiting for the answer...",
        ticket.run_id, ticket.session_id
    );

    ticket.settled.await?;

    while let Ok(event) = events.try_recv() {
        if let ChatEvent::MessageSettled(message) = event {
            println!("\n{}", message.content);
            if let Some(sql) = message.sql_query {
                println!("\nSQL: {sql}");
            }
            if let Some(graph) = message.graph_url {
                println!("Graph: {graph}");
            }
        }
    }
    Ok(())
}
