use anyhow::Result;
use sonda_core::ChatApi;
use std::sync::Arc;

pub async fn run(api: Arc<dyn ChatApi>, agent_id: i64, page: u32, per_page: u32) -> Result<()> {
    let result = api.list_sessions(agent_id, page, per_page).await?;
    if result.sessions.is_empty() {
        println!("No sessions for agent {agent_id}.");
        return Ok(());
    }

    for session in &result.sessions {
        println!(
            "{:>6}  {}  ({} messages, updated {})",
            session.id, session.title, session.messages_count, session.updated_at
        );
        if let Some(preview) = &session.last_message {
            println!("        {preview}");
        }
    }
    println!(
        "page {}/{} ({} sessions)",
        result.pagination.page, result.pagination.total_pages, result.pagination.total_items
    );
    Ok(())
}

pub async fn delete(api: Arc<dyn ChatApi>, session_id: i64) -> Result<()> {
    api.delete_session(session_id).await?;
    println!("🗑️  Session {session_id} deleted.");
    Ok(())
}
