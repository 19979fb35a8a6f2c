use anyhow::Result;
use sonda_core::session::MessageRole;
use sonda_core::ChatApi;
use std::sync::Arc;

pub async fn run(api: Arc<dyn ChatApi>, session_id: i64, page: u32, per_page: u32) -> Result<()> {
    let result = api.get_messages(session_id, page, per_page).await?;
    println!(
        "{} ({} messages)\n",
        result.session_info.title, result.session_info.total_messages
    );

    for message in &result.messages {
        let speaker = match message.role {
            MessageRole::User => "you",
            MessageRole::Assistant => "agent",
            MessageRole::System => "system",
        };
        println!("[{speaker}] {}", message.content);
        if let Some(sql) = &message.sql_query {
            println!("      SQL: {sql}");
        }
        if let Some(graph) = &message.graph_url {
            println!("      Graph: {graph}");
        }
    }
    println!(
        "\npage {}/{}",
        result.pagination.page, result.pagination.total_pages
    );
    Ok(())
}
