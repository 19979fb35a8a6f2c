//! Fixed assistant reply texts.
//!
//! The backend speaks Portuguese to its users; these are the exact strings
//! surfaces display for placeholder, fallback and failure replies.

/// Placeholder content shown while a run is in flight.
pub const PROCESSING: &str = "Processando...";

/// Answer content when the backend reports success without result text.
pub const ANSWER_RECEIVED: &str = "Resposta recebida";

/// Error classification when the backend reports failure without one.
pub const UNKNOWN_ERROR: &str = "Erro desconhecido";

/// Reply when the poll attempt budget is exhausted.
pub const TIMEOUT: &str = "Timeout: A resposta demorou muito tempo.";

/// Reply when a poll request itself fails.
pub const POLL_FAILURE: &str = "Erro ao obter resposta. Tente novamente.";

/// Reply when run submission fails after the pair is already visible.
pub const SUBMIT_FAILURE: &str = "Erro ao enviar mensagem. Tente novamente.";

/// Builds the reply content for a failed run.
pub fn failure_content(error_type: Option<&str>) -> String {
    format!("Erro: {}", error_type.unwrap_or(UNKNOWN_ERROR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_content_uses_the_classification() {
        assert_eq!(failure_content(Some("SQL_ERROR")), "Erro: SQL_ERROR");
        assert_eq!(failure_content(None), "Erro: Erro desconhecido");
    }
}
