//! In-memory message list for the active session.

use super::message::Message;

/// Ordered message list for the currently active session.
///
/// The buffer is the single owner of what a surface displays for a session.
/// It is seeded with an optimistic user/placeholder pair before the backend
/// confirms anything, and reconciled in place as results arrive. Switching
/// sessions discards it and history is loaded fresh from the server.
///
/// All operations are identifier-keyed and idempotent, so a late or repeated
/// update can never duplicate entries or disturb unrelated ones.
#[derive(Debug, Default)]
pub struct MessageBuffer {
    messages: Vec<Message>,
}

impl MessageBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages in the buffer.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the buffer holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends an optimistic user/placeholder pair.
    ///
    /// Any existing entry bearing either identifier is removed first, then
    /// the user message and the assistant placeholder are appended in that
    /// order. Seeding the same pair twice therefore leaves exactly one pair,
    /// and the user message always precedes its assistant counterpart
    /// regardless of when confirmations arrive.
    pub fn seed(&mut self, user: Message, placeholder: Message) {
        self.messages
            .retain(|m| m.id != user.id && m.id != placeholder.id);
        self.messages.push(user);
        self.messages.push(placeholder);
    }

    /// Replaces the entry with `placeholder_id` by `message`, in place.
    ///
    /// All other entries are left untouched and list order is preserved.
    /// Returns false when no entry bears the identifier (a late result for
    /// a pair that is no longer displayed), in which case nothing changes.
    pub fn reconcile(&mut self, placeholder_id: i64, message: Message) -> bool {
        match self.messages.iter_mut().find(|m| m.id == placeholder_id) {
            Some(slot) => {
                *slot = message;
                true
            }
            None => false,
        }
    }

    /// Replaces the entire buffer with persisted history.
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// Discards all messages (session switch or new chat).
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::message::MessageRole;

    fn message(id: i64, role: MessageRole, content: &str) -> Message {
        Message {
            id,
            chat_session_id: 1,
            run_id: None,
            role,
            content: content.to_string(),
            sql_query: None,
            graph_url: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            sequence_order: 0,
            message_metadata: None,
        }
    }

    #[test]
    fn seed_appends_pair_in_order() {
        let mut buffer = MessageBuffer::new();
        buffer.seed(
            message(10, MessageRole::User, "pergunta"),
            message(11, MessageRole::Assistant, "Processando..."),
        );

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.messages()[0].role, MessageRole::User);
        assert_eq!(buffer.messages()[1].role, MessageRole::Assistant);
    }

    #[test]
    fn seed_is_idempotent() {
        let mut buffer = MessageBuffer::new();
        let user = message(10, MessageRole::User, "pergunta");
        let placeholder = message(11, MessageRole::Assistant, "Processando...");

        buffer.seed(user.clone(), placeholder.clone());
        buffer.seed(user, placeholder);

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.messages()[0].id, 10);
        assert_eq!(buffer.messages()[1].id, 11);
    }

    #[test]
    fn seed_preserves_existing_messages() {
        let mut buffer = MessageBuffer::new();
        buffer.replace_all(vec![
            message(1, MessageRole::User, "anterior"),
            message(2, MessageRole::Assistant, "resposta"),
        ]);

        buffer.seed(
            message(10, MessageRole::User, "nova"),
            message(11, MessageRole::Assistant, "Processando..."),
        );

        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.messages()[0].id, 1);
        assert_eq!(buffer.messages()[1].id, 2);
    }

    #[test]
    fn reconcile_replaces_only_the_target() {
        let mut buffer = MessageBuffer::new();
        buffer.seed(
            message(10, MessageRole::User, "pergunta"),
            message(11, MessageRole::Assistant, "Processando..."),
        );
        let user_before = buffer.messages()[0].clone();

        let mut answer = message(11, MessageRole::Assistant, "R$100");
        answer.run_id = Some(77);
        assert!(buffer.reconcile(11, answer));

        assert_eq!(buffer.messages()[0], user_before);
        assert_eq!(buffer.messages()[1].content, "R$100");
        assert_eq!(buffer.messages()[1].run_id, Some(77));
    }

    #[test]
    fn reconcile_unknown_id_is_noop() {
        let mut buffer = MessageBuffer::new();
        buffer.seed(
            message(10, MessageRole::User, "pergunta"),
            message(11, MessageRole::Assistant, "Processando..."),
        );
        let before = buffer.messages().to_vec();

        assert!(!buffer.reconcile(999, message(999, MessageRole::Assistant, "tarde demais")));
        assert_eq!(buffer.messages(), &before[..]);
    }

    #[test]
    fn two_pairs_reconcile_independently() {
        let mut buffer = MessageBuffer::new();
        buffer.seed(
            message(10, MessageRole::User, "primeira"),
            message(11, MessageRole::Assistant, "Processando..."),
        );
        buffer.seed(
            message(20, MessageRole::User, "segunda"),
            message(21, MessageRole::Assistant, "Processando..."),
        );

        assert!(buffer.reconcile(21, message(21, MessageRole::Assistant, "segunda resposta")));
        assert_eq!(buffer.messages()[1].content, "Processando...");

        assert!(buffer.reconcile(11, message(11, MessageRole::Assistant, "primeira resposta")));
        assert_eq!(buffer.messages()[1].content, "primeira resposta");
        assert_eq!(buffer.messages()[3].content, "segunda resposta");
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn clear_discards_everything() {
        let mut buffer = MessageBuffer::new();
        buffer.seed(
            message(10, MessageRole::User, "pergunta"),
            message(11, MessageRole::Assistant, "Processando..."),
        );
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
