pub mod agents;
pub mod ask;
pub mod history;
pub mod sessions;
