mod outbox;

pub use outbox::{OutboxEntry, OutboxStatus};
