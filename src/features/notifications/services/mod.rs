pub mod fields;
pub mod notification_service;
pub mod outbox;
pub mod pdf_service;

pub use notification_service::NotificationService;
pub use outbox::OutboxWorker;
