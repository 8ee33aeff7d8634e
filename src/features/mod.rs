pub mod auth;
pub mod contact;
pub mod notifications;
pub mod requests;
pub mod uploads;
