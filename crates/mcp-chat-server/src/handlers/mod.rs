pub mod chat;
pub mod health;
pub mod history;
pub mod sessions;
pub mod status;
pub mod ui;
