pub mod auth;
pub mod chat;
pub mod content;
pub mod theme;
pub mod users;
