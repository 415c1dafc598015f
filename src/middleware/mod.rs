pub mod session;
pub mod sync_body;
