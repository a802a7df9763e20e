pub mod chat;
pub mod replies;
