//! 领域实体模块

pub mod message;
pub mod user;

pub use message::{Message, MessageWithSender, SenderSummary};
pub use user::User;
