//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务，处理输入校验、会话与在线状态，
//! 以及对外部适配器（例如密码哈希、持久化存储）的抽象。

pub mod clock;
pub mod dto;
pub mod error;
pub mod password;
pub mod registry;
pub mod repository;
pub mod services;

pub use clock::{Clock, SystemClock};
pub use dto::{MessageDto, UserProfile};
pub use error::ApplicationError;
pub use password::{PasswordHasher, PasswordHasherError};
pub use registry::{ActiveSession, SessionIdentity, SessionRegistry};
pub use repository::{MessageRepository, UserRepository};
pub use services::{
    ConnectError, MessageService, MessageServiceDependencies, PostMessageRequest, SessionGateway,
    SessionGatewayDependencies, UserService, UserServiceDependencies,
};
