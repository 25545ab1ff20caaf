//! 家庭聊天系统核心领域模型
//!
//! 包含用户、消息等核心实体，实时信道的事件类型，以及相关的业务规则。

pub mod entities;
pub mod errors;
pub mod events;

// 重新导出常用类型
pub use entities::*;
pub use errors::*;
pub use events::*;
