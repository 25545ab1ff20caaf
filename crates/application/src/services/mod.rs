mod message_service;
mod session_gateway;
mod user_service;

pub use message_service::{MessageService, MessageServiceDependencies, PostMessageRequest};
pub use session_gateway::{ConnectError, SessionGateway, SessionGatewayDependencies};
pub use user_service::{UserService, UserServiceDependencies};

#[cfg(test)]
mod user_service_tests;
