pub mod auth_service;
pub mod group_service;
pub mod post_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use group_service::GroupService;
pub use post_service::PostService;
pub use user_service::UserService;
