/// Authentication module
///
/// Token generation/validation for the two token classes, password
/// hashing, and the account lifecycle service built on top of them.

mod claims;
mod jwt;
mod password;
mod service;

pub use claims::Claims;
pub use jwt::generate_access_token;
pub use jwt::generate_refresh_token;
pub use jwt::generate_token_pair;
pub use jwt::validate_access_token;
pub use jwt::validate_refresh_token;
pub use jwt::TokenPair;
pub use password::hash_password;
pub use password::verify_password;
pub use service::change_password;
pub use service::delete_user;
pub use service::list_users;
pub use service::login;
pub use service::refresh;
pub use service::register;
pub use service::signup;
pub use service::toggle_block;
pub use service::LoginOutcome;
pub use service::RegisterInput;
pub use service::SignupInput;
