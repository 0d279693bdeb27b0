mod auth;
mod health_check;

pub use auth::change_password;
pub use auth::delete_user;
pub use auth::get_users;
pub use auth::login;
pub use auth::me;
pub use auth::refresh;
pub use auth::register;
pub use auth::signup;
pub use auth::toggle_block;
pub use health_check::health_check;
