mod auth;
mod cookies;
mod health;
mod home;
mod stats;

pub use auth::{login, logout, oauth_callback};
pub use cookies::{ACCESS_SECRET_COOKIE, ACCESS_TOKEN_COOKIE, REQUEST_SECRET_COOKIE};
pub use health::health_check;
pub use home::homepage;
pub use stats::tweeters_stats;
