pub mod display_name;
pub mod email;
pub mod password;
pub mod token;
pub mod user;
pub mod username;
