pub mod admin;
pub mod assets;
pub mod content;
pub mod creator;
pub mod fan;
pub mod health;
