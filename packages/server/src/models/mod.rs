pub mod content;
pub mod creator;
pub mod fan;
pub mod shared;
