pub mod content;
pub mod content_like;
pub mod creator;
pub mod fan;
pub mod subscription;
pub mod wallet_transaction;
