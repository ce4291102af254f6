pub mod locks;
pub mod naming;
pub mod slug;
pub mod storage;

pub use locks::KeyedLocks;
pub use naming::{Clock, RandomTokens, SystemClock, TokenSource};
pub use slug::{SlugGenerator, SuffixStrategy};
