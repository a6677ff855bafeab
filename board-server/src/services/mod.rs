mod comment_service;
mod comment_tree;
mod moderation_service;
mod post_service;
mod promotion_service;
mod stats_service;
mod vote_service;

pub use comment_service::*;
pub use comment_tree::*;
pub use moderation_service::*;
pub use post_service::*;
pub use promotion_service::*;
pub use stats_service::*;
pub use vote_service::*;
