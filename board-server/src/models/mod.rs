mod comment;
mod post;
mod vote;

pub use comment::*;
pub use post::*;
pub use vote::*;

/// Row is visible on the public board.
pub const STATUS_ACTIVE: i64 = 1;
/// Row is hidden but can be restored by the admin.
pub const STATUS_DELETED: i64 = 0;
