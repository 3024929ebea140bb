//! The anonymous wall: persisted posts and browsing state

mod repository;
mod view;

pub use repository::{MY_IDS_KEY, POSTS_KEY, WallRepository};
pub use view::{DELETE_CONFIRM_WINDOW, DeleteRequest, WallView};
