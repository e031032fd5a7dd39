//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&MySqlPool` as the first argument.

pub mod meta_repo;
pub mod option_repo;
pub mod post_repo;
pub mod user_meta_repo;

pub use meta_repo::MetaRepo;
pub use option_repo::OptionRepo;
pub use post_repo::PostRepo;
pub use user_meta_repo::UserMetaRepo;
