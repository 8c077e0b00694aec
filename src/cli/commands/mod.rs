mod init;
mod sessions;
mod users;

pub use init::cmd_init;
pub use sessions::cmd_sessions_prune;
pub use users::{cmd_users_list, cmd_users_remove};
