mod info;
mod stage;
mod upload;
mod version;

pub use info::cmd_info;
pub use stage::cmd_stage;
pub use upload::cmd_upload;
pub use version::cmd_version;
