pub mod config;
pub mod date;
pub mod error;
pub mod lock;
pub mod logging;
pub mod mcp;
pub mod parser;
pub mod reminder;
pub mod session;
pub mod storage;
pub mod task;
pub mod task_list;

pub use date::When;
pub use error::{Result, TkError};
pub use parser::Command;
pub use session::Session;
pub use storage::Storage;
pub use task::{Task, TaskKind};
pub use task_list::TaskList;
