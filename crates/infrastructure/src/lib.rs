pub mod identity;
pub mod memory;
pub mod models;
pub mod subscription;
pub mod todo_store;

pub use identity::*;
pub use memory::*;
pub use models::*;
pub use subscription::*;
pub use todo_store::*;
