pub mod auth_view;
pub mod context;
pub mod item_editor;
pub mod navigator;
pub mod profile_editor;
pub mod render;
pub mod session;
pub mod store;
pub mod todo_list;

pub use auth_view::*;
pub use context::*;
pub use item_editor::*;
pub use navigator::*;
pub use profile_editor::*;
pub use render::*;
pub use session::*;
pub use store::*;
pub use todo_list::*;
