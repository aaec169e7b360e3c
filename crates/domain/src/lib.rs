pub mod errors;
pub mod filter;
pub mod profile;
pub mod todo;
pub mod user;

pub use errors::*;
pub use filter::*;
pub use profile::*;
pub use todo::*;
pub use user::*;
