pub mod announcement;
pub mod genre;
pub mod user;

pub use announcement::*;
pub use genre::*;
pub use user::*;
