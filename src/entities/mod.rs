pub mod prelude;

pub mod feedback;
pub mod users;
