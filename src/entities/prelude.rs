pub use super::feedback::Entity as Feedback;
pub use super::users::Entity as Users;
