pub mod credentials;
pub use credentials::CredentialHasher;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, Registration};
pub use auth_service_impl::SeaOrmAuthService;

pub mod account_service;
pub mod account_service_impl;
pub use account_service::{AccountError, AccountService, Profile};
pub use account_service_impl::SeaOrmAccountService;

pub mod feedback_service;
pub mod feedback_service_impl;
pub use feedback_service::{FeedbackDraft, FeedbackError, FeedbackService};
pub use feedback_service_impl::SeaOrmFeedbackService;
