//! Application Layer
//!
//! Use cases and application services.

pub mod common;
pub mod config;
pub mod login;
pub mod notification;
pub mod password_reset;
pub mod profile;
pub mod register;
pub mod two_factor;
pub mod verify_email;

// Re-exports
pub use config::IdentityConfig;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use notification::{NotificationQueue, Notifier, RecordingNotifier};
pub use password_reset::PasswordResetUseCase;
pub use profile::{ProfileUseCase, UpdateProfileInput};
pub use register::{RegisterInput, RegisterUseCase};
pub use two_factor::{TwoFactorEnabled, TwoFactorUseCase};
pub use verify_email::VerifyEmailUseCase;
