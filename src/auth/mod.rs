mod guard;
mod password;
mod session;

pub use guard::{authenticate, CurrentAdmin, CurrentUser, MaybeUser};
pub use password::PasswordHasher;
pub use session::SessionStore;
