pub mod user;

pub use user::{NewUser, User, UserChanges, MIN_PASSWORD_LENGTH};
