//! # Konto (User Account Service)
//!
//! `konto` exposes registration, login, email activation, password reset, and
//! password change over HTTP/JSON. Users and their time-limited single-use
//! codes live in PostgreSQL; authenticated requests carry a signed, stateless
//! session token.
//!
//! ## Accounts
//!
//! - **Email uniqueness:** one account per email, enforced by a unique index
//!   so concurrent registrations cannot both succeed.
//! - **Activation:** accounts start unactivated; a time-limited single-use
//!   code sent by email flips them to activated. Login is not gated on
//!   activation.
//! - **Usernames:** derived from the first name plus a short random suffix;
//!   collisions are tolerated, usernames are not identity.
//!
//! ## Credentials
//!
//! Passwords are stored as salted Argon2id hashes and never serialized back
//! to clients. Session tokens are HS256-signed JWTs carrying the user id and
//! an expiry; the `AUTH-TOKEN` cookie that transports them has a longer
//! max-age than the token itself, so verification always re-checks the
//! token's own expiry.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
