//! OAuth2 support for Dropbox apps.
//!
//! - [`OAuth2Client`] builds authorization URLs and talks to the token and
//!   revoke endpoints.
//! - [`DropboxAuthHelper`] runs the authorization-code flow, guarding the
//!   callback with a single-use CSRF token held in a
//!   [`PersistentDataStore`].

mod helper;
mod oauth2;
mod random;
mod store;

pub use helper::{decode_state, DropboxAuthHelper, CSRF_LENGTH, STATE_KEY};
pub use oauth2::{GrantType, OAuth2Client, TokenAccessType, REVOKE_ENDPOINT};
pub use random::{
    default_generator, OsRandomStringGenerator, RandomStringGenerator, RandomStringGeneratorKind,
    RingRandomStringGenerator,
};
pub use store::{
    InMemoryDataStore, PersistentDataStore, PersistentDataStoreKind, Session, SessionDataStore,
    KEY_PREFIX,
};
