//! HTTP endpoints of the local callback server used during `plartists auth`.
//!
//! - [`callback`] receives the authorization code from Spotify and exchanges
//!   it for a token using the PKCE verifier held in shared state.
//! - [`health`] reports status and version.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
