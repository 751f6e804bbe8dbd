//! Request authentication and per-route authorization.

pub mod filter;
pub mod ownership;
pub mod policy;
pub mod principal;
pub mod token;

pub use filter::authenticate;
pub use policy::Policy;
pub use principal::Principal;
pub use token::TokenCodec;
