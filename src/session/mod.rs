//! Primitives shared by every multiplayer game: the per-channel slot
//! registry, the turn arbiter, and the challenge handshake.
pub mod arbiter;
pub mod handshake;
pub mod registry;

pub use arbiter::{await_qualifying, resolve};
pub use handshake::{challenge, verify, Verification};
pub use registry::{Occupied, SessionDescriptor, SessionGuard, SessionRegistry};
