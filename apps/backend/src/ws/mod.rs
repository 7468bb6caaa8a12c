pub mod protocol;
pub mod registry;
pub mod session;

pub use protocol::{ClientMsg, Participant, RoleFilter, ServerMsg};
pub use registry::{ConnectionHandle, ConnectionRegistry};
