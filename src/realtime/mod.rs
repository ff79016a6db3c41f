mod event;
mod presence;
mod socket;

pub use event::ServerEvent;
pub use presence::{ConnectionId, PresenceRegistry};
pub use socket::socket_handler;
