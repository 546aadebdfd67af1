pub mod event;
pub mod ticket;
pub mod user;

pub use event::{Event, NewEvent};
pub use ticket::{QrPayload, Ticket};
pub use user::{User, UserRole};
