pub mod error;
pub mod ticket;

pub use error::TicketError;
pub use ticket::{Clock, TicketService, TicketServiceImpl};
