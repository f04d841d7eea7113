pub mod ticket;

pub use ticket::{TicketCreateRequest, TicketPurchaseRequest, TicketView};
