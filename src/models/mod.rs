pub mod purchase;
pub mod ticket;

pub use purchase::{NewPurchase, Purchase};
pub use ticket::{NewTicket, Ticket};
