pub mod election;
pub mod identity;
pub mod lsa;
pub mod routing_table;

pub use election::*;
pub use identity::*;
pub use lsa::*;
pub use routing_table::*;
