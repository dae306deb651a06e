pub mod session;
pub mod view;

pub use session::{SessionContext, SessionError, SessionStore};
pub use view::{AuctionView, PlayerPage};
