pub mod amount;
pub mod countdown;
pub mod string;

pub use amount::{
    format_amount, format_amount_with, format_crore, format_rupees, parse_amount, AmountParseError,
    AmountStyle, AmountUnit,
};
pub use countdown::{format_remaining, Countdown};
pub use string::*;
