mod errors;
mod input;

pub use errors::InputError;
pub use input::{deserialize_flag, parse_amount, parse_flag};

pub type Country = String;
pub type CardType = String;
pub type ProviderId = String;
