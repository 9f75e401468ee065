//! Record parsing.
//!
//! [`parse_event`] turns one complete record into one [`Event`](crate::Event):
//! the prefix, action, arguments and trailing text are split out by
//! [`RawRecord`], then the action decides which target fields are filled
//! and the connection's registry resolves channels.

mod nom_parser;
mod parse;

pub use self::nom_parser::{parse_source, RawRecord};
pub use self::parse::{parse_event, split_params};
