/*
 * C IR Infrastructure
 */

mod c_frontend;
mod literals;

pub use c_frontend::CFrontend;
pub use literals::{decode_escapes, parse_char_literal, parse_int_literal};
