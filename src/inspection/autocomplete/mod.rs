//! Module H's three autocomplete providers (§4.6).

pub mod keyword;
pub mod language_constant;
pub mod primitive_type;
