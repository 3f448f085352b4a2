pub mod escape;

pub use self::escape::{decode_special, split_value};
