pub mod tree;
pub mod value;

pub use self::tree::{Document, Element, ElementId, Shape};
pub use self::value::{Attribute, Value, ValuePart};
