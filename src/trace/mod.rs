mod xml;

pub use xml::*;
