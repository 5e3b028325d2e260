mod simple;

pub use simple::{find_crossings, is_simple, Crossing};
