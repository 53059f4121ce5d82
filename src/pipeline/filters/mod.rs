//! Concrete filter implementations

pub mod char_map;
pub mod whitespace;
pub mod word_wrap;

pub use char_map::CharMapFilter;
pub use whitespace::WhitespaceFilter;
pub use word_wrap::WordWrapFilter;
