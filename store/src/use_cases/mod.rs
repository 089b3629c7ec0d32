pub mod documents;

pub use documents::Collections;
