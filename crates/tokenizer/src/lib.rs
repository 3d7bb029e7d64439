pub mod error;
pub mod vocab;
pub mod special;
pub mod builder;

pub use builder::{tokenize, VocabBuilder};
pub use error::TokenizerError;
pub use special::SpecialTokens;
pub use vocab::Vocab;
