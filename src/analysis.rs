//! Text analysis: turning raw text into normalized index terms.

pub mod normalizer;
pub mod stemmer;

pub use normalizer::TextNormalizer;
pub use stemmer::{PorterStemmer, Stemmer};
