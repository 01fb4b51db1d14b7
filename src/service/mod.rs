pub mod index;
pub mod matcher;
pub mod normalizer;
pub mod quantity;
pub mod reconciler;
pub mod scorer;
pub mod tokenizer;

pub use index::{InvertedIndex, SourceIndex};
pub use matcher::{Decision, MatcherService, Rejection, SINGLE_TOKEN_MIN_SCORE};
pub use normalizer::{has_explicit_quantity, normalize};
pub use quantity::{convert_price, extract_quantities, is_unit_compatible, unit_compatible, Quantities};
pub use reconciler::{Outcome, ReconcileService};
pub use scorer::{score, score_with_tokens};
pub use tokenizer::{Lexicon, Tokenizer, UKRAINIAN};
