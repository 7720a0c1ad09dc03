//! Name filtering logic

pub mod classifier;
pub mod engine;
pub mod matcher;

pub use classifier::{EntryClassifier, EntryRef};
pub use engine::{FilterEngine, FilterRules};
pub use matcher::{parse_type_list, split_alternatives, PatternCache};
