//! Merge rule management for BPE.
//!
//! Merge rules are stored using token IDs rather than strings for fast
//! comparison during encoding.

use crate::core::vocab::Vocabulary;
use crate::error::{Result, TokenizerError};
use ahash::AHashMap;

/// A pair of token IDs that can be merged.
pub type Pair = (u32, u32);

/// Merge rule mapping: pair -> (rank, new_token_id).
///
/// The rank indicates the priority of this merge rule (lower rank = higher priority).
/// The new_token_id is the ID of the token created by merging this pair.
pub type MergeMap = AHashMap<Pair, (u32, u32)>;

/// Collection of BPE merge rules with efficient lookup.
#[derive(Debug, Clone, Default)]
pub struct MergeRules {
    /// Merge rules: pair -> (rank, new_token_id)
    merges: MergeMap,
}

impl MergeRules {
    /// Create a new empty collection of merge rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new collection with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            merges: MergeMap::with_capacity(capacity),
        }
    }

    /// Add a merge rule.
    ///
    /// # Arguments
    /// * `pair` - The pair of token IDs to merge
    /// * `rank` - The priority rank (lower = higher priority)
    /// * `new_token_id` - The ID of the token created by this merge
    pub fn add_merge(&mut self, pair: Pair, rank: u32, new_token_id: u32) {
        self.merges.insert(pair, (rank, new_token_id));
    }

    /// Build merge rules from string pairs in priority order.
    ///
    /// The pair at position `i` gets rank `i`. When the model uses a
    /// continuing-subword prefix, it is stripped from the right-hand token
    /// before concatenation (`"a" + "##b"` -> `"ab"`).
    pub fn from_token_pairs<'a, I>(
        vocab: &Vocabulary,
        pairs: I,
        continuing_subword_prefix: Option<&str>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let pairs = pairs.into_iter();
        let mut rules = Self::with_capacity(pairs.size_hint().0);

        for (rank, (left, right)) in pairs.enumerate() {
            let left_id = vocab.get_id(left).ok_or_else(|| {
                TokenizerError::ModelLoad(format!(
                    "merge #{} references unknown token {:?}",
                    rank, left
                ))
            })?;
            let right_id = vocab.get_id(right).ok_or_else(|| {
                TokenizerError::ModelLoad(format!(
                    "merge #{} references unknown token {:?}",
                    rank, right
                ))
            })?;

            let right_part = continuing_subword_prefix
                .and_then(|prefix| right.strip_prefix(prefix))
                .unwrap_or(right);
            let merged = format!("{}{}", left, right_part);
            let new_id = vocab.get_id(&merged).ok_or_else(|| {
                TokenizerError::ModelLoad(format!(
                    "merge #{} produces {:?}, which is not in the vocabulary",
                    rank, merged
                ))
            })?;

            let pair = (left_id, right_id);
            if rules.merges.contains_key(&pair) {
                return Err(TokenizerError::ModelLoad(format!(
                    "merge #{} ({:?} {:?}) is listed twice",
                    rank, left, right
                )));
            }
            rules.add_merge(pair, rank as u32, new_id);
        }

        Ok(rules)
    }

    /// Get the merge rule for a pair.
    ///
    /// Returns Some((rank, new_token_id)) if this pair should be merged,
    /// None otherwise.
    #[inline]
    pub fn get(&self, pair: Pair) -> Option<(u32, u32)> {
        self.merges.get(&pair).copied()
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.merges.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }

    /// Rules as `(pair, rank)` sorted by rank.
    pub fn ordered(&self) -> Vec<(Pair, u32)> {
        let mut ordered: Vec<(Pair, u32)> = self
            .merges
            .iter()
            .map(|(&pair, &(rank, _))| (pair, rank))
            .collect();
        ordered.sort_by_key(|&(_, rank)| rank);
        ordered
    }
}
