//! The append-only log of produced blocks.

use std::ops::Index;

use rand::{distributions::Alphanumeric, Rng, RngCore};
use serde::Serialize;

use crate::{
    clock::Timestamp,
    consensus::{ConsensusMode, Election},
    node::NodeId,
};

/// Hash-like label of a [`Block`]. Purely cosmetic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BlockHash(String);

impl BlockHash {
    /// Number of random characters following the `0x` prefix.
    pub const RANDOM_LEN: usize = 12;

    /// Hash of the genesis block.
    pub fn genesis() -> Self {
        BlockHash("0xGENESIS".into())
    }

    /// Parent hash recorded on the genesis block.
    pub fn zero() -> Self {
        BlockHash("0x0".into())
    }

    /// Draws a `0x`-prefixed string of uppercase alphanumerics from `rng`.
    pub fn random<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let body: String = rng
            .sample_iter(&Alphanumeric)
            .take(Self::RANDOM_LEN)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect();

        BlockHash(format!("0x{body}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlockHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Representation of a produced block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Position in the chain. Equals the chain length before this block was
    /// appended.
    pub index: u64,
    pub hash: BlockHash,
    pub previous_hash: BlockHash,
    pub timestamp: Timestamp,
    /// The node credited with the block, if one existed.
    pub minted_by: Option<NodeId>,
    /// Name of the producer at the time the block was made.
    pub minted_by_name: String,
    pub consensus: ConsensusMode,
    pub difficulty: u32,
    pub transactions: Vec<String>,
    pub insight: String,
    /// Outcome of the consensus engine's election. Informational only.
    pub election: Option<Election>,
}

/// Fields of a [`Block`] which are not derived from the chain itself.
#[derive(Debug, Clone)]
pub struct BlockDraft {
    pub hash: BlockHash,
    pub timestamp: Timestamp,
    pub minted_by: Option<NodeId>,
    pub minted_by_name: String,
    pub consensus: ConsensusMode,
    pub difficulty: u32,
    pub transactions: Vec<String>,
    pub insight: String,
    pub election: Option<Election>,
}

/// Ordered sequence of blocks starting with a genesis block.
///
/// # Invariants
///
/// `self[i].index == i` and, for `i > 0`,
/// `self[i].previous_hash == self[i - 1].hash`. Blocks are never removed or
/// modified after being appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// Name credited with minting the genesis block.
    pub const GENESIS_MINTER: &'static str = "Web3 Impact Hub";

    /// Creates a chain holding only the genesis block.
    pub fn new(timestamp: Timestamp) -> Self {
        let genesis = Block {
            index: 0,
            hash: BlockHash::genesis(),
            previous_hash: BlockHash::zero(),
            timestamp,
            minted_by: None,
            minted_by_name: Self::GENESIS_MINTER.into(),
            consensus: ConsensusMode::Pow,
            difficulty: 1,
            transactions: vec![
                "Genesis allocation: tokens for study programmes".into(),
                "Education budget for the research lab".into(),
            ],
            insight: "The genesis block holds the starting state of your \
                      network."
                .into(),
            election: None,
        };

        Chain { blocks: vec![genesis] }
    }

    /// Appends a new block on top of the current tip, filling in its index
    /// and parent hash. Returns a reference to the new block.
    pub fn extend(&mut self, draft: BlockDraft) -> &Block {
        let previous_hash = self
            .tip()
            .map(|b| b.hash.clone())
            .unwrap_or_else(BlockHash::zero);

        let BlockDraft {
            hash,
            timestamp,
            minted_by,
            minted_by_name,
            consensus,
            difficulty,
            transactions,
            insight,
            election,
        } = draft;

        let index = self.blocks.len();
        self.blocks.push(Block {
            index: index as u64,
            hash,
            previous_hash,
            timestamp,
            minted_by,
            minted_by_name,
            consensus,
            difficulty,
            transactions,
            insight,
            election,
        });

        &self.blocks[index]
    }

    /// Returns the most recently appended block.
    #[inline]
    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Returns true if every block points at its predecessor's hash.
    pub fn is_linked(&self) -> bool {
        self.blocks
            .windows(2)
            .all(|pair| pair[1].previous_hash == pair[0].hash)
    }
}

impl Index<usize> for Chain {
    type Output = Block;

    fn index(&self, index: usize) -> &Self::Output {
        self.blocks.index(index)
    }
}
