//! In-memory transcript database with per-chromosome interval trees.

use std::sync::Arc;

use bio::data_structures::interval_tree::ArrayBackedIntervalTree;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::reference::genome::GenomeInterval;
use crate::reference::transcript::TranscriptModel;

type IntervalTree = ArrayBackedIntervalTree<i32, u32>;

/// Interval trees over the transcription regions, one per chromosome.
#[derive(Debug)]
pub struct TxIntervalTrees {
    /// Mapping from chromosome number to index in `trees`.
    chrom_to_idx: FxHashMap<u32, usize>,
    /// Interval tree to index in `TranscriptDb::transcripts`, for each chromosome.
    trees: Vec<IntervalTree>,
}

impl TxIntervalTrees {
    fn new(transcripts: &[Arc<TranscriptModel>]) -> Self {
        let mut chrom_to_idx = FxHashMap::default();
        let mut trees: Vec<IntervalTree> = Vec::new();

        for (tx_idx, tx) in transcripts.iter().enumerate() {
            let tree_idx = *chrom_to_idx.entry(tx.chrom).or_insert(trees.len());
            if tree_idx >= trees.len() {
                trees.push(IntervalTree::new());
            }
            trees[tree_idx].insert(tx.tx_region.begin..tx.tx_region.end, tx_idx as u32);
        }
        trees.iter_mut().for_each(|t| t.index());

        Self {
            chrom_to_idx,
            trees,
        }
    }

    /// Whether any transcript lies on `chrom`.
    pub fn has_chrom(&self, chrom: u32) -> bool {
        self.chrom_to_idx.contains_key(&chrom)
    }

    /// Indices of the transcripts overlapping `iv`, sorted.
    pub fn find(&self, iv: &GenomeInterval) -> Vec<u32> {
        let Some(tree_idx) = self.chrom_to_idx.get(&iv.chrom) else {
            return Vec::new();
        };
        // Empty intervals (insertions) are queried as the position before them.
        let query = if iv.is_empty() {
            iv.begin - 1..iv.begin + 1
        } else {
            iv.begin..iv.end
        };
        let mut result = self.trees[*tree_idx]
            .find(query)
            .iter()
            .map(|entry| *entry.data())
            .collect::<Vec<_>>();
        result.sort_unstable();
        result
    }
}

/// Transcript models indexed by identifier and genome position.
#[derive(Debug)]
pub struct TranscriptDb {
    /// All transcripts in load order.
    transcripts: Vec<Arc<TranscriptModel>>,
    /// Mapping from transcript identifier to index in `transcripts`.
    tx_map: IndexMap<String, usize>,
    /// Interval trees for the transcripts.
    tx_trees: TxIntervalTrees,
}

impl TranscriptDb {
    /// Construct from transcript models; for duplicate identifiers the first model is kept.
    pub fn new(transcripts: Vec<TranscriptModel>) -> Self {
        let mut tx_map = IndexMap::new();
        let mut kept = Vec::with_capacity(transcripts.len());
        for tx in transcripts {
            if tx_map.contains_key(&tx.id) {
                tracing::warn!("duplicate transcript {}, keeping the first", &tx.id);
                continue;
            }
            tx_map.insert(tx.id.clone(), kept.len());
            kept.push(Arc::new(tx));
        }
        let tx_trees = TxIntervalTrees::new(&kept);
        tracing::debug!("indexed {} transcripts", kept.len());

        Self {
            transcripts: kept,
            tx_map,
            tx_trees,
        }
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    /// Transcript with the given identifier.
    pub fn get(&self, tx_id: &str) -> Option<&Arc<TranscriptModel>> {
        self.tx_map.get(tx_id).map(|idx| &self.transcripts[*idx])
    }

    pub fn transcripts(&self) -> impl Iterator<Item = &Arc<TranscriptModel>> {
        self.transcripts.iter()
    }

    pub fn has_chrom(&self, chrom: u32) -> bool {
        self.tx_trees.has_chrom(chrom)
    }

    /// Transcripts whose transcription region extended by `padding` on both sides overlaps
    /// `iv`, in load order.
    pub fn find_overlapping(
        &self,
        iv: &GenomeInterval,
        padding: i32,
    ) -> Vec<&Arc<TranscriptModel>> {
        let query = GenomeInterval::new(iv.chrom, iv.begin - padding, iv.end + padding);
        self.tx_trees
            .find(&query)
            .into_iter()
            .map(|idx| &self.transcripts[idx as usize])
            .collect()
    }
}
