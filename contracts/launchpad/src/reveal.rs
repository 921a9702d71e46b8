use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Storage, Timestamp};
use cw_storage_plus::Bound;

use crate::error::{new_generic_error, ContractError};
use crate::intervals::IntervalSet;
use crate::state::BATCH_STATES;

/// Where the per-batch randomness comes from.
#[cw_serde]
pub enum RandomnessSource {
    /// Derived from block metadata at reveal time. Cheap, but predictable by block producers.
    Block,
    /// Requested from an oracle contract, which delivers it later through `ReceiveRandomness`.
    Oracle { address: Addr },
}

/// Randomness request sent to the oracle that has not been answered yet.
#[cw_serde]
pub struct PendingReveal {
    pub batch: u64,
    pub job_id: String,
}

/// Reveal state of a single batch. Batches without a stored state are `Unrevealed`.
#[cw_serde]
pub enum BatchState {
    Unrevealed,
    Revealed { seed: u64 },
}

pub fn batch_state(storage: &dyn Storage, batch: u64) -> Result<BatchState, ContractError> {
    Ok(BATCH_STATES
        .may_load(storage, batch)?
        .unwrap_or(BatchState::Unrevealed))
}

#[cw_serde]
pub struct RevealLedger {
    pub collection_size: u64,
    pub batch_size: u64,
    // seconds
    pub reveal_start: u64,
    // seconds between two consecutive batches becoming revealable
    pub reveal_interval: u64,
    pub randomness_source: RandomnessSource,
    pub last_revealed: u64,
    pub pending: Option<PendingReveal>,
}

impl RevealLedger {
    pub fn new(
        collection_size: u64,
        batch_size: u64,
        reveal_start: u64,
        reveal_interval: u64,
        randomness_source: RandomnessSource,
    ) -> Result<Self, ContractError> {
        if batch_size == 0 || collection_size % batch_size != 0 {
            return Err(ContractError::InvalidBatchSize {
                batch_size,
                collection_size,
            });
        }

        Ok(Self {
            collection_size,
            batch_size,
            reveal_start,
            reveal_interval,
            randomness_source,
            last_revealed: 0,
            pending: None,
        })
    }

    /// Batch number the next reveal applies to.
    pub fn next_batch(&self) -> u64 {
        self.last_revealed / self.batch_size
    }

    pub fn is_complete(&self) -> bool {
        self.last_revealed >= self.collection_size
    }

    /// Earliest time at which the next batch may be revealed.
    pub fn next_reveal_time(&self) -> u64 {
        self.reveal_start
            .saturating_add(self.next_batch().saturating_mul(self.reveal_interval))
    }

    /// Checks whether the next batch can be revealed, given the amount of items minted so far.
    pub fn ensure_next_ready(&self, minted: u64, now: Timestamp) -> Result<(), ContractError> {
        self.ensure_revealable()?;

        if minted < self.last_revealed + self.batch_size {
            return Err(ContractError::RevealNotReady {
                reason: format!(
                    "minted supply {} has not reached {}",
                    minted,
                    self.last_revealed + self.batch_size
                ),
            });
        }

        if now.seconds() < self.next_reveal_time() {
            return Err(ContractError::RevealNotReady {
                reason: format!("next batch is revealable at {}", self.next_reveal_time()),
            });
        }

        Ok(())
    }

    /// Conditions that even a forced reveal cannot bypass.
    pub fn ensure_revealable(&self) -> Result<(), ContractError> {
        if self.is_complete() {
            return Err(ContractError::RevealNotReady {
                reason: "all batches are revealed".to_string(),
            });
        }
        if self.pending.is_some() {
            return Err(ContractError::RevealPending {});
        }

        Ok(())
    }

    pub fn has_next(&self, minted: u64, now: Timestamp) -> bool {
        self.ensure_next_ready(minted, now).is_ok()
    }

    /// Reduces raw randomness to the seed of `batch`. The modulus shrinks with every batch, so
    /// the reduction is slightly biased towards small seeds; the bias is accepted.
    pub fn seed_from_randomness(&self, batch: u64, randomness: u128) -> u64 {
        let free = self.collection_size - batch * self.batch_size;
        (randomness % u128::from(free)) as u64
    }

    /// Fixes the seed of the next batch and advances `last_revealed`. A batch seed can be set
    /// exactly once.
    pub fn set_seed(
        &mut self,
        storage: &mut dyn Storage,
        batch: u64,
        randomness: u128,
    ) -> Result<u64, ContractError> {
        if let BatchState::Revealed { .. } = batch_state(storage, batch)? {
            return Err(ContractError::SeedAlreadySet { batch });
        }
        if batch != self.next_batch() || self.is_complete() {
            return Err(new_generic_error(format!(
                "batch {} cannot be revealed before batch {}",
                batch,
                self.next_batch()
            )));
        }

        let seed = self.seed_from_randomness(batch, randomness);
        BATCH_STATES.save(storage, batch, &BatchState::Revealed { seed })?;
        self.last_revealed += self.batch_size;
        self.pending = None;

        Ok(seed)
    }

    /// Seeds of all revealed batches, in batch order.
    pub fn load_seeds(&self, storage: &dyn Storage, up_to: u64) -> Result<Vec<u64>, ContractError> {
        BATCH_STATES
            .range(
                storage,
                None,
                Some(Bound::inclusive(up_to)),
                cosmwasm_std::Order::Ascending,
            )
            .filter_map(|item| match item {
                Ok((_, BatchState::Revealed { seed })) => Some(Ok(seed)),
                Ok((_, BatchState::Unrevealed)) => None,
                Err(err) => Some(Err(ContractError::from(err))),
            })
            .collect()
    }

    /// Metadata index of `item_id`, or `None` while its batch is not revealed.
    pub fn metadata_index(
        &self,
        storage: &dyn Storage,
        item_id: u64,
    ) -> Result<Option<u64>, ContractError> {
        if item_id >= self.last_revealed {
            return Ok(None);
        }

        let batch = item_id / self.batch_size;
        let seeds = self.load_seeds(storage, batch)?;

        Ok(shuffled_index(
            self.collection_size,
            self.batch_size,
            &seeds,
            item_id,
        ))
    }
}

/// Computes the metadata index of `item_id` from the seeds of batches `0..=item_id / batch_size`.
///
/// Every earlier batch claimed `batch_size` consecutive free indices, starting with the
/// `seed`-th free one. Replaying those claims rebuilds the reserved intervals; the item then
/// takes the free index at `item_id % batch_size + seed` of its own batch. Cost is linear in
/// the number of replayed batches times the number of live intervals.
pub fn shuffled_index(
    collection_size: u64,
    batch_size: u64,
    seeds: &[u64],
    item_id: u64,
) -> Option<u64> {
    let batch = (item_id / batch_size) as usize;
    let seed = *seeds.get(batch)?;

    let mut reserved = IntervalSet::new(collection_size);
    for earlier_seed in &seeds[..batch] {
        reserved.claim(*earlier_seed, batch_size);
    }

    Some(reserved.locate_free(item_id % batch_size + seed))
}
