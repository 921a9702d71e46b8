use std::fmt;

use cosmwasm_schema::cw_serde;

use crate::error::ContractError;

/// Sale phases, in the only order in which they can occur.
#[cw_serde]
#[derive(Copy, Eq, PartialOrd, Ord)]
pub enum Phase {
    NotStarted,
    Auction,
    PreCommit,
    Allowlist,
    PublicSale,
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::NotStarted => "not_started",
            Phase::Auction => "auction",
            Phase::PreCommit => "pre_commit",
            Phase::Allowlist => "allowlist",
            Phase::PublicSale => "public_sale",
            Phase::Ended => "ended",
        };
        write!(f, "{}", name)
    }
}

/// Start times (in seconds) of the sale phases. Phases that are not configured are skipped.
#[cw_serde]
pub struct SaleSchedule {
    pub auction_start: Option<u64>,
    pub pre_commit_start: Option<u64>,
    pub allowlist_start: Option<u64>,
    pub public_sale_start: u64,
    pub public_sale_end: Option<u64>,
}

impl SaleSchedule {
    /// Configured boundaries in phase order, each paired with the phase it opens.
    pub fn boundaries(&self) -> Vec<(Phase, u64)> {
        [
            (Phase::Auction, self.auction_start),
            (Phase::PreCommit, self.pre_commit_start),
            (Phase::Allowlist, self.allowlist_start),
            (Phase::PublicSale, Some(self.public_sale_start)),
            (Phase::Ended, self.public_sale_end),
        ]
        .into_iter()
        .filter_map(|(phase, start)| start.map(|start| (phase, start)))
        .collect()
    }

    pub fn validate(&self) -> Result<(), ContractError> {
        let boundaries = self.boundaries();

        if boundaries.iter().any(|(_, start)| *start == 0) {
            return Err(ContractError::InvalidSchedule {
                reason: "phase start times must be non-zero".to_string(),
            });
        }

        for pair in boundaries.windows(2) {
            let ((prev_phase, prev), (next_phase, next)) = (pair[0], pair[1]);
            if next <= prev {
                return Err(ContractError::InvalidSchedule {
                    reason: format!(
                        "{} must start after {} ({} <= {})",
                        next_phase, prev_phase, next, prev
                    ),
                });
            }
        }

        Ok(())
    }

    /// Time at which the sale leaves `NotStarted`.
    pub fn first_boundary(&self) -> u64 {
        self.boundaries()
            .first()
            .map(|(_, start)| *start)
            .unwrap_or(self.public_sale_start)
    }

    pub fn start_of(&self, phase: Phase) -> Option<u64> {
        self.boundaries()
            .into_iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, start)| start)
    }

    /// Returns a copy with the start of `phase` moved to `start`.
    pub fn with_start(&self, phase: Phase, start: u64) -> Result<SaleSchedule, ContractError> {
        let mut updated = self.clone();
        let slot = match phase {
            Phase::Auction => &mut updated.auction_start,
            Phase::PreCommit => &mut updated.pre_commit_start,
            Phase::Allowlist => &mut updated.allowlist_start,
            Phase::Ended => &mut updated.public_sale_end,
            Phase::PublicSale => {
                updated.public_sale_start = start;
                return Ok(updated);
            }
            Phase::NotStarted => {
                return Err(ContractError::InvalidSchedule {
                    reason: "not_started has no start time".to_string(),
                })
            }
        };

        if slot.is_none() {
            return Err(ContractError::InvalidSchedule {
                reason: format!("{} is not part of the schedule", phase),
            });
        }
        *slot = Some(start);

        Ok(updated)
    }
}

/// Current phase at time `now` (seconds). Once the sale started, exhausting the supply ends it.
pub fn phase_at(schedule: &SaleSchedule, now: u64, supply_exhausted: bool) -> Phase {
    let current = schedule
        .boundaries()
        .into_iter()
        .take_while(|(_, start)| *start <= now)
        .last()
        .map(|(phase, _)| phase)
        .unwrap_or(Phase::NotStarted);

    if current != Phase::NotStarted && supply_exhausted {
        return Phase::Ended;
    }

    current
}
