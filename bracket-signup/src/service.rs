use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bracket::{read_state, slot_view, ProgressionGraph, ScoreTable, Slot, StateResponse};
use crate::error::{SignupError, SignupResult};
use crate::signup::{apply_claim, find_or_register, holds, plan_claim, ValidSignup};
use crate::store::{bands_range, rounds_range, scores_range, RangeStore, SCORES_FIRST_ROW};

/// Result of a signup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupOutcome {
    pub band: String,
    pub is_new: bool,
    /// `None` when the band only joined the waitlist
    pub claim: Option<ClaimReceipt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimReceipt {
    /// Cell the band's name was written to, e.g. `Scores!C5`
    pub range: String,
    pub date: String,
    pub time: String,
    /// Earlier claims that were vacated
    pub cleared: Vec<String>,
    /// The slot as it stands after the claim
    pub slot: Slot,
}

/// Signup and state operations over a range store. Holds no bracket state:
/// every call re-reads the store.
#[derive(Clone)]
pub struct SignupService {
    store: Arc<dyn RangeStore>,
    root_count: usize,
}

impl SignupService {
    pub fn new(store: Arc<dyn RangeStore>, root_count: usize) -> Self {
        SignupService { store, root_count }
    }

    /// Current bracket: first-round slots with their successor chains
    pub async fn bracket_state(&self) -> SignupResult<StateResponse> {
        let (rounds_range, scores_range) = (rounds_range(), scores_range());
        let (rounds, scores) = futures::try_join!(self.store.read(&rounds_range), self.store.read(&scores_range))?;
        let graph = ProgressionGraph::build(&rounds);
        debug!("progression graph has {} edges", graph.len());
        let table = ScoreTable::from_rows(&scores, SCORES_FIRST_ROW);
        let rounds = read_state(&table, &graph, self.root_count)?;
        Ok(StateResponse { rounds })
    }

    /// Registers the band if needed and, when a slot was requested, moves the
    /// band into it.
    ///
    /// The slot is validated before anything is written, so a rejected claim
    /// leaves both tables untouched. Just before committing, the target cell is
    /// re-read and the claim fails with `Conflict` if someone took it in the
    /// meantime. The new claim is written before earlier claims are cleared so a
    /// failed write never leaves the band without a slot.
    pub async fn signup(&self, signup: ValidSignup) -> SignupResult<SignupOutcome> {
        let ValidSignup { entrant, desired } = signup;

        let (scores_range, bands_range) = (scores_range(), bands_range());
        let (scores, bands) = futures::try_join!(self.store.read(&scores_range), self.store.read(&bands_range))?;
        let mut table = ScoreTable::from_rows(&scores, SCORES_FIRST_ROW);
        let registration = find_or_register(&entrant, &bands);

        let plan = match &desired {
            Some(desired) => {
                let plan = plan_claim(&registration.band_name, desired, &table)?;
                info!("FOUND {} at {}", desired.label(), plan.target_range);
                Some(plan)
            }
            None => None,
        };

        if registration.is_new {
            info!("ADDING {} ({}) at {}", entrant.name, entrant.email, registration.append_range());
            self.store
                .write(
                    &registration.append_range(),
                    vec![vec![entrant.name.clone(), entrant.email.clone(), entrant.phone.clone()]],
                )
                .await?;
        } else {
            info!("EXISTS: {} ({})", entrant.name, entrant.email);
        }

        let (Some(desired), Some(plan)) = (desired, plan) else {
            return Ok(SignupOutcome {
                band: registration.band_name,
                is_new: registration.is_new,
                claim: None,
            });
        };

        let current = self.store.read(&plan.target_range).await?;
        let taken = current.first().and_then(|row| row.first()).filter(|cell| !cell.is_empty());
        if let Some(taken) = taken.filter(|cell| !holds(Some(cell.as_str()), &registration.band_name)) {
            warn!("{} was taken by {taken} before {} could claim it", plan.target_range, entrant.name);
            return Err(SignupError::Conflict {
                cell: plan.target_range.to_string(),
            });
        }

        info!("CLAIMING {} for {}", plan.target_range, entrant.name);
        self.store
            .write(&plan.target_range, vec![vec![entrant.name.clone()]])
            .await?;

        let cleared: Vec<String> = plan.existing.iter().map(|(_, range)| range.to_string()).collect();
        if !cleared.is_empty() {
            info!("CLEARING {:?}", cleared);
            try_join_all(plan.existing.iter().map(|(_, range)| self.store.clear(range))).await?;
        }

        apply_claim(&mut table, &plan, &entrant.name);
        let slot = slot_view(&table.rows()[plan.target.index])?;

        Ok(SignupOutcome {
            band: registration.band_name,
            is_new: registration.is_new,
            claim: Some(ClaimReceipt {
                range: plan.target_range.to_string(),
                date: desired.date,
                time: desired.time,
                cleared,
                slot,
            }),
        })
    }
}
