//! Pairing engine
//!
//! Splits the frozen roster into disjoint mutual pairs and tells each side
//! who the other is. The pairs exist only for the duration of [`PairingEngine::run`];
//! the notifications are the only record of them.

use crate::messages;
use crate::runtime::{MessageOptions, Notifier};
use crate::store::ParticipantId;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// A registered identity with its snapshotted registration name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub participant: ParticipantId,
    pub name: String,
}

/// Unordered pair; each side learns the other's name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub first: RosterEntry,
    pub second: RosterEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error("cannot pair an odd number of participants ({count})")]
    OddCount { count: usize },
}

/// Uniformly shuffle the roster and pair consecutive entries
pub fn draw_pairs<R: Rng + ?Sized>(
    roster: &[RosterEntry],
    rng: &mut R,
) -> Result<Vec<Pair>, PairingError> {
    if roster.len() % 2 != 0 {
        return Err(PairingError::OddCount {
            count: roster.len(),
        });
    }

    let mut shuffled = roster.to_vec();
    shuffled.shuffle(rng);

    let mut pairs = Vec::with_capacity(shuffled.len() / 2);
    let mut entries = shuffled.into_iter();
    while let (Some(first), Some(second)) = (entries.next(), entries.next()) {
        pairs.push(Pair { first, second });
    }
    Ok(pairs)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaffleOutcome {
    Paired { pairs: usize },
    Unpairable { count: usize },
}

/// What happened during one raffle cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaffleReport {
    pub outcome: RaffleOutcome,
    pub delivered: usize,
    pub failed: Vec<ParticipantId>,
}

/// Runs the raffle once the registry is full
#[derive(Debug, Clone, Default)]
pub struct PairingEngine {
    /// Operator chat that receives a summary (never the pairs)
    operator: Option<ParticipantId>,
}

impl PairingEngine {
    pub fn new(operator: Option<ParticipantId>) -> Self {
        Self { operator }
    }

    pub async fn run<N: Notifier + ?Sized>(
        &self,
        roster: &[RosterEntry],
        notifier: &N,
    ) -> RaffleReport {
        self.run_with_rng(roster, notifier, StdRng::from_entropy())
            .await
    }

    pub async fn run_with_rng<N: Notifier + ?Sized>(
        &self,
        roster: &[RosterEntry],
        notifier: &N,
        mut rng: StdRng,
    ) -> RaffleReport {
        let report = match draw_pairs(roster, &mut rng) {
            Ok(pairs) => {
                tracing::info!(participants = roster.len(), pairs = pairs.len(), "Raffle drawn");
                let mut report = RaffleReport {
                    outcome: RaffleOutcome::Paired { pairs: pairs.len() },
                    delivered: 0,
                    failed: Vec::new(),
                };
                for pair in &pairs {
                    deliver(notifier, &pair.first, &pair.second.name, &mut report).await;
                    deliver(notifier, &pair.second, &pair.first.name, &mut report).await;
                }
                report
            }
            Err(PairingError::OddCount { count }) => {
                tracing::warn!(count, "Registry full with an odd count, raffle not drawn");
                let mut report = RaffleReport {
                    outcome: RaffleOutcome::Unpairable { count },
                    delivered: 0,
                    failed: Vec::new(),
                };
                let text = messages::unpairable(count);
                for entry in roster {
                    send(notifier, entry.participant, &text, &MessageOptions::plain(), &mut report)
                        .await;
                }
                report
            }
        };

        self.notify_operator(notifier, &report).await;
        tracing::info!(
            delivered = report.delivered,
            failed = report.failed.len(),
            "Raffle finished"
        );
        report
    }

    async fn notify_operator<N: Notifier + ?Sized>(&self, notifier: &N, report: &RaffleReport) {
        let Some(operator) = self.operator else {
            return;
        };
        let text = match report.outcome {
            RaffleOutcome::Paired { pairs } => messages::operator_summary(pairs, report.failed.len()),
            RaffleOutcome::Unpairable { count } => messages::operator_unpairable(count),
        };
        if let Err(e) = notifier
            .send_message(operator, &text, &MessageOptions::plain())
            .await
        {
            tracing::warn!(operator = %operator, error = %e, "Failed to send raffle summary");
        }
    }
}

async fn deliver<N: Notifier + ?Sized>(
    notifier: &N,
    recipient: &RosterEntry,
    partner_name: &str,
    report: &mut RaffleReport,
) {
    let text = messages::pairing_result(partner_name);
    send(notifier, recipient.participant, &text, &MessageOptions::markdown(), report).await;
}

async fn send<N: Notifier + ?Sized>(
    notifier: &N,
    to: ParticipantId,
    text: &str,
    options: &MessageOptions,
    report: &mut RaffleReport,
) {
    match notifier.send_message(to, text, options).await {
        Ok(()) => report.delivered += 1,
        Err(e) => {
            tracing::error!(participant = %to, error = %e, "Raffle delivery failed");
            report.failed.push(to);
        }
    }
}
