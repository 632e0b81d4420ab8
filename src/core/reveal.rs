//! Word-by-word reveal of a complete answer.
//!
//! The backend returns an answer in one response. The reveal replays it as
//! a sequence of scheduled steps so the transcript fills in the way a token
//! stream would. Each sequence is keyed by a reveal id and owns a
//! cancellation token, so a session switch stops it outright instead of
//! relying on late steps being ignored.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::session::SessionId;

/// Split an answer into reveal units. Joining the units with a single space
/// reproduces the answer exactly.
pub fn split_words(answer: &str) -> Vec<String> {
    answer.split(' ').map(str::to_owned).collect()
}

#[derive(Debug, Clone)]
pub struct RevealPlan {
    pub reveal_id: u64,
    pub session_id: SessionId,
    pub word_count: usize,
    pub delay: Duration,
    pub cancel_token: CancellationToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealEvent {
    /// `shown` words of the answer are now visible.
    Step { reveal_id: u64, shown: usize },
    /// Every word has been shown.
    Finished { reveal_id: u64 },
}

#[derive(Clone)]
pub struct RevealService {
    tx: mpsc::UnboundedSender<RevealEvent>,
}

impl RevealService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RevealEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_reveal(&self, plan: RevealPlan) {
        let tx = self.tx.clone();
        // Deadlines are absolute from scheduling time so a slow step never
        // pushes later ones back.
        let start = Instant::now();
        tokio::spawn(async move {
            let RevealPlan {
                reveal_id,
                word_count,
                delay,
                cancel_token,
                ..
            } = plan;

            for shown in 1..=word_count {
                let steps = u32::try_from(shown).unwrap_or(u32::MAX);
                let deadline = start + delay.saturating_mul(steps);
                tokio::select! {
                    _ = cancel_token.cancelled() => return,
                    _ = tokio::time::sleep_until(deadline) => {}
                }
                if tx.send(RevealEvent::Step { reveal_id, shown }).is_err() {
                    return;
                }
            }

            if !cancel_token.is_cancelled() {
                let _ = tx.send(RevealEvent::Finished { reveal_id });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::UnboundedReceiver<RevealEvent>) -> Vec<RevealEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn plan(word_count: usize, delay: Duration) -> RevealPlan {
        RevealPlan {
            reveal_id: 7,
            session_id: SessionId::from("s1"),
            word_count,
            delay,
            cancel_token: CancellationToken::new(),
        }
    }

    #[test]
    fn split_words_round_trips_spacing() {
        let answer = "The conclusion  is\nX.";
        let words = split_words(answer);
        assert_eq!(words, vec!["The", "conclusion", "", "is\nX."]);
        assert_eq!(words.join(" "), answer);
    }

    #[tokio::test(start_paused = true)]
    async fn steps_fire_on_multiples_of_the_delay() {
        let delay = Duration::from_millis(40);
        let (service, mut rx) = RevealService::new();
        service.spawn_reveal(plan(3, delay));

        tokio::time::advance(delay * 2 + Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(
            drain(&mut rx),
            vec![
                RevealEvent::Step {
                    reveal_id: 7,
                    shown: 1
                },
                RevealEvent::Step {
                    reveal_id: 7,
                    shown: 2
                },
            ]
        );

        tokio::time::advance(delay).await;
        settle().await;
        assert_eq!(
            drain(&mut rx),
            vec![
                RevealEvent::Step {
                    reveal_id: 7,
                    shown: 3
                },
                RevealEvent::Finished { reveal_id: 7 },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_reveal_stops_emitting() {
        let delay = Duration::from_millis(40);
        let (service, mut rx) = RevealService::new();
        let plan = plan(3, delay);
        let token = plan.cancel_token.clone();
        service.spawn_reveal(plan);

        tokio::time::advance(delay + Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(drain(&mut rx).len(), 1);

        token.cancel();
        tokio::time::advance(delay * 5).await;
        settle().await;
        assert!(drain(&mut rx).is_empty());
    }
}
