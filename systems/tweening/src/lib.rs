#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timing-only tween service.
//!
//! Interpolation belongs to whichever frontend renders the yard; this system
//! only tracks how long each request takes and hands its continuation back to
//! the world once it finishes.

use std::{collections::BTreeMap, time::Duration};

use outpost_core::{Command, Continuation, Event, TweenId};

#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingTween {
    remaining: Duration,
    continuation: Continuation,
}

/// Tracks in-flight tweens that carry continuations.
#[derive(Debug, Default)]
pub struct Tweening {
    pending: BTreeMap<TweenId, PendingTween>,
    finished: Vec<TweenId>,
}

impl Tweening {
    /// Creates a tween service without pending requests.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests still waiting to resolve a continuation.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Registers requests and advances pending ones in event order, emitting
    /// `Command::Resume` for every continuation whose tween finished.
    ///
    /// Requests seen after a `TimeAdvanced` event only start counting on the
    /// next one. Resumes are ordered by tween identifier.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    for tween in self.pending.values_mut() {
                        tween.remaining = tween.remaining.saturating_sub(*dt);
                    }
                }
                Event::TweenRequested { request } => {
                    if let Some(continuation) = request.on_complete {
                        let _ = self.pending.insert(
                            request.id,
                            PendingTween {
                                remaining: request.total(),
                                continuation,
                            },
                        );
                    }
                }
                _ => {}
            }
        }

        self.finished.clear();
        self.finished.extend(
            self.pending
                .iter()
                .filter(|(_, tween)| tween.remaining.is_zero())
                .map(|(id, _)| *id),
        );

        for id in &self.finished {
            if let Some(tween) = self.pending.remove(id) {
                out.push(Command::Resume {
                    continuation: tween.continuation,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use outpost_core::{Motion, PickupId, TurretId, TweenRequest, TweenSubject};

    fn request(id: u32, duration_ms: u64, continuation: Option<Continuation>) -> Event {
        let base = TweenRequest::new(
            TweenId::new(id),
            TweenSubject::Turret(TurretId::new(0)),
            Motion::Rotate { to: Quat::IDENTITY },
            Duration::from_millis(duration_ms),
        );
        let request = match continuation {
            Some(continuation) => base.then(continuation),
            None => base,
        };
        Event::TweenRequested { request }
    }

    fn advance(ms: u64) -> Event {
        Event::TimeAdvanced {
            dt: Duration::from_millis(ms),
        }
    }

    #[test]
    fn continuation_resolves_after_delay_and_duration() {
        let mut tweening = Tweening::new();
        let mut out = Vec::new();
        let delayed = TweenRequest::new(
            TweenId::new(0),
            TweenSubject::Pickup(PickupId::new(1)),
            Motion::LocalMove { to: Vec3::Y },
            Duration::from_millis(100),
        )
        .with_delay(Duration::from_millis(500))
        .then(Continuation::ReleasePlacement);

        tweening.handle(&[Event::TweenRequested { request: delayed }], &mut out);
        tweening.handle(&[advance(500)], &mut out);
        assert!(out.is_empty());

        tweening.handle(&[advance(100)], &mut out);
        assert_eq!(
            out,
            vec![Command::Resume {
                continuation: Continuation::ReleasePlacement
            }]
        );
        assert_eq!(tweening.pending(), 0);
    }

    #[test]
    fn requests_after_time_advanced_wait_for_next_tick() {
        let mut tweening = Tweening::new();
        let mut out = Vec::new();

        tweening.handle(
            &[
                advance(1_000),
                request(0, 250, Some(Continuation::ReleasePlacement)),
            ],
            &mut out,
        );
        assert!(out.is_empty());
        assert_eq!(tweening.pending(), 1);
    }

    #[test]
    fn requests_without_continuation_are_not_tracked() {
        let mut tweening = Tweening::new();
        let mut out = Vec::new();
        tweening.handle(&[request(0, 100, None)], &mut out);
        assert_eq!(tweening.pending(), 0);
    }

    #[test]
    fn simultaneous_completions_resume_in_identifier_order() {
        let mut tweening = Tweening::new();
        let mut out = Vec::new();
        let stow = Continuation::StowPickup {
            pickup: PickupId::new(4),
        };

        tweening.handle(
            &[
                request(7, 300, Some(Continuation::ReleasePlacement)),
                request(3, 200, Some(stow)),
            ],
            &mut out,
        );
        tweening.handle(&[advance(300)], &mut out);

        assert_eq!(
            out,
            vec![
                Command::Resume { continuation: stow },
                Command::Resume {
                    continuation: Continuation::ReleasePlacement
                },
            ]
        );
    }
}
