use std::time::Instant;

use crate::error::Result;
use crate::physics::{PhysicsEngine, TrackContext};
use crate::random::PRng;
use crate::results::Results;
use crate::sources::Source;
use crate::stepping::SteppingLoop;
use crate::track_stack::TrackStack;

/// Counters of one processed event.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct EventStats {
    pub tracks: u32,
    pub steps: u64,
    pub pushes: u64,
}

/// Runs events one after the other: one primary per event, then every
/// secondary it spawns, popped from the stack until it drains.
pub struct EventLoop<'a, P: ?Sized, S: ?Sized> {
    stepper: SteppingLoop<'a, P>,
    source: &'a S,
    stack: TrackStack,
    ctx: TrackContext,
    verbosity: u8,
}

impl<'a, P: PhysicsEngine + ?Sized, S: Source + ?Sized> EventLoop<'a, P, S> {
    pub fn new(stepper: SteppingLoop<'a, P>, source: &'a S, rng: PRng) -> Self {
        Self {
            stepper,
            source,
            stack: TrackStack::new(),
            ctx: TrackContext::new(rng),
            verbosity: 0,
        }
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn stack(&self) -> &TrackStack {
        &self.stack
    }

    pub fn process_event(&mut self, results: &mut Results) -> Result<EventStats> {
        let mut stats = EventStats::default();
        results.begin_event();
        self.stack.clear();
        self.stack.reset_track_id();

        let id = self.stack.next_track_id();
        let calo_start_x = self.stepper.geometry().calo_start_x();
        let primary = self.stack.insert();
        self.source.generate_one(primary);
        primary.id = id;
        primary.parent_id = None;
        primary.position.x = calo_start_x;

        loop {
            self.ctx.reset_for_tracking();
            if self.stack.pop_into(&mut self.ctx.track).is_none() {
                break;
            }
            if !self.ctx.track.is_primary() {
                results.count_secondary(self.ctx.track.kind());
            }
            let history = self.stepper.track(&mut self.ctx, &mut self.stack, results)?;
            log::trace!(
                "track {} ({}): {} steps, {} pushes, {:?}",
                self.ctx.track.id,
                self.ctx.track.kind(),
                history.steps,
                history.pushes,
                history.fate
            );
            stats.tracks += 1;
            stats.steps += u64::from(history.steps);
            stats.pushes += u64::from(history.pushes);
        }

        results.end_event();
        Ok(stats)
    }

    pub fn process_events(&mut self, num_events: usize, results: &mut Results) -> Result<EventStats> {
        let report_every = (num_events / 10).max(1);
        let start = Instant::now();
        let mut total = EventStats::default();
        for event in 0..num_events {
            if self.verbosity > 0 && event % report_every == 0 {
                log::info!("event {} of {} ({:.2?})", event, num_events, start.elapsed());
            }
            let stats = self.process_event(results)?;
            log::debug!(
                "event {}: {} tracks, {} steps, {} pushes",
                event,
                stats.tracks,
                stats.steps,
                stats.pushes
            );
            total.tracks += stats.tracks;
            total.steps += stats.steps;
            total.pushes += stats.pushes;
        }
        if self.verbosity > 0 {
            log::info!(
                "processed {} events ({} tracks, {} steps) in {:.2?}",
                num_events,
                total.tracks,
                total.steps,
                start.elapsed()
            );
        }
        Ok(total)
    }
}
