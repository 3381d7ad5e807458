use crate::track::{ParticleKind, Track};

const INITIAL_CAPACITY: usize = 16;

/// LIFO store of the tracks still to be simulated in the current event.
///
/// Slots are recycled: `top` is the index of the last live slot and the
/// backing store only grows, doubling whenever it is exhausted.
#[derive(Debug, Clone)]
pub struct TrackStack {
    tracks: Vec<Track>,
    top: Option<usize>,
    next_track_id: u32,
}

impl Default for TrackStack {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackStack {
    pub fn new() -> Self {
        Self {
            tracks: vec![Track::default(); INITIAL_CAPACITY],
            top: None,
            next_track_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.top.map_or(0, |top| top + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    pub fn capacity(&self) -> usize {
        self.tracks.len()
    }

    /// Pushes a fresh, reset slot and hands it out to be filled in.
    pub fn insert(&mut self) -> &mut Track {
        let top = self.top.map_or(0, |top| top + 1);
        if top == self.tracks.len() {
            let doubled = 2 * self.tracks.len();
            self.tracks.resize(doubled, Track::default());
        }
        self.top = Some(top);
        let slot = &mut self.tracks[top];
        slot.reset();
        slot
    }

    pub fn push(&mut self, track: &Track) {
        self.insert().copy_from(track);
    }

    /// Copies the top track into `track` and pops it. Returns the popped
    /// slot index, `None` (leaving `track` untouched) when empty.
    pub fn pop_into(&mut self, track: &mut Track) -> Option<usize> {
        let top = self.top?;
        track.copy_from(&self.tracks[top]);
        self.top = top.checked_sub(1);
        Some(top)
    }

    /// Species of the track that would be popped next.
    pub fn type_of_next_track(&self) -> Option<ParticleKind> {
        self.top.map(|top| self.tracks[top].kind())
    }

    pub fn clear(&mut self) {
        self.top = None;
    }

    pub fn reset_track_id(&mut self) {
        self.next_track_id = 0;
    }

    pub fn next_track_id(&mut self) -> u32 {
        let id = self.next_track_id;
        self.next_track_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{UnitVector, Vector};

    fn track(i: u32) -> Track {
        let f = i as f64;
        let kind = match i % 3 {
            0 => ParticleKind::Gamma,
            1 => ParticleKind::Electron,
            _ => ParticleKind::Positron,
        };
        let mut t = Track::new(
            kind,
            1.0 + f,
            Vector::new(f, -f, 0.5 * f),
            UnitVector::normalize(Vector::new(1.0, f, -2.0)).unwrap(),
        );
        t.id = i;
        t.parent_id = i.checked_sub(1);
        t.mc_index = (i % 3) as usize;
        t.on_boundary = i % 2 == 0;
        t.safety = 0.125 * f;
        t
    }

    #[test]
    fn empty_stack() {
        let mut stack = TrackStack::new();
        let mut t = track(5);
        assert!(stack.is_empty());
        assert_eq!(stack.type_of_next_track(), None);
        assert_eq!(stack.pop_into(&mut t), None);
        assert_eq!(t, track(5));
    }

    #[test]
    fn lifo_order_preserves_every_field() {
        let n = 100u32;
        let mut stack = TrackStack::new();
        for i in 0..n {
            stack.push(&track(i));
        }
        assert_eq!(stack.len(), n as usize);
        assert!(stack.capacity() >= n as usize);
        assert_eq!(stack.capacity(), 128);
        let mut t = Track::default();
        for i in (0..n).rev() {
            assert_eq!(stack.type_of_next_track(), Some(track(i).kind()));
            assert_eq!(stack.pop_into(&mut t), Some(i as usize));
            assert_eq!(t, track(i));
        }
        assert!(stack.is_empty());
    }

    #[test]
    fn insert_hands_out_reset_slot() {
        let mut stack = TrackStack::new();
        stack.push(&track(4));
        let mut t = Track::default();
        stack.pop_into(&mut t);
        let slot = stack.insert();
        assert_eq!(*slot, Track::default());
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn track_ids_restart_per_event() {
        let mut stack = TrackStack::new();
        assert_eq!(stack.next_track_id(), 0);
        assert_eq!(stack.next_track_id(), 1);
        assert_eq!(stack.next_track_id(), 2);
        stack.reset_track_id();
        assert_eq!(stack.next_track_id(), 0);
    }
}
