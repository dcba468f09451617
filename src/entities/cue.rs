//! Cue: one timed caption interval, and the track that owns the cues.

use anyhow::{bail, Result};
use log::debug;
use serde::{Deserialize, Serialize};

/// Minimum cue duration in seconds; a timing update may never collapse a
/// cue below this.
pub const MIN_CUE_SECS: f64 = 0.001;

/// One caption interval. Invariant: `start < end` (seconds).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Cue {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Result<Self> {
        if !(start < end) {
            bail!("invalid cue interval: start {} >= end {}", start, end);
        }
        Ok(Self {
            start,
            end,
            text: text.into(),
        })
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }
}

/// Timing delta committed for one cue at the end of a drag gesture,
/// in seconds. A whole-cue move carries equal deltas (duration preserved);
/// an edge handle would carry only one of them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CueTimingDelta {
    pub start_delta: f64,
    pub end_delta: f64,
}

impl CueTimingDelta {
    /// Duration-preserving move by `delta` seconds.
    pub fn shift(delta: f64) -> Self {
        Self {
            start_delta: delta,
            end_delta: delta,
        }
    }
}

/// Ordered sequence of cues. Cues are addressed by index; ordering and
/// overlap between neighbours is the caller's business, not enforced here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CueTrack {
    cues: Vec<Cue>,
}

impl CueTrack {
    pub fn new(cues: Vec<Cue>) -> Self {
        Self { cues }
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Cue> {
        self.cues.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cue> {
        self.cues.iter()
    }

    pub fn push(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    /// End time of the last-ending cue, or 0 for an empty track.
    pub fn duration(&self) -> f64 {
        self.cues.iter().map(|c| c.end).fold(0.0, f64::max)
    }

    /// Index of the cue under `time`, if any (first match wins).
    pub fn active_cue_at(&self, time: f64) -> Option<usize> {
        self.cues.iter().position(|c| c.contains(time))
    }

    /// Apply a committed timing delta to the addressed cue.
    ///
    /// Clamping policy (this store owns it, not the interaction layer):
    /// after applying the deltas the cue is shifted right just enough to
    /// keep `start >= 0`, preserving the committed duration. A delta that
    /// would leave `start >= end` is rejected. Overlap with neighbouring
    /// cues is allowed.
    pub fn apply_timing_delta(&mut self, index: usize, delta: CueTimingDelta) -> Result<()> {
        let Some(cue) = self.cues.get_mut(index) else {
            bail!("cue index {} out of range ({} cues)", index, self.cues.len());
        };
        let mut start = cue.start + delta.start_delta;
        let mut end = cue.end + delta.end_delta;
        if end - start < MIN_CUE_SECS {
            bail!(
                "timing delta would collapse cue {}: {:.3}..{:.3}",
                index,
                start,
                end
            );
        }
        if start < 0.0 {
            end -= start;
            start = 0.0;
        }
        debug!(
            "cue {} retimed: {:.3}..{:.3} -> {:.3}..{:.3}",
            index, cue.start, cue.end, start, end
        );
        cue.start = start;
        cue.end = end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> CueTrack {
        CueTrack::new(vec![
            Cue::new(1.0, 2.5, "first").unwrap(),
            Cue::new(3.0, 5.0, "second").unwrap(),
        ])
    }

    #[test]
    fn test_cue_rejects_inverted_interval() {
        assert!(Cue::new(2.0, 1.0, "x").is_err());
        assert!(Cue::new(1.0, 1.0, "x").is_err());
    }

    #[test]
    fn test_symmetric_delta_preserves_duration() {
        let mut track = track();
        track
            .apply_timing_delta(1, CueTimingDelta::shift(0.75))
            .unwrap();
        let cue = track.get(1).unwrap();
        assert_eq!(cue.start, 3.75);
        assert_eq!(cue.end, 5.75);
        assert_eq!(cue.duration(), 2.0);
    }

    #[test]
    fn test_zero_delta_is_a_no_op() {
        let mut track = track();
        let before = track.clone();
        track
            .apply_timing_delta(0, CueTimingDelta::shift(0.0))
            .unwrap();
        assert_eq!(track, before);
    }

    #[test]
    fn test_shift_clamped_at_time_zero() {
        let mut track = track();
        track
            .apply_timing_delta(0, CueTimingDelta::shift(-10.0))
            .unwrap();
        let cue = track.get(0).unwrap();
        assert_eq!(cue.start, 0.0);
        assert_eq!(cue.duration(), 1.5);
    }

    #[test]
    fn test_collapsing_delta_rejected() {
        let mut track = track();
        let delta = CueTimingDelta {
            start_delta: 0.0,
            end_delta: -1.6,
        };
        assert!(track.apply_timing_delta(0, delta).is_err());
        // Cue untouched after a rejected commit.
        assert_eq!(track.get(0).unwrap().start, 1.0);
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let mut track = track();
        assert!(track.apply_timing_delta(7, CueTimingDelta::shift(0.1)).is_err());
    }

    #[test]
    fn test_active_cue_lookup() {
        let track = track();
        assert_eq!(track.active_cue_at(1.5), Some(0));
        assert_eq!(track.active_cue_at(2.7), None);
        assert_eq!(track.active_cue_at(3.0), Some(1));
        // End is exclusive.
        assert_eq!(track.active_cue_at(5.0), None);
    }

    #[test]
    fn test_track_duration() {
        assert_eq!(track().duration(), 5.0);
        assert_eq!(CueTrack::default().duration(), 0.0);
    }
}
