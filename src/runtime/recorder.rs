use std::error::Error;
use std::mem;

use image::RgbImage;

use crate::capture::PollResult;
use crate::entry::{EntryKey, EntryMachine, EntryStep};
use crate::session::{
    DatasetStore, EntryParseError, SessionCounter, SessionId, parse_entries,
};

/// A session whose images are already on disk while its metadata is
/// still being entered.
#[derive(Debug)]
pub struct PendingSession {
    id: SessionId,
    frames: Vec<RgbImage>,
}

impl PendingSession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn frames(&self) -> &[RgbImage] {
        &self.frames
    }
}

#[derive(Debug)]
enum Mode {
    Live,
    Entering {
        machine: EntryMachine,
        session: PendingSession,
    },
}

/// What a capture trigger did.
#[derive(Debug, Eq, PartialEq)]
pub enum TriggerOutcome {
    /// Not in live mode, or the last sweep was incomplete.
    Ignored,
    /// Images are on disk; metadata entry has begun.
    Started(SessionId),
}

/// What an entry-mode key did.
#[derive(Debug, Eq, PartialEq)]
pub enum EntryOutcome {
    Pending,
    Saved(SessionId),
    /// The entries did not parse; the session keeps its images but never
    /// gets a metadata record, and its id is not reused.
    Discarded {
        id: SessionId,
        reason: EntryParseError,
    },
}

/// Session state for one recording run: owns the id counter and the
/// store, tracks whether the operator is live or entering metadata, and
/// holds the captured frame set until the entry finalizes.
#[derive(Debug)]
pub struct Recorder {
    counter: SessionCounter,
    store: DatasetStore,
    mode: Mode,
}

impl Recorder {
    pub fn new(counter: SessionCounter, store: DatasetStore) -> Self {
        Self {
            counter,
            store,
            mode: Mode::Live,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.mode, Mode::Live)
    }

    /// Id the next accepted trigger will use.
    pub fn next_session(&self) -> SessionId {
        self.counter.peek()
    }

    pub fn prompt(&self) -> Option<String> {
        match &self.mode {
            Mode::Live => None,
            Mode::Entering { machine, .. } => Some(machine.prompt()),
        }
    }

    /// Frame set held for the session currently being labeled.
    pub fn held_frames(&self) -> Option<&[RgbImage]> {
        match &self.mode {
            Mode::Live => None,
            Mode::Entering { session, .. } => Some(session.frames()),
        }
    }

    /// Live-mode capture trigger. Requires a complete sweep; allocates
    /// the next id, persists the images, then switches to metadata
    /// entry. The id stays allocated even when the image write fails, so
    /// a retried capture gets a fresh one.
    pub fn trigger_capture(
        &mut self,
        poll: &PollResult,
    ) -> Result<TriggerOutcome, Box<dyn Error>> {
        if !self.is_live() {
            return Ok(TriggerOutcome::Ignored);
        }

        let Some(frames) = poll.complete_frames() else {
            return Ok(TriggerOutcome::Ignored);
        };

        let id = self.counter.allocate();
        let frames: Vec<RgbImage> = frames.into_iter().cloned().collect();

        self.store.save_images(id, &frames)?;

        self.mode = Mode::Entering {
            machine: EntryMachine::new(),
            session: PendingSession { id, frames },
        };

        Ok(TriggerOutcome::Started(id))
    }

    /// Entry-mode key handler. On finalize the two buffers are parsed
    /// and either the record is written or the session is left orphaned;
    /// the held frame set is released either way and the recorder
    /// returns to live mode.
    pub fn entry_key(
        &mut self,
        key: EntryKey,
    ) -> Result<EntryOutcome, Box<dyn Error>> {
        let Mode::Entering {
            mut machine,
            session,
        } = mem::replace(&mut self.mode, Mode::Live)
        else {
            return Ok(EntryOutcome::Pending);
        };

        match machine.feed(key) {
            EntryStep::Pending => {
                self.mode = Mode::Entering { machine, session };
                Ok(EntryOutcome::Pending)
            }
            EntryStep::Finalized { force_z, label } => {
                let id = session.id();

                match parse_entries(&force_z, &label) {
                    Ok(record) => {
                        self.store.save_metadata(id, &record)?;
                        Ok(EntryOutcome::Saved(id))
                    }
                    Err(reason) => Ok(EntryOutcome::Discarded { id, reason }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unused_store() -> DatasetStore {
        // Paths that are never touched; these tests stay out of the
        // filesystem entirely.
        DatasetStore::new("target/terracap-recorder-unused")
    }

    #[test]
    fn incomplete_sweep_never_starts_a_session() {
        let mut recorder =
            Recorder::new(SessionCounter::starting_at(3), unused_store());

        let poll = PollResult::new(vec![None, None, None, None]);
        let outcome = recorder.trigger_capture(&poll).unwrap();

        assert_eq!(outcome, TriggerOutcome::Ignored);
        assert_eq!(recorder.next_session().value(), 3);
        assert!(recorder.is_live());
    }

    #[test]
    fn entry_keys_in_live_mode_are_ignored() {
        let mut recorder =
            Recorder::new(SessionCounter::starting_at(1), unused_store());

        let outcome = recorder.entry_key(EntryKey::Confirm).unwrap();

        assert_eq!(outcome, EntryOutcome::Pending);
        assert!(recorder.is_live());
        assert_eq!(recorder.prompt(), None);
    }
}
