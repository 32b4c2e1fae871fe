use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

/// Permit pool bounding the number of concurrently admitted downloads.
///
/// A bounded channel pre-filled with `capacity` permits: acquiring
/// receives one (blocking while the pool is empty), and the returned
/// token sends it back when dropped. Drop runs on every exit path,
/// panics included, so permits cannot leak.
#[derive(Clone)]
pub struct AdmissionGate {
    permits: Sender<()>,
    slots: Receiver<()>,
    capacity: usize,
}

impl AdmissionGate {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (permits, slots) = bounded(capacity);
        for _ in 0..capacity {
            // Cannot fail: we hold the receiver and the channel has room
            permits.send(()).unwrap();
        }
        Self {
            permits,
            slots,
            capacity,
        }
    }

    /// Block until a permit is free, then take it
    pub fn acquire(&self) -> AdmissionToken {
        self.slots
            .recv()
            .expect("Admission gate closed while acquiring");
        AdmissionToken {
            release: self.permits.clone(),
        }
    }

    /// Take a permit only if one is free right now
    pub fn try_acquire(&self) -> Option<AdmissionToken> {
        match self.slots.try_recv() {
            Ok(()) => Some(AdmissionToken {
                release: self.permits.clone(),
            }),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of permits currently free
    pub fn available(&self) -> usize {
        self.slots.len()
    }
}

pub struct AdmissionToken {
    release: Sender<()>,
}

impl Drop for AdmissionToken {
    fn drop(&mut self) {
        // The pool took one permit out, so there is room to put it back
        let _ = self.release.send(());
    }
}
