use std::io::{Read, Write};
use std::sync::Mutex;

/// Seam between a bridge and the bus framing/decoding engine.
///
/// The bridge installs the byte-stream endpoints of its open transport here
/// after a successful connect and removes them again on disconnect; the
/// attached engine is then the sole reader and writer of those endpoints
/// until the next disconnect.
pub trait ProtocolProcessor: Send + Sync {
    /// Install the byte-stream endpoints of a freshly opened transport.
    fn attach(&self, reader: Box<dyn Read + Send>, writer: Box<dyn Write + Send>);

    /// Remove and drop any installed endpoints.
    fn detach(&self);

    fn is_attached(&self) -> bool;
}

type Streams = (Box<dyn Read + Send>, Box<dyn Write + Send>);

/// Default processor: holds the installed endpoints for an external decoding
/// engine to drive.
#[derive(Default)]
pub struct BusProcessor {
    streams: Mutex<Option<Streams>>,
}

impl BusProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of the installed endpoints, leaving the processor
    /// detached.
    pub fn take_streams(&self) -> Option<Streams> {
        lock_streams(&self.streams).take()
    }
}

impl ProtocolProcessor for BusProcessor {
    fn attach(&self, reader: Box<dyn Read + Send>, writer: Box<dyn Write + Send>) {
        let mut guard = lock_streams(&self.streams);
        if guard.is_some() {
            log::warn!("Replacing previously attached bus streams");
        }
        *guard = Some((reader, writer));
    }

    fn detach(&self) {
        lock_streams(&self.streams).take();
    }

    fn is_attached(&self) -> bool {
        lock_streams(&self.streams).is_some()
    }
}

fn lock_streams(streams: &Mutex<Option<Streams>>) -> std::sync::MutexGuard<'_, Option<Streams>> {
    match streams.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
