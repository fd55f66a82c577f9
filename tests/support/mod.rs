#![allow(dead_code)]

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pentair_bridge::device::types::{IP_BRIDGE_TYPE, SERIAL_BRIDGE_TYPE};
use pentair_bridge::device::DeviceInstance;
use pentair_bridge::protocol::ProtocolProcessor;
use pentair_bridge::transport::{LineParams, OpenError, PortIdentifier, PortManager, SerialLink};

/// What the fake port should do when opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Succeed,
    Busy,
    Unsupported,
    Io,
}

/// Fake port-resolution capability with failure injection at each
/// acquisition step and a live-handle counter for leak checks.
pub struct FakePortManager {
    pub ports: Vec<String>,
    /// Reported current owner; `Some` makes the port report as owned.
    pub owner: Option<String>,
    pub open_outcome: OpenOutcome,
    pub params_fail: bool,
    pub streams_fail: bool,
    pub live_links: Arc<AtomicUsize>,
    pub open_calls: Arc<Mutex<Vec<(String, Duration)>>>,
}

impl Default for FakePortManager {
    fn default() -> Self {
        Self {
            ports: Vec::new(),
            owner: None,
            open_outcome: OpenOutcome::Succeed,
            params_fail: false,
            streams_fail: false,
            live_links: Arc::new(AtomicUsize::new(0)),
            open_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakePortManager {
    pub fn with_port(port: &str) -> Self {
        Self {
            ports: vec![port.to_string()],
            ..Self::default()
        }
    }

    /// Number of currently open fake links.
    pub fn live(&self) -> usize {
        self.live_links.load(Ordering::SeqCst)
    }

    pub fn open_calls(&self) -> Vec<(String, Duration)> {
        self.open_calls.lock().unwrap().clone()
    }
}

impl PortManager for FakePortManager {
    fn identifier(&self, locator: &str) -> Option<Box<dyn PortIdentifier>> {
        if !self.ports.iter().any(|p| p == locator) {
            return None;
        }
        Some(Box::new(FakeIdentifier {
            name: locator.to_string(),
            owner: self.owner.clone(),
            open_outcome: self.open_outcome,
            params_fail: self.params_fail,
            streams_fail: self.streams_fail,
            live_links: Arc::clone(&self.live_links),
            open_calls: Arc::clone(&self.open_calls),
        }))
    }
}

struct FakeIdentifier {
    name: String,
    owner: Option<String>,
    open_outcome: OpenOutcome,
    params_fail: bool,
    streams_fail: bool,
    live_links: Arc<AtomicUsize>,
    open_calls: Arc<Mutex<Vec<(String, Duration)>>>,
}

impl PortIdentifier for FakeIdentifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_currently_owned(&self) -> bool {
        self.owner.is_some()
    }

    fn current_owner(&self) -> Option<String> {
        self.owner.clone()
    }

    fn open(&self, owner: &str, timeout: Duration) -> Result<Box<dyn SerialLink>, OpenError> {
        self.open_calls
            .lock()
            .unwrap()
            .push((owner.to_string(), timeout));

        match self.open_outcome {
            OpenOutcome::Busy => Err(OpenError::Busy {
                owner: self.owner.clone(),
            }),
            OpenOutcome::Unsupported => Err(OpenError::Unsupported(
                "parameter negotiation rejected".to_string(),
            )),
            OpenOutcome::Io => Err(OpenError::Io(io::Error::new(
                io::ErrorKind::Other,
                "open failed",
            ))),
            OpenOutcome::Succeed => Ok(Box::new(FakeLink::new(
                self.params_fail,
                self.streams_fail,
                Arc::clone(&self.live_links),
            ))),
        }
    }
}

struct FakeLink {
    params_fail: bool,
    streams_fail: bool,
    live_links: Arc<AtomicUsize>,
}

impl FakeLink {
    fn new(params_fail: bool, streams_fail: bool, live_links: Arc<AtomicUsize>) -> Self {
        live_links.fetch_add(1, Ordering::SeqCst);
        Self {
            params_fail,
            streams_fail,
            live_links,
        }
    }
}

impl Drop for FakeLink {
    fn drop(&mut self) {
        self.live_links.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SerialLink for FakeLink {
    fn set_line_params(&mut self, _params: &LineParams) -> Result<(), OpenError> {
        if self.params_fail {
            Err(OpenError::Unsupported("9600 8N1 rejected".to_string()))
        } else {
            Ok(())
        }
    }

    fn byte_streams(
        &mut self,
    ) -> io::Result<(Box<dyn Read + Send>, Box<dyn Write + Send>)> {
        if self.streams_fail {
            Err(io::Error::new(io::ErrorKind::Other, "stream setup failed"))
        } else {
            Ok((Box::new(io::empty()), Box::new(io::sink())))
        }
    }
}

/// Processor fake that records attach/detach traffic.
#[derive(Default)]
pub struct RecordingProcessor {
    attached: Mutex<bool>,
    pub attach_count: AtomicUsize,
    pub detach_count: AtomicUsize,
}

impl ProtocolProcessor for RecordingProcessor {
    fn attach(&self, _reader: Box<dyn Read + Send>, _writer: Box<dyn Write + Send>) {
        *self.attached.lock().unwrap() = true;
        self.attach_count.fetch_add(1, Ordering::SeqCst);
    }

    fn detach(&self) {
        *self.attached.lock().unwrap() = false;
        self.detach_count.fetch_add(1, Ordering::SeqCst);
    }

    fn is_attached(&self) -> bool {
        *self.attached.lock().unwrap()
    }
}

pub fn serial_instance(port: &str) -> DeviceInstance {
    DeviceInstance::new("pool bridge", SERIAL_BRIDGE_TYPE.clone())
        .with_config("serialPort", port)
}

pub fn ip_instance(address: &str, port: u16) -> DeviceInstance {
    DeviceInstance::new("gateway bridge", IP_BRIDGE_TYPE.clone())
        .with_config("address", address)
        .with_config("port", port)
}
