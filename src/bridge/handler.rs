use std::io::{Read, Write};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};

use crate::device::models::DeviceInstance;
use crate::protocol::{BusProcessor, ProtocolProcessor};

use super::{BridgeError, BridgeSettings, BridgeStatus, Result};

/// Byte-stream endpoints of a fully acquired transport.
pub struct TransportStreams {
    pub reader: Box<dyn Read + Send>,
    pub writer: Box<dyn Write + Send>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Offline,
    Connecting,
    Online,
    OfflineError,
}

/// Transport-specific acquisition and release steps, one implementation per
/// transport kind.
#[async_trait]
pub trait BridgeTransport: Send {
    /// Short name for logs ("serial", "ip").
    fn kind(&self) -> &'static str;

    /// Run the acquisition sequence against the instance's current
    /// configuration, returning the byte-stream endpoints on success.
    ///
    /// Implementations must release anything they acquired before returning
    /// an error; a returned error implies no live transport resource.
    async fn open(&mut self, instance: &DeviceInstance) -> Result<TransportStreams>;

    /// Best-effort release of the open transport. Must not fail; a no-op
    /// when nothing is open.
    async fn close(&mut self);
}

struct BridgeInner {
    transport: Box<dyn BridgeTransport>,
    state: ConnectionState,
    settings: BridgeSettings,
    status_changed_at: DateTime<Utc>,
}

/// Supervises one transport's connect/disconnect cycle and publishes its
/// byte stream to the protocol processor.
///
/// All mutable state sits behind one per-bridge mutex, so concurrent
/// `connect`/`disconnect` calls on the same bridge serialize; different
/// bridges are independent.
pub struct BridgeHandler {
    instance: DeviceInstance,
    inner: Mutex<BridgeInner>,
    processor: Arc<dyn ProtocolProcessor>,
    status_tx: watch::Sender<BridgeStatus>,
}

impl BridgeHandler {
    pub fn new(instance: DeviceInstance, transport: Box<dyn BridgeTransport>) -> Self {
        Self::with_processor(instance, transport, Arc::new(BusProcessor::new()))
    }

    pub fn with_processor(
        instance: DeviceInstance,
        transport: Box<dyn BridgeTransport>,
        processor: Arc<dyn ProtocolProcessor>,
    ) -> Self {
        let (status_tx, _) = watch::channel(BridgeStatus::Offline);
        Self {
            instance,
            inner: Mutex::new(BridgeInner {
                transport,
                state: ConnectionState::Offline,
                settings: BridgeSettings::default(),
                status_changed_at: Utc::now(),
            }),
            processor,
            status_tx,
        }
    }

    pub fn instance(&self) -> &DeviceInstance {
        &self.instance
    }

    pub fn processor(&self) -> &Arc<dyn ProtocolProcessor> {
        &self.processor
    }

    /// Current platform-visible status.
    pub fn status(&self) -> BridgeStatus {
        self.status_tx.borrow().clone()
    }

    pub fn is_online(&self) -> bool {
        self.status_tx.borrow().is_online()
    }

    /// Subscribe to status transitions.
    pub fn subscribe_status(&self) -> watch::Receiver<BridgeStatus> {
        self.status_tx.subscribe()
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.inner.lock().await.state
    }

    /// Settings applied by the most recent connect attempt.
    pub async fn settings(&self) -> BridgeSettings {
        self.inner.lock().await.settings.clone()
    }

    pub async fn status_changed_at(&self) -> DateTime<Utc> {
        self.inner.lock().await.status_changed_at
    }

    /// Acquire the transport and bring the bridge online.
    ///
    /// Returns whether the bridge is online afterwards. Safe to invoke
    /// repeatedly; a failed attempt leaves no resource allocated, so a
    /// supervising retry policy may simply call again.
    pub async fn connect(&self) -> bool {
        let mut inner = self.inner.lock().await;

        if inner.state == ConnectionState::Online {
            log::debug!("Bridge {} already connected", self.instance.label);
            return true;
        }

        inner.state = ConnectionState::Connecting;

        // Re-read settings on every attempt so configuration edits since the
        // last failure take effect.
        inner.settings = match self.instance.config_as::<BridgeSettings>() {
            Ok(settings) => settings,
            Err(e) => {
                self.fail(&mut inner, BridgeError::Configuration(e.to_string()));
                return false;
            }
        };
        log::debug!("Bridge id: {}", inner.settings.id);

        let streams = match inner.transport.open(&self.instance).await {
            Ok(streams) => streams,
            Err(e) => {
                self.fail(&mut inner, e);
                return false;
            }
        };

        self.processor.attach(streams.reader, streams.writer);
        inner.state = ConnectionState::Online;
        self.set_status(&mut inner, BridgeStatus::Online);
        log::info!(
            "Bridge {} connected via {} transport",
            self.instance.label,
            inner.transport.kind()
        );

        true
    }

    /// Take the bridge offline and release the transport.
    ///
    /// Status reflects the intent before any resource is released, and
    /// release failures never propagate. A no-op when already offline.
    pub async fn disconnect(&self) {
        let mut inner = self.inner.lock().await;

        self.set_status(&mut inner, BridgeStatus::Offline);
        inner.state = ConnectionState::Offline;

        self.processor.detach();
        inner.transport.close().await;

        log::debug!("Bridge {} disconnected", self.instance.label);
    }

    fn fail(&self, inner: &mut BridgeInner, error: BridgeError) {
        log::warn!("Bridge {} connect failed: {}", self.instance.label, error);
        inner.state = ConnectionState::OfflineError;
        self.set_status(
            inner,
            BridgeStatus::OfflineDetail {
                detail: error.status_detail(),
                message: error.to_string(),
            },
        );
    }

    fn set_status(&self, inner: &mut BridgeInner, status: BridgeStatus) {
        inner.status_changed_at = Utc::now();
        self.status_tx.send_replace(status);
    }
}
