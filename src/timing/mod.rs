pub mod clock;
pub mod controller;
pub mod gate;
pub mod percentiles;
pub mod recorder;
pub mod report;
pub mod ring;

use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeTuple, Serializer};

pub use clock::TickClock;
pub use controller::{Instrumentation, TimingStats};
pub use gate::SamplingGate;
pub use percentiles::{PercentileSet, TickTypeSummary};
pub use recorder::TickContext;
pub use ring::SampleRing;

// ─── Tick types ──────────────────────────────────────────────────

/// The category of work a reactor tick performed.
///
/// Codes follow the classic reactor event numbering. Anything the host
/// reports outside the known set survives as `Other(raw)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TickType {
    TimerFired,
    IoTriggered,
    ConnectionUnbound,
    ConnectionAccepted,
    ConnectionCompleted,
    LoopbreakSignalled,
    NotifyReadable,
    NotifyWritable,
    SslHandshakeCompleted,
    SslVerify,
    ProxyTargetUnbound,
    ProxyCompleted,
    DeferredCallbacksRun,
    Other(u32),
}

impl TickType {
    const KNOWN: [(TickType, u32, &'static str); 13] = [
        (TickType::TimerFired, 100, "TimerFired"),
        (TickType::IoTriggered, 101, "IoTriggered"),
        (TickType::ConnectionUnbound, 102, "ConnectionUnbound"),
        (TickType::ConnectionAccepted, 103, "ConnectionAccepted"),
        (TickType::ConnectionCompleted, 104, "ConnectionCompleted"),
        (TickType::LoopbreakSignalled, 105, "LoopbreakSignalled"),
        (TickType::NotifyReadable, 106, "NotifyReadable"),
        (TickType::NotifyWritable, 107, "NotifyWritable"),
        (TickType::SslHandshakeCompleted, 108, "SslHandshakeCompleted"),
        (TickType::SslVerify, 109, "SslVerify"),
        (TickType::ProxyTargetUnbound, 110, "ProxyTargetUnbound"),
        (TickType::ProxyCompleted, 111, "ProxyCompleted"),
        (TickType::DeferredCallbacksRun, 112, "DeferredCallbacksRun"),
    ];

    /// Map a host-reported code onto a tick type. Never fails.
    pub fn from_raw(raw: u32) -> Self {
        Self::KNOWN
            .iter()
            .find(|(_, code, _)| *code == raw)
            .map(|(ty, _, _)| *ty)
            .unwrap_or(TickType::Other(raw))
    }

    pub fn raw(self) -> u32 {
        match self {
            TickType::Other(raw) => raw,
            known => Self::KNOWN
                .iter()
                .find(|(ty, _, _)| *ty == known)
                .map(|(_, code, _)| *code)
                .unwrap_or_default(),
        }
    }

    /// Symbolic name, or `None` when the code is not one we know.
    pub fn name(self) -> Option<&'static str> {
        Self::KNOWN
            .iter()
            .find(|(ty, _, _)| *ty == self)
            .map(|(_, _, name)| *name)
    }
}

impl From<u32> for TickType {
    fn from(raw: u32) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for TickType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.pad(name),
            None => f.pad(&self.raw().to_string()),
        }
    }
}

impl Serialize for TickType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.raw())
    }
}

// ─── Callback identity ───────────────────────────────────────────

/// Inert token naming the unit of work a tick ran.
///
/// Carries only what the read-out needs to report it back. The
/// instrumentation never calls or inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackHandle {
    Handler { id: u64, label: Arc<str> },
    RunDeferredCallbacks,
}

impl CallbackHandle {
    pub fn handler(id: u64, label: impl Into<Arc<str>>) -> Self {
        CallbackHandle::Handler {
            id,
            label: label.into(),
        }
    }
}

impl fmt::Display for CallbackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackHandle::Handler { id, label } => write!(f, "#<handler {id} {label:?}>"),
            CallbackHandle::RunDeferredCallbacks => f.write_str(":run_deferred_callbacks"),
        }
    }
}

// ─── Samples ─────────────────────────────────────────────────────

/// One recorded tick. Immutable once built; `end_time >= start_time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    tick_type: TickType,
    callback: CallbackHandle,
    /// Microseconds on the tick clock
    start_time: u64,
    end_time: u64,
}

impl Sample {
    /// Build a sample, clamping `end_time` up to `start_time` if needed.
    pub fn new(tick_type: TickType, callback: CallbackHandle, start_time: u64, end_time: u64) -> Self {
        Self {
            tick_type,
            callback,
            start_time,
            end_time: end_time.max(start_time),
        }
    }

    pub fn tick_type(&self) -> TickType {
        self.tick_type
    }

    pub fn callback(&self) -> &CallbackHandle {
        &self.callback
    }

    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    pub fn duration_us(&self) -> u64 {
        self.end_time - self.start_time
    }

    /// Read-out shape: `(tick_type, callback, start_time, end_time)`.
    pub fn as_tuple(&self) -> (TickType, &CallbackHandle, u64, u64) {
        (self.tick_type, &self.callback, self.start_time, self.end_time)
    }
}

impl Serialize for Sample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(4)?;
        tup.serialize_element(&self.tick_type)?;
        tup.serialize_element(&self.callback)?;
        tup.serialize_element(&self.start_time)?;
        tup.serialize_element(&self.end_time)?;
        tup.end()
    }
}
