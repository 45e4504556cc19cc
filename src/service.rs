//! The process-wide pair of channels.
//!
//! [`LogService`] owns the normal-output and error channels. It can be used
//! as a plain value (tests build one per case over [`MemorySink`]s) or
//! installed once as the ambient service reached by the `log_*!` macros.
//!
//! # Usage
//!
//! ```no_run
//! use steplog::{LogConfig, log_outln};
//!
//! // At startup, before any worker thread exists.
//! let logs = steplog::init(&LogConfig::from_env()?)?;
//!
//! log_outln!("simulation started with ", 4, " controllers");
//!
//! // At the end of every step.
//! logs.flush()?;
//!
//! // At exit.
//! steplog::shutdown()?;
//! # Ok::<(), steplog::Error>(())
//! ```
//!
//! [`MemorySink`]: crate::MemorySink

use std::sync::Arc;

use parking_lot::RwLock;

use crate::channel::Channel;
use crate::config::LogConfig;
use crate::error::{Error, Result};
use crate::sink::{LogSink, StderrSink, StdoutSink};

/// The normal-output and error channels.
#[derive(Debug)]
pub struct LogService {
    out: Channel,
    err: Channel,
}

impl LogService {
    /// Build both channels over the given sinks.
    pub fn new(out_sink: Arc<dyn LogSink>, err_sink: Arc<dyn LogSink>, config: &LogConfig) -> Self {
        let out = Channel::builder(out_sink)
            .color(config.out_color.clone())
            .color_enabled(config.color_enabled)
            .mode(config.mode)
            .build();
        let err = Channel::builder(err_sink)
            .color(config.err_color.clone())
            .color_enabled(config.color_enabled)
            .mode(config.mode)
            .build();
        Self { out, err }
    }

    /// Channels bound to standard output and standard error.
    pub fn standard(config: &LogConfig) -> Self {
        Self::new(Arc::new(StdoutSink), Arc::new(StderrSink), config)
    }

    /// The normal-output channel.
    pub fn out(&self) -> &Channel {
        &self.out
    }

    /// The error channel.
    pub fn err(&self) -> &Channel {
        &self.err
    }

    /// Flush the output channel, then the error channel.
    ///
    /// Both are flushed even if the first fails; the first error wins.
    pub fn flush(&self) -> Result<()> {
        let out = self.out.flush();
        let err = self.err.flush();
        out.and(err)
    }

    /// Close both channels: later writes through any handle are dropped.
    pub fn close(&self) {
        self.out.close();
        self.err.close();
    }

    pub fn set_color_enabled(&self, enabled: bool) {
        for channel in [&self.out, &self.err] {
            if enabled {
                channel.enable_color();
            } else {
                channel.disable_color();
            }
        }
    }

    /// Register the calling thread on both channels. Returns the ordinal on
    /// the output channel (`None` in direct mode).
    pub fn register_calling_thread(&self) -> Option<usize> {
        self.err.register_calling_thread();
        self.out.register_calling_thread()
    }
}

// ============================================================================
// Ambient service
// ============================================================================

static SERVICE: RwLock<Option<Arc<LogService>>> = parking_lot::const_rwlock(None);

/// Build the standard channel pair from `config` and install it.
///
/// Fails with [`Error::AlreadyInitialized`] if a service is installed.
pub fn init(config: &LogConfig) -> Result<Arc<LogService>> {
    let service = Arc::new(LogService::standard(config));
    install(service.clone())?;
    Ok(service)
}

/// Install a prebuilt service as the ambient one.
pub fn install(service: Arc<LogService>) -> Result<()> {
    let mut slot = SERVICE.write();
    if slot.is_some() {
        return Err(Error::AlreadyInitialized);
    }
    *slot = Some(service);
    tracing::debug!("log service installed");
    Ok(())
}

/// The ambient service, if one is installed.
pub fn current() -> Option<Arc<LogService>> {
    SERVICE.read().clone()
}

/// Uninstall the ambient service, close its channels and flush them.
///
/// Later writes are dropped, both through the macros and through any
/// `Arc<LogService>` a thread still holds.
pub fn shutdown() -> Result<()> {
    let service = SERVICE.write().take().ok_or(Error::NotInitialized)?;
    service.close();
    tracing::debug!("log service shut down");
    service.flush()
}
