//! # Remote Gateway
//!
//! Interfaces for the collaborators a volume synchronizer needs from the
//! remote-control client: a way to open a query connection to the device,
//! the query itself, and a channel for button commands.
//!
//! Implementations own whatever context they need (host, credentials,
//! network state) and are handed to the synchronizer fully constructed.
//!
//! ```rust,ignore
//! use remote_gateway::{Gateway, VolumeQuery, GatewayError};
//!
//! struct HttpGateway { host: String }
//!
//! impl Gateway for HttpGateway {
//!     fn connect(&self) -> Result<Box<dyn VolumeQuery>, GatewayError> {
//!         // open a session against self.host
//!     }
//! }
//! ```

mod command;
mod error;

use std::sync::Arc;

pub use command::RemoteCommand;
pub use error::{GatewayError, Result};

/// Factory for query connections to the remote device
///
/// `connect` may fail transiently; callers are expected to retry later
/// rather than treat the failure as fatal.
pub trait Gateway: Send + Sync + 'static {
    /// Open a connection that can read the device's volume
    fn connect(&self) -> Result<Box<dyn VolumeQuery>>;
}

/// An open connection able to read the current volume
pub trait VolumeQuery: Send {
    /// Read the device's current volume
    fn get_volume(&mut self) -> Result<i32>;
}

/// Sends button commands to the remote device
pub trait CommandSender: Send + Sync + 'static {
    fn send(&self, command: RemoteCommand) -> Result<()>;
}

impl<G: Gateway + ?Sized> Gateway for Arc<G> {
    fn connect(&self) -> Result<Box<dyn VolumeQuery>> {
        (**self).connect()
    }
}

impl<C: CommandSender + ?Sized> CommandSender for Arc<C> {
    fn send(&self, command: RemoteCommand) -> Result<()> {
        (**self).send(command)
    }
}
