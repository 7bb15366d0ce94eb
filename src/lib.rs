//! Dual calling conventions for callback-based USB backends.
//!
//! This crate wraps an underlying callback-completion USB implementation (a
//! [`backend::Backend`]) and exposes each of its device, interface, and
//! endpoint operations in two forms: a `_cb` pass-through form that forwards
//! the caller's completion callback to the backend untouched, and a
//! promise-mode form that starts the operation and hands back a future which
//! settles when it completes. The backend owns all actual I/O, scheduling,
//! and cancellation; this crate only adapts its completion style.
//!
//! The future implementation behind promise-mode calls is pluggable: hosts
//! default to the crate's own waker-based futures, and callers may inject a
//! [`FutureProvider`] of their own at construction time. A host with neither
//! fails promise-mode calls synchronously, before anything is submitted.
//!
//! ```no_run
//! use std::rc::Rc;
//!
//! use usb_futures::backend::loopback::LoopbackBackend;
//! use usb_futures::{DeviceSelector, Host};
//!
//! # fn main() -> Result<(), usb_futures::Error> {
//! let host = Host::new(Rc::new(LoopbackBackend::default()));
//!
//! // Find some device we're interested in working with, and open it.
//! let info = host.device(&DeviceSelector::default())?;
//! let device = host.open(&info)?;
//!
//! // Promise mode: the returned future settles when the operation does.
//! let product = smol::block_on(device.read_string_descriptor(2)?)?;
//! println!("product: {}", product);
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, RwLock};

pub use convenience::{create_read_buffer, create_write_buffer};
pub use device::{Device, DeviceInformation, DeviceSelector};
pub use endpoint::{Endpoint, InEndpoint, OutEndpoint};
pub use error::{Error, UsbResult};
pub use futures::{FutureProvider, OperationFuture};
pub use host::Host;
pub use interface::Interface;

#[cfg(feature = "async")]
pub use futures::WakerFutures;

pub mod backend;
pub mod convenience;
pub mod descriptor;
pub mod device;
pub mod endpoint;
pub mod error;
pub mod futures;
pub mod host;
pub mod interface;
pub mod request;

/// Type used for buffers the backend fills.
pub type ReadBuffer = Arc<RwLock<dyn AsMut<[u8]> + Send + Sync>>;

/// Type used for buffers the backend consumes.
pub type WriteBuffer = Arc<dyn AsRef<[u8]> + Send + Sync>;

/// Type used for completion callbacks, in both calling conventions: invoked
/// exactly once with the underlying operation's result.
pub type AsyncCallback = Box<dyn FnOnce(UsbResult<usize>)>;
