//! Abstraction over the underlying USB layer's view of the system.

use std::rc::Rc;

use crate::backend::Backend;
use crate::device::{Device, DeviceInformation, DeviceSelector};
use crate::error::{self, UsbResult};
use crate::futures::FutureProvider;

/// Representation of a USB host: the thing that hands out devices, and the
/// point where the crate's two pieces of configuration meet -- the backend
/// that actually talks USB, and the future implementation that backs
/// promise-mode calls on the devices it opens.
#[derive(Debug)]
pub struct Host {
    /// The backend used to provide the functions for this Host.
    backend: Rc<dyn Backend>,

    /// The future implementation handed to opened devices, if any.
    futures: Option<Rc<dyn FutureProvider>>,
}

impl Host {
    /// Creates a new Host over the given backend, using the built-in future
    /// implementation for promise-mode calls.
    ///
    /// Without the `async` feature there is no built-in implementation, and
    /// hosts built here behave like [`Host::without_future_provider`] ones.
    pub fn new(backend: Rc<dyn Backend>) -> Host {
        Host {
            backend,
            futures: default_future_provider(),
        }
    }

    /// Creates a new Host whose promise-mode calls use the given future
    /// implementation instead of the built-in one.
    pub fn with_future_provider(backend: Rc<dyn Backend>, futures: Rc<dyn FutureProvider>) -> Host {
        Host {
            backend,
            futures: Some(futures),
        }
    }

    /// Creates a new Host with no future implementation at all; for
    /// callback-only consumers. Promise-mode calls on its devices fail
    /// synchronously with
    /// [`Error::NoAsyncImplementationAvailable`](crate::Error).
    pub fn without_future_provider(backend: Rc<dyn Backend>) -> Host {
        Host {
            backend,
            futures: None,
        }
    }

    /// Helper for [`Self::device`] and [`Self::devices`]; enumerates one or
    /// more devices matching a selector.
    fn enumerate_devices(
        &self,
        selector: &DeviceSelector,
        single_device: bool,
    ) -> UsbResult<Vec<DeviceInformation>> {
        let mut matching_devices: Vec<DeviceInformation> = vec![];

        // Get a list of all devices...
        let all_devices = self.backend.get_devices()?;

        // .... and then filter it down.
        for device in all_devices {
            if selector.matches(&device) {
                matching_devices.push(device);

                // If we're only returning a single device, end here.
                if single_device {
                    return Ok(matching_devices);
                }
            }
        }

        Ok(matching_devices)
    }

    /// Returns the first device matching the given selector.
    pub fn device(&self, selector: &DeviceSelector) -> UsbResult<DeviceInformation> {
        let mut candidates = self.enumerate_devices(selector, true)?;
        candidates.pop().ok_or(error::Error::DeviceNotFound)
    }

    /// Finds devices attached to the system, filtering by one or more criteria.
    pub fn devices(&self, selector: &DeviceSelector) -> UsbResult<Vec<DeviceInformation>> {
        self.enumerate_devices(selector, false)
    }

    /// Returns all devices currently connected to the system.
    pub fn all_devices(&self) -> UsbResult<Vec<DeviceInformation>> {
        self.devices(&Default::default())
    }

    /// Opens a device given its device information. The opened device
    /// inherits this host's future implementation.
    pub fn open(&self, information: &DeviceInformation) -> UsbResult<Device> {
        // Ask our backend to open a device for us...
        let backend_device = self.backend.open(information)?;

        // ... and wrap it up with the handles its operations will need.
        Ok(Device::from_backend_device(
            backend_device,
            Rc::clone(&self.backend),
            self.futures.clone(),
        ))
    }
}

#[cfg(feature = "async")]
fn default_future_provider() -> Option<Rc<dyn FutureProvider>> {
    Some(Rc::new(crate::futures::WakerFutures))
}

#[cfg(not(feature = "async"))]
fn default_future_provider() -> Option<Rc<dyn FutureProvider>> {
    None
}
