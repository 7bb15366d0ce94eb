//! Interface for working with USB devices.

use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use log::error;

use crate::backend::{Backend, BackendDevice};
use crate::convenience::{copy_filled_prefix, create_read_buffer};
use crate::descriptor::{self, Capability};
use crate::error::{Error, UsbResult};
use crate::futures::{FutureProvider, OperationFuture};
use crate::interface::Interface;
use crate::request::RequestType;
#[cfg(feature = "callbacks")]
use crate::ReadBuffer;
use crate::{AsyncCallback, WriteBuffer};

/// Contains known information for an unopened device.
#[derive(Debug, Default)]
pub struct DeviceInformation {
    /// The Vendor ID (idVendor) assigned to the device.
    pub vendor_id: u16,

    /// The Product ID (idProduct) associated with the device.
    pub product_id: u16,

    /// The serial string associated with the device, if we were able to get one.
    pub serial: Option<String>,

    /// A backend-specific number that locates the device for [`Backend::open`].
    pub backend_numeric_location: Option<u64>,
}

/// Information used to find a specific device.
#[derive(Debug, Default)]
pub struct DeviceSelector {
    /// If specified, searches for a device with the given VID.
    pub vendor_id: Option<u16>,

    /// If specified, searches for a device with the given PID.
    pub product_id: Option<u16>,
}

impl DeviceSelector {
    pub fn matches(&self, device: &DeviceInformation) -> bool {
        // Oh, gods.
        //
        // This could be made so much tinier if we wanted to commit terrible sins.
        // We don't, so enjoy this wonderful boilerplate.

        // Check VID.
        if let Some(vid) = self.vendor_id {
            if vid != device.vendor_id {
                return false;
            }
        }

        // Check PID.
        if let Some(pid) = self.product_id {
            if pid != device.product_id {
                return false;
            }
        }

        return true;
    }
}

/// An opened USB device, exposing each wrapped operation in two conventions:
/// a promise-mode form returning a future, and (with the `callbacks` feature)
/// a `_cb` pass-through form that forwards the caller's completion callback
/// to the backend untouched.
///
/// Promise-mode methods resolve the future-implementation slot first and fail
/// synchronously with [`Error::NoAsyncImplementationAvailable`] when it is
/// empty; otherwise they start the underlying operation and hand back a
/// future that settles when the backend completes it. Whatever error the
/// backend reports becomes the future's rejection value, unmodified.
#[derive(Debug)]
pub struct Device {
    /// The backend used to talk to this device.
    pub(crate) backend: Rc<dyn Backend>,

    /// The backend's own state for this device.
    pub(crate) backend_device: Box<dyn BackendDevice>,

    /// The future implementation backing promise-mode calls, if any.
    pub(crate) futures: Option<Rc<dyn FutureProvider>>,
}

impl Device {
    /// Wraps a backend device handle. Hosts call this from [`crate::Host::open`].
    pub(crate) fn from_backend_device(
        backend_device: Box<dyn BackendDevice>,
        backend: Rc<dyn Backend>,
        futures: Option<Rc<dyn FutureProvider>>,
    ) -> Device {
        Device {
            backend,
            backend_device,
            futures,
        }
    }

    /// Fetches the backend's state for this device; backends downcast this
    /// to their own type.
    pub fn backend_device(&self) -> &dyn BackendDevice {
        &*self.backend_device
    }

    /// Mints a linked callback/future pair from the configured provider, or
    /// reports the missing-configuration error promise-mode calls start with.
    pub(crate) fn operation_pair(&self) -> UsbResult<(AsyncCallback, OperationFuture)> {
        match &self.futures {
            Some(provider) => Ok(provider.operation()),
            None => {
                error!("promise-mode call, but no future implementation is configured");
                Err(Error::NoAsyncImplementationAvailable)
            }
        }
    }

    /// Claims an interface on this device, making its endpoints usable.
    /// The claim is released when the returned [`Interface`] drops.
    pub fn claim_interface(&self, number: u8) -> UsbResult<Interface<'_>> {
        self.backend.claim_interface(self, number)?;
        Ok(Interface::new(self, number))
    }

    /// Performs an IN control request, reading up to `length` bytes.
    /// Resolves with the bytes the device actually produced.
    pub fn control_read(
        &self,
        request_type: RequestType,
        request_number: u8,
        value: u16,
        index: u16,
        length: u16,
        timeout: Option<Duration>,
    ) -> UsbResult<impl Future<Output = UsbResult<Vec<u8>>>> {
        let (callback, operation) = self.operation_pair()?;
        let target = create_read_buffer(length as usize);

        self.backend.control_read(
            self,
            request_type.into(),
            request_number,
            value,
            index,
            target.clone(),
            timeout,
            callback,
        )?;

        Ok(async move {
            let count = operation.await?;
            Ok(copy_filled_prefix(&target, count))
        })
    }

    /// Performs an IN control request in callback style; a pure pass-through
    /// to the backend.
    #[cfg(feature = "callbacks")]
    #[allow(clippy::too_many_arguments)]
    pub fn control_read_cb(
        &self,
        request_type: RequestType,
        request_number: u8,
        value: u16,
        index: u16,
        target: ReadBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.backend.control_read(
            self,
            request_type.into(),
            request_number,
            value,
            index,
            target,
            timeout,
            callback,
        )
    }

    /// Performs an OUT control request.
    pub fn control_write(
        &self,
        request_type: RequestType,
        request_number: u8,
        value: u16,
        index: u16,
        data: WriteBuffer,
        timeout: Option<Duration>,
    ) -> UsbResult<impl Future<Output = UsbResult<()>>> {
        let (callback, operation) = self.operation_pair()?;

        self.backend.control_write(
            self,
            request_type.into(),
            request_number,
            value,
            index,
            data,
            timeout,
            callback,
        )?;

        Ok(async move {
            operation.await?;
            Ok(())
        })
    }

    /// Performs an OUT control request in callback style; a pure pass-through
    /// to the backend.
    #[cfg(feature = "callbacks")]
    #[allow(clippy::too_many_arguments)]
    pub fn control_write_cb(
        &self,
        request_type: RequestType,
        request_number: u8,
        value: u16,
        index: u16,
        data: WriteBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.backend.control_write(
            self,
            request_type.into(),
            request_number,
            value,
            index,
            data,
            timeout,
            callback,
        )
    }

    /// Reads the string descriptor with the given index, decoding its
    /// UTF-16LE payload.
    pub fn read_string_descriptor(
        &self,
        index: u8,
    ) -> UsbResult<impl Future<Output = UsbResult<String>>> {
        let (callback, operation) = self.operation_pair()?;
        let target = create_read_buffer(descriptor::STRING_BUFFER_LENGTH);

        self.backend
            .read_string_descriptor(self, index, target.clone(), callback)?;

        Ok(async move {
            let count = operation.await?;
            descriptor::decode_string_descriptor(&copy_filled_prefix(&target, count))
        })
    }

    /// Reads a raw string descriptor in callback style; a pure pass-through
    /// to the backend. No decoding is applied.
    #[cfg(feature = "callbacks")]
    pub fn read_string_descriptor_cb(
        &self,
        index: u8,
        target: ReadBuffer,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.backend
            .read_string_descriptor(self, index, target, callback)
    }

    /// Reads the device's Binary Object Store descriptor: first its header,
    /// to learn the total length, and then the full block. Resolves with the
    /// raw descriptor, truncated to the length the device reported.
    pub fn read_bos_descriptor(
        &self,
    ) -> UsbResult<impl Future<Output = UsbResult<Vec<u8>>> + '_> {
        let (callback, header_operation) = self.operation_pair()?;
        let header = create_read_buffer(descriptor::BOS_HEADER_LENGTH);

        self.backend
            .read_bos_descriptor(self, header.clone(), callback)?;

        Ok(async move {
            let count = header_operation.await?;
            let info = descriptor::parse_bos_header(&copy_filled_prefix(&header, count))?;

            let (callback, full_operation) = self.operation_pair()?;
            let full = create_read_buffer(info.total_length);
            self.backend
                .read_bos_descriptor(self, full.clone(), callback)?;

            let count = full_operation.await?;
            Ok(copy_filled_prefix(&full, count))
        })
    }

    /// Reads the raw BOS descriptor in callback style; a pure pass-through to
    /// the backend, deposited into `target` as-is.
    #[cfg(feature = "callbacks")]
    pub fn read_bos_descriptor_cb(
        &self,
        target: ReadBuffer,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.backend.read_bos_descriptor(self, target, callback)
    }

    /// Reads the device's capability set, parsed out of its BOS descriptor.
    ///
    /// This is a composition over [`Self::read_bos_descriptor`], not a
    /// distinct backend operation, so it has no callback form; callback-style
    /// callers can pair [`Self::read_bos_descriptor_cb`] with
    /// [`descriptor::parse_capabilities`].
    pub fn read_capabilities(
        &self,
    ) -> UsbResult<impl Future<Output = UsbResult<Vec<Capability>>> + '_> {
        let bos = self.read_bos_descriptor()?;
        Ok(async move { descriptor::parse_capabilities(&bos.await?) })
    }

    /// Selects the device's active configuration.
    pub fn set_configuration(
        &self,
        configuration_index: u8,
    ) -> UsbResult<impl Future<Output = UsbResult<()>>> {
        let (callback, operation) = self.operation_pair()?;

        self.backend
            .set_configuration(self, configuration_index, callback)?;

        Ok(async move {
            operation.await?;
            Ok(())
        })
    }

    /// Selects the active configuration in callback style; a pure
    /// pass-through to the backend.
    #[cfg(feature = "callbacks")]
    pub fn set_configuration_cb(
        &self,
        configuration_index: u8,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.backend
            .set_configuration(self, configuration_index, callback)
    }
}
