//! Direction-typed endpoint handles and their transfer operations.

use std::future::Future;
use std::ops::Deref;
use std::time::Duration;

use crate::convenience::{copy_filled_prefix, create_read_buffer};
use crate::device::Device;
use crate::error::UsbResult;
#[cfg(feature = "callbacks")]
use crate::AsyncCallback;
use crate::{ReadBuffer, WriteBuffer};

/// Helper that annotates that we're working with an OUT address.
/// The function, it does *nothing*.
pub const fn address_for_out_endpoint(number: u8) -> u8 {
    number
}

/// Helper that converts an IN endpoint number to an endpoint address.
pub const fn address_for_in_endpoint(number: u8) -> u8 {
    number | 0x80
}

/// Helper that extracts the endpoint number from an endpoint address.
pub const fn number_for_endpoint_address(address: u8) -> u8 {
    address & 0x7F
}

/// Helper that identifies if an endpoint address refers to an IN endpoint.
pub const fn endpoint_address_is_in(address: u8) -> bool {
    (address & 0x80) != 0
}

/// An endpoint on a claimed interface, identified by its full address
/// (number plus direction bit). Carries the operations common to both
/// directions; [`InEndpoint`] and [`OutEndpoint`] layer the direction-typed
/// transfers on top.
#[derive(Debug)]
pub struct Endpoint<'dev> {
    device: &'dev Device,
    address: u8,
}

impl<'dev> Endpoint<'dev> {
    pub(crate) fn new(device: &'dev Device, address: u8) -> Endpoint<'dev> {
        Endpoint { device, address }
    }

    /// The endpoint's full address, direction bit included.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Clears the halt condition on this endpoint. Resolves with no payload.
    pub fn clear_halt(&self) -> UsbResult<impl Future<Output = UsbResult<()>>> {
        let (callback, operation) = self.device.operation_pair()?;

        self.device
            .backend
            .clear_halt(self.device, self.address, callback)?;

        Ok(async move {
            operation.await?;
            Ok(())
        })
    }

    /// Clears the halt condition in callback style; a pure pass-through to
    /// the backend.
    #[cfg(feature = "callbacks")]
    pub fn clear_halt_cb(&self, callback: AsyncCallback) -> UsbResult<()> {
        self.device
            .backend
            .clear_halt(self.device, self.address, callback)
    }

    /// Runs one transfer over the caller's buffer, in whichever direction
    /// this endpoint's address implies. Resolves with the buffer's contents
    /// sliced to the actual length the backend reported.
    pub fn make_transfer(
        &self,
        buffer: ReadBuffer,
        timeout: Option<Duration>,
    ) -> UsbResult<impl Future<Output = UsbResult<Vec<u8>>>> {
        let (callback, operation) = self.device.operation_pair()?;

        self.device
            .backend
            .transfer(self.device, self.address, buffer.clone(), timeout, callback)?;

        Ok(async move {
            let actual = operation.await?;
            Ok(copy_filled_prefix(&buffer, actual))
        })
    }

    /// Runs one transfer in callback style; a pure pass-through to the
    /// backend. The callback receives the actual length; the buffer is the
    /// caller's to inspect.
    #[cfg(feature = "callbacks")]
    pub fn make_transfer_cb(
        &self,
        buffer: ReadBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.device
            .backend
            .transfer(self.device, self.address, buffer, timeout, callback)
    }
}

/// An IN (device-to-host) endpoint.
#[derive(Debug)]
pub struct InEndpoint<'dev> {
    endpoint: Endpoint<'dev>,
}

impl<'dev> InEndpoint<'dev> {
    pub(crate) fn new(device: &'dev Device, number: u8) -> InEndpoint<'dev> {
        InEndpoint {
            endpoint: Endpoint::new(device, address_for_in_endpoint(number)),
        }
    }

    /// Reads up to `length` bytes from this endpoint. Resolves with the
    /// bytes the device actually produced.
    pub fn transfer(
        &self,
        length: usize,
        timeout: Option<Duration>,
    ) -> UsbResult<impl Future<Output = UsbResult<Vec<u8>>>> {
        let device = self.endpoint.device;
        let (callback, operation) = device.operation_pair()?;
        let target = create_read_buffer(length);

        device
            .backend
            .read(device, self.address(), target.clone(), timeout, callback)?;

        Ok(async move {
            let count = operation.await?;
            Ok(copy_filled_prefix(&target, count))
        })
    }

    /// Reads from this endpoint in callback style; a pure pass-through to
    /// the backend.
    #[cfg(feature = "callbacks")]
    pub fn transfer_cb(
        &self,
        target: ReadBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        let device = self.endpoint.device;
        device
            .backend
            .read(device, self.address(), target, timeout, callback)
    }
}

impl<'dev> Deref for InEndpoint<'dev> {
    type Target = Endpoint<'dev>;

    fn deref(&self) -> &Self::Target {
        &self.endpoint
    }
}

/// An OUT (host-to-device) endpoint.
#[derive(Debug)]
pub struct OutEndpoint<'dev> {
    endpoint: Endpoint<'dev>,
}

impl<'dev> OutEndpoint<'dev> {
    pub(crate) fn new(device: &'dev Device, number: u8) -> OutEndpoint<'dev> {
        OutEndpoint {
            endpoint: Endpoint::new(device, address_for_out_endpoint(number)),
        }
    }

    /// Writes `data` to this endpoint. Resolves with no payload once the
    /// backend reports the write complete.
    pub fn transfer(
        &self,
        data: WriteBuffer,
        timeout: Option<Duration>,
    ) -> UsbResult<impl Future<Output = UsbResult<()>>> {
        let device = self.endpoint.device;
        let (callback, operation) = device.operation_pair()?;

        device
            .backend
            .write(device, self.address(), data, timeout, callback)?;

        Ok(async move {
            operation.await?;
            Ok(())
        })
    }

    /// Writes to this endpoint in callback style; a pure pass-through to the
    /// backend.
    #[cfg(feature = "callbacks")]
    pub fn transfer_cb(
        &self,
        data: WriteBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        let device = self.endpoint.device;
        device
            .backend
            .write(device, self.address(), data, timeout, callback)
    }

    /// Writes `data` to this endpoint, asking the backend to terminate the
    /// transfer with a zero-length packet when the payload length lands on a
    /// packet-size boundary. Resolves with no payload.
    pub fn transfer_with_zlp(
        &self,
        data: WriteBuffer,
        timeout: Option<Duration>,
    ) -> UsbResult<impl Future<Output = UsbResult<()>>> {
        let device = self.endpoint.device;
        let (callback, operation) = device.operation_pair()?;

        device
            .backend
            .write_with_zlp(device, self.address(), data, timeout, callback)?;

        Ok(async move {
            operation.await?;
            Ok(())
        })
    }

    /// Zero-length-packet-terminated write in callback style; a pure
    /// pass-through to the backend.
    #[cfg(feature = "callbacks")]
    pub fn transfer_with_zlp_cb(
        &self,
        data: WriteBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        let device = self.endpoint.device;
        device
            .backend
            .write_with_zlp(device, self.address(), data, timeout, callback)
    }
}

impl<'dev> Deref for OutEndpoint<'dev> {
    type Target = Endpoint<'dev>;

    fn deref(&self) -> &Self::Target {
        &self.endpoint
    }
}
