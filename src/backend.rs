//! Trait for the underlying USB layer this crate wraps.
//! Backends own all actual device communication; they expose a uniform
//! "start the operation, invoke the callback exactly once" interface here.

use std::any::Any;
use std::time::Duration;

use crate::device::{Device, DeviceInformation};
use crate::error::UsbResult;
use crate::{AsyncCallback, ReadBuffer, WriteBuffer};

pub mod loopback;

/// Trait that collects methods provided by backend USB-device information.
pub trait BackendDevice: std::fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

/// Contract of the underlying USB implementation.
///
/// Every callback-completion method below starts its operation and returns
/// immediately; the supplied [`AsyncCallback`] must then be invoked exactly
/// once, with `Ok(count)` (bytes transferred) on success or the operation's
/// error on failure. The error value a backend reports is surfaced to
/// callers unmodified -- the wrapping layer never inspects or transforms it.
///
/// See [`Device`] for more detailed documentation for many of these methods,
/// as their signatures are very close to the same.
pub trait Backend: std::fmt::Debug {
    /// Returns a collection of device information for all devices present on the system.
    fn get_devices(&self) -> UsbResult<Vec<DeviceInformation>>;

    /// Opens a raw USB device, and returns a backend-specific wrapper around the device.
    fn open(&self, information: &DeviceInformation) -> UsbResult<Box<dyn BackendDevice>>;

    /// Attempts to claim an interface on the given device.
    fn claim_interface(&self, device: &Device, interface: u8) -> UsbResult<()>;

    /// Attempts to release the claim held over a given interface.
    fn release_interface(&self, device: &Device, interface: u8) -> UsbResult<()>;

    /// Performs an IN control request; the callback receives the amount
    /// actually read into `target`.
    #[allow(clippy::too_many_arguments)]
    fn control_read(
        &self,
        device: &Device,
        request_type: u8,
        request_number: u8,
        value: u16,
        index: u16,
        target: ReadBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()>;

    /// Performs an OUT control request; the callback receives the amount written.
    #[allow(clippy::too_many_arguments)]
    fn control_write(
        &self,
        device: &Device,
        request_type: u8,
        request_number: u8,
        value: u16,
        index: u16,
        data: WriteBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()>;

    /// Reads the raw string descriptor with the given index into `target`;
    /// the callback receives the descriptor's length in bytes.
    fn read_string_descriptor(
        &self,
        device: &Device,
        index: u8,
        target: ReadBuffer,
        callback: AsyncCallback,
    ) -> UsbResult<()>;

    /// Reads the device's Binary Object Store descriptor into `target`,
    /// truncating to the buffer's capacity; the callback receives the amount
    /// actually deposited.
    fn read_bos_descriptor(
        &self,
        device: &Device,
        target: ReadBuffer,
        callback: AsyncCallback,
    ) -> UsbResult<()>;

    /// Attempts to select the active configuration for the device.
    fn set_configuration(
        &self,
        device: &Device,
        configuration_index: u8,
        callback: AsyncCallback,
    ) -> UsbResult<()>;

    /// Configures an interface into an alternate setting.
    fn set_alternate_setting(
        &self,
        device: &Device,
        interface: u8,
        setting: u8,
        callback: AsyncCallback,
    ) -> UsbResult<()>;

    /// Attempts to clear the halt condition on a given endpoint address.
    fn clear_halt(
        &self,
        device: &Device,
        endpoint_address: u8,
        callback: AsyncCallback,
    ) -> UsbResult<()>;

    /// Runs one transfer on the given endpoint, in whichever direction the
    /// endpoint address implies; the callback receives the actual length.
    fn transfer(
        &self,
        device: &Device,
        endpoint_address: u8,
        buffer: ReadBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()>;

    /// Reads from an endpoint, for e.g. bulk reads.
    fn read(
        &self,
        device: &Device,
        endpoint_address: u8,
        buffer: ReadBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()>;

    /// Writes to an endpoint, for e.g. bulk writes.
    fn write(
        &self,
        device: &Device,
        endpoint_address: u8,
        data: WriteBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()>;

    /// Writes to an endpoint, appending a zero-length packet when the payload
    /// is a whole multiple of the endpoint's packet size.
    fn write_with_zlp(
        &self,
        device: &Device,
        endpoint_address: u8,
        data: WriteBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()>;
}
