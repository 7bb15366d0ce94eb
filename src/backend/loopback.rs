//! A pure-software backend that emulates devices in memory.
//!
//! Endpoint writes land in per-endpoint FIFOs and reads drain them, so data
//! written OUT comes straight back IN; descriptors are canned per profile.
//! Every operation completes synchronously, invoking its callback before the
//! submitting call returns. Useful as a reference [`Backend`] and for
//! exercising both calling conventions without hardware.

use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use log::debug;

use super::{Backend, BackendDevice};
use crate::descriptor::encode_string_descriptor;
use crate::device::{Device, DeviceInformation};
use crate::endpoint::number_for_endpoint_address;
use crate::error::{Error, UsbResult};
use crate::{AsyncCallback, ReadBuffer, WriteBuffer};

/// Description of one emulated device.
#[derive(Debug, Clone)]
pub struct LoopbackProfile {
    /// The Vendor ID the emulated device reports.
    pub vendor_id: u16,

    /// The Product ID the emulated device reports.
    pub product_id: u16,

    /// The serial string reported during enumeration.
    pub serial: Option<String>,

    /// String descriptors by index, starting at index 1; index 0 always
    /// answers with the language table.
    pub strings: Vec<String>,

    /// The raw block that reads of the Binary Object Store return.
    pub bos: Vec<u8>,
}

impl Default for LoopbackProfile {
    fn default() -> LoopbackProfile {
        LoopbackProfile {
            vendor_id: 0x1209,
            product_id: 0x0001,
            serial: Some("LOOPBACK-0".to_string()),
            strings: vec![
                "Loopback Labs".to_string(),
                "Loopback Device".to_string(),
                "LOOPBACK-0".to_string(),
            ],
            // A minimal BOS: one USB 2.0 extension capability.
            bos: vec![
                5, 0x0f, 12, 0, 1, // header, 12 bytes total, one capability
                7, 0x10, 0x02, 0x06, 0x00, 0x00, 0x00,
            ],
        }
    }
}

/// The software backend itself; holds one profile per emulated device.
#[derive(Debug)]
pub struct LoopbackBackend {
    profiles: Vec<LoopbackProfile>,
}

impl LoopbackBackend {
    /// Creates a backend emulating the given devices.
    pub fn new(profiles: Vec<LoopbackProfile>) -> LoopbackBackend {
        LoopbackBackend { profiles }
    }
}

impl Default for LoopbackBackend {
    /// A backend emulating a single default device.
    fn default() -> LoopbackBackend {
        LoopbackBackend::new(vec![LoopbackProfile::default()])
    }
}

/// Per-device mutable state; interior-mutable so operations can run off
/// shared device handles.
#[derive(Debug, Default)]
struct LoopbackState {
    configuration: u8,
    claimed: Vec<u8>,
    alternate_settings: HashMap<u8, u8>,
    fifos: HashMap<u8, VecDeque<u8>>,
}

/// Internal type storing the state for one emulated device.
#[derive(Debug)]
struct LoopbackDevice {
    profile: LoopbackProfile,
    state: RefCell<LoopbackState>,
}

impl BackendDevice for LoopbackDevice {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Recovers our own device state from an opaque device handle.
fn loopback_device(device: &Device) -> &LoopbackDevice {
    device
        .backend_device()
        .as_any()
        .downcast_ref::<LoopbackDevice>()
        .expect("device was not opened by the loopback backend")
}

/// Copies as much of `payload` as fits into the caller's buffer; hands back
/// the amount deposited.
fn deposit(target: &ReadBuffer, payload: &[u8]) -> usize {
    let mut guard = target.write().unwrap();
    let data = guard.as_mut();
    let count = payload.len().min(data.len());
    data[..count].copy_from_slice(&payload[..count]);
    count
}

/// Drains one endpoint FIFO into the caller's buffer.
fn drain(state: &mut LoopbackState, endpoint_number: u8, target: &ReadBuffer) -> usize {
    let fifo = state.fifos.entry(endpoint_number).or_default();
    let mut guard = target.write().unwrap();
    let data = guard.as_mut();

    let count = fifo.len().min(data.len());
    for slot in data[..count].iter_mut() {
        // Unwrap is fine: count is bounded by the FIFO's length.
        *slot = fifo.pop_front().unwrap();
    }

    count
}

impl Backend for LoopbackBackend {
    fn get_devices(&self) -> UsbResult<Vec<DeviceInformation>> {
        Ok(self
            .profiles
            .iter()
            .enumerate()
            .map(|(slot, profile)| DeviceInformation {
                vendor_id: profile.vendor_id,
                product_id: profile.product_id,
                serial: profile.serial.clone(),
                backend_numeric_location: Some(slot as u64),
            })
            .collect())
    }

    fn open(&self, information: &DeviceInformation) -> UsbResult<Box<dyn BackendDevice>> {
        let slot = information
            .backend_numeric_location
            .ok_or(Error::DeviceNotFound)?;

        let profile = self
            .profiles
            .get(slot as usize)
            .ok_or(Error::DeviceNotFound)?;

        Ok(Box::new(LoopbackDevice {
            profile: profile.clone(),
            state: RefCell::new(LoopbackState::default()),
        }))
    }

    fn claim_interface(&self, device: &Device, interface: u8) -> UsbResult<()> {
        let mut state = loopback_device(device).state.borrow_mut();

        if state.claimed.contains(&interface) {
            return Err(Error::InterfaceBusy);
        }

        state.claimed.push(interface);
        Ok(())
    }

    fn release_interface(&self, device: &Device, interface: u8) -> UsbResult<()> {
        let mut state = loopback_device(device).state.borrow_mut();
        state.claimed.retain(|claimed| *claimed != interface);
        Ok(())
    }

    fn control_read(
        &self,
        _device: &Device,
        request_type: u8,
        request_number: u8,
        value: u16,
        index: u16,
        target: ReadBuffer,
        _timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        // The loopback device answers control reads by echoing the setup
        // packet it was handed, wLength included.
        let capacity = {
            let mut guard = target.write().unwrap();
            guard.as_mut().len() as u16
        };

        let mut setup = Vec::with_capacity(8);
        setup.push(request_type);
        setup.push(request_number);
        setup.extend_from_slice(&value.to_le_bytes());
        setup.extend_from_slice(&index.to_le_bytes());
        setup.extend_from_slice(&capacity.to_le_bytes());

        let count = deposit(&target, &setup);
        debug!("loopback control read: {} bytes echoed", count);

        callback(Ok(count));
        Ok(())
    }

    fn control_write(
        &self,
        _device: &Device,
        _request_type: u8,
        request_number: u8,
        _value: u16,
        _index: u16,
        data: WriteBuffer,
        _timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        let count = (*data).as_ref().len();
        debug!(
            "loopback control write: request {:#04x}, {} bytes accepted",
            request_number, count
        );

        callback(Ok(count));
        Ok(())
    }

    fn read_string_descriptor(
        &self,
        device: &Device,
        index: u8,
        target: ReadBuffer,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        let loopback = loopback_device(device);

        // Index zero is the language table; we always claim English (US).
        let raw = if index == 0 {
            vec![4, 0x03, 0x09, 0x04]
        } else {
            match loopback.profile.strings.get(index as usize - 1) {
                Some(string) => encode_string_descriptor(string),
                None => {
                    debug!("loopback: no string descriptor at index {}", index);
                    callback(Err(Error::UnspecifiedOsError));
                    return Ok(());
                }
            }
        };

        let count = deposit(&target, &raw);
        callback(Ok(count));
        Ok(())
    }

    fn read_bos_descriptor(
        &self,
        device: &Device,
        target: ReadBuffer,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        let loopback = loopback_device(device);
        let count = deposit(&target, &loopback.profile.bos);

        callback(Ok(count));
        Ok(())
    }

    fn set_configuration(
        &self,
        device: &Device,
        configuration_index: u8,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        let previous = {
            let mut state = loopback_device(device).state.borrow_mut();
            std::mem::replace(&mut state.configuration, configuration_index)
        };
        debug!(
            "loopback: configuration {} -> {}",
            previous, configuration_index
        );

        callback(Ok(0));
        Ok(())
    }

    fn set_alternate_setting(
        &self,
        device: &Device,
        interface: u8,
        setting: u8,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        let previous = loopback_device(device)
            .state
            .borrow_mut()
            .alternate_settings
            .insert(interface, setting);
        debug!(
            "loopback: interface {} alternate setting {} -> {}",
            interface,
            previous.unwrap_or(0),
            setting
        );

        callback(Ok(0));
        Ok(())
    }

    fn clear_halt(
        &self,
        device: &Device,
        endpoint_address: u8,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        // Clearing a halt drops anything queued on the endpoint.
        loopback_device(device)
            .state
            .borrow_mut()
            .fifos
            .remove(&number_for_endpoint_address(endpoint_address));

        callback(Ok(0));
        Ok(())
    }

    fn transfer(
        &self,
        device: &Device,
        endpoint_address: u8,
        buffer: ReadBuffer,
        _timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        // Borrows end before the callback runs; callbacks may re-enter us.
        let count = {
            let mut state = loopback_device(device).state.borrow_mut();
            drain(
                &mut state,
                number_for_endpoint_address(endpoint_address),
                &buffer,
            )
        };

        callback(Ok(count));
        Ok(())
    }

    fn read(
        &self,
        device: &Device,
        endpoint_address: u8,
        buffer: ReadBuffer,
        _timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        let count = {
            let mut state = loopback_device(device).state.borrow_mut();
            drain(
                &mut state,
                number_for_endpoint_address(endpoint_address),
                &buffer,
            )
        };
        debug!(
            "loopback read: {} bytes from endpoint {:#04x}",
            count, endpoint_address
        );

        callback(Ok(count));
        Ok(())
    }

    fn write(
        &self,
        device: &Device,
        endpoint_address: u8,
        data: WriteBuffer,
        _timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        let payload = (*data).as_ref();
        {
            let mut state = loopback_device(device).state.borrow_mut();
            state
                .fifos
                .entry(number_for_endpoint_address(endpoint_address))
                .or_default()
                .extend(payload.iter().copied());
        }
        debug!(
            "loopback write: {} bytes to endpoint {:#04x}",
            payload.len(),
            endpoint_address
        );

        callback(Ok(payload.len()));
        Ok(())
    }

    fn write_with_zlp(
        &self,
        device: &Device,
        endpoint_address: u8,
        data: WriteBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        debug!(
            "loopback write: zero-length-packet termination requested on {:#04x}",
            endpoint_address
        );

        // The FIFO model has no packet boundaries, so the terminating packet
        // itself is a no-op here.
        self.write(device, endpoint_address, data, timeout, callback)
    }
}
