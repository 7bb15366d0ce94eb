//! A scripted backend for exercising the wrapping layer: completes each
//! operation from a queue of canned outcomes and records what it was asked
//! to do.

// Each test binary compiles this module separately; not all of them use
// every helper.
#![allow(dead_code)]

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use usb_futures::backend::{Backend, BackendDevice};
use usb_futures::{
    AsyncCallback, Device, DeviceInformation, Error, Host, ReadBuffer, UsbResult, WriteBuffer,
};

/// One canned outcome for the next scripted operation.
#[derive(Debug)]
pub enum Outcome {
    /// Deposit these bytes into the operation's buffer, when it has one, and
    /// complete with their count.
    Payload(Vec<u8>),

    /// Complete with this count, touching no buffer.
    Count(usize),

    /// Complete with this error.
    Fail(Error),

    /// Refuse the submission itself; the callback is never invoked.
    Refuse(Error),
}

#[derive(Debug, Default)]
pub struct ScriptedBackend {
    outcomes: RefCell<VecDeque<Outcome>>,

    /// Operation log; one line per callback-completion call received.
    pub calls: RefCell<Vec<String>>,
}

impl ScriptedBackend {
    /// Queues the outcome for the next operation. Unscripted operations
    /// complete with `Ok(0)`.
    pub fn script(&self, outcome: Outcome) {
        self.outcomes.borrow_mut().push_back(outcome);
    }

    fn complete(
        &self,
        call: String,
        target: Option<&ReadBuffer>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.calls.borrow_mut().push(call);

        let outcome = self
            .outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or(Outcome::Count(0));

        match outcome {
            Outcome::Payload(bytes) => {
                let count = match target {
                    Some(target) => deposit(target, &bytes),
                    None => bytes.len(),
                };
                callback(Ok(count));
                Ok(())
            }
            Outcome::Count(count) => {
                callback(Ok(count));
                Ok(())
            }
            Outcome::Fail(error) => {
                callback(Err(error));
                Ok(())
            }
            Outcome::Refuse(error) => Err(error),
        }
    }
}

#[derive(Debug)]
struct ScriptedDevice;

impl BackendDevice for ScriptedDevice {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn deposit(target: &ReadBuffer, payload: &[u8]) -> usize {
    let mut guard = target.write().unwrap();
    let data = guard.as_mut();
    let count = payload.len().min(data.len());
    data[..count].copy_from_slice(&payload[..count]);
    count
}

fn buffer_capacity(buffer: &ReadBuffer) -> usize {
    buffer.write().unwrap().as_mut().len()
}

impl Backend for ScriptedBackend {
    fn get_devices(&self) -> UsbResult<Vec<DeviceInformation>> {
        Ok(vec![DeviceInformation {
            vendor_id: 0x1234,
            product_id: 0x5678,
            serial: Some("SCRIPTED".to_string()),
            backend_numeric_location: Some(0),
        }])
    }

    fn open(&self, _information: &DeviceInformation) -> UsbResult<Box<dyn BackendDevice>> {
        Ok(Box::new(ScriptedDevice))
    }

    fn claim_interface(&self, _device: &Device, interface: u8) -> UsbResult<()> {
        self.calls.borrow_mut().push(format!("claim {}", interface));
        Ok(())
    }

    fn release_interface(&self, _device: &Device, interface: u8) -> UsbResult<()> {
        self.calls
            .borrow_mut()
            .push(format!("release {}", interface));
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
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.complete(
            format!(
                "control_read {:#04x} {:#04x} {} {} cap={} timeout={:?}",
                request_type,
                request_number,
                value,
                index,
                buffer_capacity(&target),
                timeout
            ),
            Some(&target),
            callback,
        )
    }

    fn control_write(
        &self,
        _device: &Device,
        request_type: u8,
        request_number: u8,
        value: u16,
        index: u16,
        data: WriteBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.complete(
            format!(
                "control_write {:#04x} {:#04x} {} {} len={} timeout={:?}",
                request_type,
                request_number,
                value,
                index,
                (*data).as_ref().len(),
                timeout
            ),
            None,
            callback,
        )
    }

    fn read_string_descriptor(
        &self,
        _device: &Device,
        index: u8,
        target: ReadBuffer,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.complete(format!("string_descriptor {}", index), Some(&target), callback)
    }

    fn read_bos_descriptor(
        &self,
        _device: &Device,
        target: ReadBuffer,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.complete(
            format!("bos_descriptor cap={}", buffer_capacity(&target)),
            Some(&target),
            callback,
        )
    }

    fn set_configuration(
        &self,
        _device: &Device,
        configuration_index: u8,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.complete(
            format!("set_configuration {}", configuration_index),
            None,
            callback,
        )
    }

    fn set_alternate_setting(
        &self,
        _device: &Device,
        interface: u8,
        setting: u8,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.complete(
            format!("set_alternate_setting {} {}", interface, setting),
            None,
            callback,
        )
    }

    fn clear_halt(
        &self,
        _device: &Device,
        endpoint_address: u8,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.complete(format!("clear_halt {:#04x}", endpoint_address), None, callback)
    }

    fn transfer(
        &self,
        _device: &Device,
        endpoint_address: u8,
        buffer: ReadBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.complete(
            format!(
                "transfer {:#04x} cap={} timeout={:?}",
                endpoint_address,
                buffer_capacity(&buffer),
                timeout
            ),
            Some(&buffer),
            callback,
        )
    }

    fn read(
        &self,
        _device: &Device,
        endpoint_address: u8,
        buffer: ReadBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.complete(
            format!(
                "read {:#04x} cap={} timeout={:?}",
                endpoint_address,
                buffer_capacity(&buffer),
                timeout
            ),
            Some(&buffer),
            callback,
        )
    }

    fn write(
        &self,
        _device: &Device,
        endpoint_address: u8,
        data: WriteBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.complete(
            format!(
                "write {:#04x} len={} timeout={:?}",
                endpoint_address,
                (*data).as_ref().len(),
                timeout
            ),
            None,
            callback,
        )
    }

    fn write_with_zlp(
        &self,
        _device: &Device,
        endpoint_address: u8,
        data: WriteBuffer,
        timeout: Option<Duration>,
        callback: AsyncCallback,
    ) -> UsbResult<()> {
        self.complete(
            format!(
                "write_with_zlp {:#04x} len={} timeout={:?}",
                endpoint_address,
                (*data).as_ref().len(),
                timeout
            ),
            None,
            callback,
        )
    }
}

/// Builds a host over a fresh scripted backend, handing back both.
pub fn scripted_host() -> (Rc<ScriptedBackend>, Host) {
    let backend = Rc::new(ScriptedBackend::default());
    let host = Host::new(backend.clone());
    (backend, host)
}

/// Opens the scripted backend's one device.
pub fn open_scripted(host: &Host) -> Device {
    let info = host
        .all_devices()
        .expect("scripted enumeration cannot fail")
        .remove(0);
    host.open(&info).expect("scripted open cannot fail")
}
