//! Callback-mode behavior: the `_cb` surface must be a pure pass-through to
//! the backend, needing no future implementation at all.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{open_scripted, Outcome, ScriptedBackend};
use usb_futures::request::{StandardDeviceRequest, STANDARD_IN_FROM_DEVICE, STANDARD_OUT_TO_DEVICE};
use usb_futures::{
    create_read_buffer, create_write_buffer, AsyncCallback, Error, Host, UsbResult,
};

/// Builds a host with no future implementation at all; the callback surface
/// must not care.
fn callback_only_host() -> (Rc<ScriptedBackend>, Host) {
    let backend = Rc::new(ScriptedBackend::default());
    let host = Host::without_future_provider(backend.clone());
    (backend, host)
}

/// Hands back a callback and the slot its completion lands in.
fn capturing_callback() -> (Rc<RefCell<Option<UsbResult<usize>>>>, AsyncCallback) {
    let slot = Rc::new(RefCell::new(None));
    let callback = {
        let slot = slot.clone();
        Box::new(move |result| *slot.borrow_mut() = Some(result))
    };
    (slot, callback)
}

#[test]
fn control_read_cb_passes_both_arguments_and_completion_through() {
    let (backend, host) = callback_only_host();
    let device = open_scripted(&host);

    backend.script(Outcome::Payload(vec![0xde, 0xad]));

    let target = create_read_buffer(8);
    let (slot, callback) = capturing_callback();

    device
        .control_read_cb(
            STANDARD_IN_FROM_DEVICE,
            StandardDeviceRequest::GetDescriptor.into(),
            0x0100,
            0,
            target.clone(),
            None,
            callback,
        )
        .unwrap();

    // The completion reached our callback directly...
    assert_eq!(*slot.borrow(), Some(Ok(2)));

    // ... the buffer belongs to us and holds the backend's bytes...
    let mut guard = target.write().unwrap();
    assert_eq!(&guard.as_mut()[..2], &[0xde, 0xad]);

    // ... and the backend saw our arguments unchanged.
    assert_eq!(
        backend.calls.borrow()[0],
        "control_read 0x80 0x06 256 0 cap=8 timeout=None"
    );
}

#[test]
fn callback_mode_forwards_errors_verbatim() {
    let (backend, host) = callback_only_host();
    let device = open_scripted(&host);

    backend.script(Outcome::Fail(Error::OsError(-5)));

    let (slot, callback) = capturing_callback();
    device.set_configuration_cb(1, callback).unwrap();

    assert_eq!(*slot.borrow(), Some(Err(Error::OsError(-5))));
}

#[test]
fn callback_mode_returns_the_backend_submission_result() {
    let (backend, host) = callback_only_host();
    let device = open_scripted(&host);
    let interface = device.claim_interface(0).unwrap();

    backend.script(Outcome::Refuse(Error::UnspecifiedOsError));

    let (slot, callback) = capturing_callback();
    let result =
        interface
            .out_endpoint(1)
            .transfer_cb(create_write_buffer(vec![1]), None, callback);

    assert_eq!(result, Err(Error::UnspecifiedOsError));

    // A refused submission never completes.
    assert_eq!(*slot.borrow(), None);
}

#[test]
fn every_operation_reaches_its_backend_counterpart() {
    let (backend, host) = callback_only_host();
    let device = open_scripted(&host);
    let interface = device.claim_interface(0).unwrap();

    device
        .control_write_cb(
            STANDARD_OUT_TO_DEVICE,
            StandardDeviceRequest::SetFeature.into(),
            1,
            0,
            create_write_buffer(vec![0; 4]),
            None,
            Box::new(|_| {}),
        )
        .unwrap();
    device
        .read_string_descriptor_cb(3, create_read_buffer(255), Box::new(|_| {}))
        .unwrap();
    device
        .read_bos_descriptor_cb(create_read_buffer(64), Box::new(|_| {}))
        .unwrap();
    interface
        .set_alternate_setting_cb(1, Box::new(|_| {}))
        .unwrap();

    let in_endpoint = interface.in_endpoint(2);
    in_endpoint.clear_halt_cb(Box::new(|_| {})).unwrap();
    in_endpoint
        .make_transfer_cb(create_read_buffer(16), None, Box::new(|_| {}))
        .unwrap();
    in_endpoint
        .transfer_cb(create_read_buffer(32), None, Box::new(|_| {}))
        .unwrap();

    let out_endpoint = interface.out_endpoint(2);
    out_endpoint
        .transfer_with_zlp_cb(create_write_buffer(vec![0; 512]), None, Box::new(|_| {}))
        .unwrap();

    let calls = backend.calls.borrow();
    assert_eq!(
        *calls,
        vec![
            "claim 0".to_string(),
            "control_write 0x00 0x03 1 0 len=4 timeout=None".to_string(),
            "string_descriptor 3".to_string(),
            "bos_descriptor cap=64".to_string(),
            "set_alternate_setting 0 1".to_string(),
            "clear_halt 0x82".to_string(),
            "transfer 0x82 cap=16 timeout=None".to_string(),
            "read 0x82 cap=32 timeout=None".to_string(),
            "write_with_zlp 0x02 len=512 timeout=None".to_string(),
        ]
    );
}
