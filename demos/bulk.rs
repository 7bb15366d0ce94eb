//! Example that moves bulk data through the loopback device, in both calling
//! conventions.

use std::rc::Rc;

use usb_futures::backend::loopback::LoopbackBackend;
use usb_futures::{create_read_buffer, create_write_buffer, DeviceSelector, Host};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let host = Host::new(Rc::new(LoopbackBackend::default()));
    let info = host.device(&DeviceSelector::default())?;
    let device = host.open(&info)?;

    let interface = device.claim_interface(0)?;
    smol::block_on(interface.set_alternate_setting(0)?)?;

    let out_endpoint = interface.out_endpoint(1);
    let in_endpoint = interface.in_endpoint(1);

    // Promise mode: write a pattern out, then read it back.
    let pattern: Vec<u8> = (0..64).collect();
    smol::block_on(out_endpoint.transfer(create_write_buffer(pattern.clone()), None)?)?;
    let returned = smol::block_on(in_endpoint.transfer(pattern.len(), None)?)?;
    assert_eq!(returned, pattern);
    println!("promise mode: {} bytes round-tripped", returned.len());

    // Callback mode: the same flow, with completion delivered to callbacks.
    out_endpoint.transfer_cb(
        create_write_buffer(pattern.clone()),
        None,
        Box::new(|result| println!("callback mode: write completed with {:?}", result)),
    )?;

    let target = create_read_buffer(pattern.len());
    in_endpoint.transfer_cb(
        target,
        None,
        Box::new(|result| println!("callback mode: read completed with {:?}", result)),
    )?;

    smol::block_on(in_endpoint.clear_halt()?)?;

    Ok(())
}
