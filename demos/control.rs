//! Example that exercises control requests and descriptor reads against the
//! software loopback device.

use std::rc::Rc;

use usb_futures::backend::loopback::LoopbackBackend;
use usb_futures::request::{StandardDeviceRequest, STANDARD_IN_FROM_DEVICE};
use usb_futures::{DeviceSelector, Host};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let host = Host::new(Rc::new(LoopbackBackend::default()));

    // Find the loopback device we're interested in working with...
    let info = host.device(&DeviceSelector {
        vendor_id: Some(0x1209),
        ..Default::default()
    })?;

    // ... open it ...
    let device = host.open(&info)?;

    // ... and ask it some questions, promise-style.
    let product = smol::block_on(device.read_string_descriptor(2)?)?;
    println!("product: {}", product);

    let capabilities = smol::block_on(device.read_capabilities()?)?;
    for capability in capabilities {
        println!(
            "capability {:#04x}: {:02x?}",
            capability.capability_type, capability.data
        );
    }

    let echoed = smol::block_on(device.control_read(
        STANDARD_IN_FROM_DEVICE,
        StandardDeviceRequest::GetStatus.into(),
        0,
        0,
        8,
        None,
    )?)?;
    println!("control read echoed {:02x?}", echoed);

    Ok(())
}
