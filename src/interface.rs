//! Claimed-interface handles and their operations.

use std::future::Future;

use log::warn;

use crate::device::Device;
use crate::endpoint::{InEndpoint, OutEndpoint};
use crate::error::UsbResult;
#[cfg(feature = "callbacks")]
use crate::AsyncCallback;

/// A claimed interface on an open [`Device`]. The claim is held for the
/// lifetime of this handle and released when it drops.
#[derive(Debug)]
pub struct Interface<'dev> {
    /// The device the claim was taken on.
    device: &'dev Device,

    /// The interface number (bInterfaceNumber) claimed.
    number: u8,
}

impl<'dev> Interface<'dev> {
    pub(crate) fn new(device: &'dev Device, number: u8) -> Interface<'dev> {
        Interface { device, number }
    }

    /// The interface number this claim covers.
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Configures this interface into an alternate setting.
    pub fn set_alternate_setting(
        &self,
        setting: u8,
    ) -> UsbResult<impl Future<Output = UsbResult<()>>> {
        let (callback, operation) = self.device.operation_pair()?;

        self.device
            .backend
            .set_alternate_setting(self.device, self.number, setting, callback)?;

        Ok(async move {
            operation.await?;
            Ok(())
        })
    }

    /// Configures an alternate setting in callback style; a pure
    /// pass-through to the backend.
    #[cfg(feature = "callbacks")]
    pub fn set_alternate_setting_cb(&self, setting: u8, callback: AsyncCallback) -> UsbResult<()> {
        self.device
            .backend
            .set_alternate_setting(self.device, self.number, setting, callback)
    }

    /// Hands back an IN endpoint belonging to this interface.
    /// `number` is the endpoint number; the direction bit is applied here.
    pub fn in_endpoint(&self, number: u8) -> InEndpoint<'_> {
        InEndpoint::new(self.device, number)
    }

    /// Hands back an OUT endpoint belonging to this interface.
    pub fn out_endpoint(&self, number: u8) -> OutEndpoint<'_> {
        OutEndpoint::new(self.device, number)
    }
}

impl Drop for Interface<'_> {
    fn drop(&mut self) {
        if let Err(error) = self
            .device
            .backend
            .release_interface(self.device, self.number)
        {
            warn!("failed to release interface {}: {}", self.number, error);
        }
    }
}
