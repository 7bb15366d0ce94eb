//! Future definitions; the machinery behind promise-mode calls.

use std::{fmt, future::Future, pin::Pin};

#[cfg(feature = "async")]
use std::{
    sync::{Arc, Mutex},
    task::Context,
    task::{Poll, Waker},
};

use crate::{AsyncCallback, UsbResult};

/// The future half of a promise-mode operation. Settles with the number of
/// bytes the underlying operation transferred; per-operation payload shaping
/// happens in the calling surface.
pub type OperationFuture = Pin<Box<dyn Future<Output = UsbResult<usize>>>>;

/// Strategy for minting the single-settlement futures behind promise-mode
/// calls.
///
/// The provider in effect is chosen when a [`Host`](crate::Host) is built:
/// an explicitly injected provider wins over the built-in [`WakerFutures`],
/// and if neither is present, promise-mode calls fail synchronously with
/// [`Error::NoAsyncImplementationAvailable`](crate::Error).
pub trait FutureProvider: fmt::Debug {
    /// Mints a linked callback/future pair for a single USB operation.
    ///
    /// Invoking the callback settles the future: an `Err` becomes the
    /// future's rejection value, unmodified, and an `Ok` count becomes its
    /// resolution value. The pair is single-use; the first invocation wins.
    fn operation(&self) -> (AsyncCallback, OperationFuture);
}

// Shared state between a UsbFuture and the backend performing its action.
#[cfg(feature = "async")]
pub(crate) struct UsbFutureState {
    /// Tracks whether the transfer has been completed.
    pending: bool,

    /// The result of the USB operation. Valid only once the operation has
    /// been completed.
    result: Option<UsbResult<usize>>,

    /// If we've been poll()'d, this contains the waker object used to indicate completion.
    waker: Option<Waker>,
}

#[cfg(feature = "async")]
impl UsbFutureState {
    /// Creates the inner data of for a UsbFuture.
    pub(crate) fn new() -> UsbFutureState {
        UsbFutureState {
            pending: true,
            result: None,
            waker: None,
        }
    }

    /// Callback to be issued when the USB operation has been completed.
    /// Settlements after the first are ignored.
    pub(crate) fn complete(&mut self, result: UsbResult<usize>) {
        if !self.pending {
            return;
        }

        self.result = Some(result);
        self.pending = false;

        // If we've already been poll()'d, we'll have been given a waker,
        // which will let us notify the async executor that our future is complete.
        //
        // If we have one, notify it that we're done.
        if let Some(waker) = self.waker.take() {
            waker.wake()
        }
    }
}

/// Core asynchronous Future that waits on the results of USB operations.
#[cfg(feature = "async")]
pub struct UsbFuture {
    /// The state shared between the future and the backend.
    state: Arc<Mutex<UsbFutureState>>,
}

#[cfg(feature = "async")]
impl UsbFuture {
    /// Creates a new UsbFuture, which waits on completion of a USB event.
    pub(crate) fn new() -> UsbFuture {
        UsbFuture {
            state: Arc::new(Mutex::new(UsbFutureState::new())),
        }
    }

    /// Gets an owned handle onto our UsbFutureState.
    pub(crate) fn clone_state(&self) -> Arc<Mutex<UsbFutureState>> {
        Arc::clone(&self.state)
    }
}

#[cfg(feature = "async")]
impl Future for UsbFuture {
    type Output = UsbResult<usize>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.state.lock().unwrap();

        // If our operation is still pending, we'll need to capture the waker,
        // and indicate that we're not done.
        if state.pending {
            // Store the waker for later use...
            state.waker = Some(cx.waker().clone());

            // ... and notify our caller that we're not done yet.
            Poll::Pending
        }
        // Otherwise, return our result, since we're done.
        else {
            Poll::Ready(
                state
                    .result
                    .take()
                    .expect("future was complete without result"),
            )
        }
    }
}

/// The built-in future provider: waker-based futures with no executor
/// dependency. This is the default implementation a [`Host`](crate::Host)
/// hands to its devices.
#[cfg(feature = "async")]
#[derive(Debug, Default)]
pub struct WakerFutures;

#[cfg(feature = "async")]
impl FutureProvider for WakerFutures {
    fn operation(&self) -> (AsyncCallback, OperationFuture) {
        let future = UsbFuture::new();
        let state = future.clone_state();

        let callback: AsyncCallback = Box::new(move |result| {
            state.lock().unwrap().complete(result);
        });

        (callback, Box::pin(future))
    }
}
