//! Message pump shared by the device providers.
//!
//! Producer threads (hook loop, poller) push [`RawMessage`]s into a crossbeam
//! channel. A single dispatch thread drains whatever is queued as one batch,
//! translates it and forwards the resulting events to the delegate. Batching
//! is what lets bursts of moves collapse into one event.

use std::sync::{Arc, Weak};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::{Mutex, RwLock};

use super::translator::{EventTranslator, RawMessage};
use super::{MouseDelegate, MouseEvent, RawDevice};
use crate::error::{MouseResult, ResultExt};

/// Translator state plus the current delegate.
pub struct DeviceCore {
    translator: Mutex<EventTranslator>,
    delegate: RwLock<Option<Weak<dyn MouseDelegate>>>,
}

impl DeviceCore {
    pub fn new(translator: EventTranslator) -> Self {
        Self {
            translator: Mutex::new(translator),
            delegate: RwLock::new(None),
        }
    }

    /// Translate `batch` and hand the events to the delegate, if one is set.
    ///
    /// The delegate runs after the translator lock is released.
    pub fn dispatch(&self, batch: Vec<RawMessage>) {
        let mut events = Vec::with_capacity(batch.len());
        self.translator
            .lock()
            .translate_batch(batch, |event| events.push(event));

        let delegate = self.delegate.read().as_ref().and_then(Weak::upgrade);
        if let Some(delegate) = delegate {
            for event in events {
                delegate.emit_mouse_event(event);
            }
        }
    }

    pub fn has_full_move_resolution(&self) -> bool {
        self.translator.lock().full_move_resolution()
    }

    pub fn set_full_move_resolution(&self, value: bool) {
        log::debug!("[MOUSE] full move resolution = {}", value);
        self.translator.lock().set_full_move_resolution(value);
    }

    pub fn last_event(&self) -> MouseEvent {
        self.translator.lock().last_event()
    }

    pub fn set_delegate(&self, delegate: Option<Weak<dyn MouseDelegate>>) {
        *self.delegate.write() = delegate;
    }
}

fn run_dispatcher(core: Arc<DeviceCore>, rx: Receiver<RawMessage>) {
    while let Ok(first) = rx.recv() {
        let mut batch = vec![first];
        batch.extend(rx.try_iter());
        core.dispatch(batch);
    }
    log::debug!("[MOUSE] Dispatcher stopped, all producers gone");
}

/// Raw device backed by a message pump.
pub struct PumpedDevice {
    core: Arc<DeviceCore>,
}

impl PumpedDevice {
    /// Start the dispatch thread and return the device with the producer side of the pump.
    pub fn spawn(translator: EventTranslator) -> MouseResult<(Self, Sender<RawMessage>)> {
        let core = Arc::new(DeviceCore::new(translator));
        let (tx, rx) = crossbeam_channel::unbounded();

        let dispatch_core = Arc::clone(&core);
        thread::Builder::new()
            .name("mouse-dispatch".to_string())
            .spawn(move || run_dispatcher(dispatch_core, rx))
            .context("failed to start dispatcher")?;

        Ok((Self { core }, tx))
    }

    pub fn core(&self) -> &Arc<DeviceCore> {
        &self.core
    }
}

impl RawDevice for PumpedDevice {
    fn is_supported(&self) -> bool {
        true
    }

    fn has_full_move_resolution(&self) -> bool {
        self.core.has_full_move_resolution()
    }

    fn set_full_move_resolution(&self, value: bool) {
        self.core.set_full_move_resolution(value);
    }

    fn last_event(&self) -> MouseEvent {
        self.core.last_event()
    }

    fn set_delegate(&self, delegate: Option<Weak<dyn MouseDelegate>>) {
        self.core.set_delegate(delegate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::translator::MessageKind;
    use crate::device::MouseEventKind;
    use crossbeam_channel::Sender as EventSender;
    use std::time::Duration;

    struct ChannelDelegate(EventSender<MouseEvent>);

    impl MouseDelegate for ChannelDelegate {
        fn emit_mouse_event(&self, event: MouseEvent) {
            let _ = self.0.send(event);
        }
    }

    #[test]
    fn test_dispatch_without_delegate_keeps_state() {
        let core = DeviceCore::new(EventTranslator::new(0, 0, 500));
        core.dispatch(vec![RawMessage::new(MessageKind::Move, 4, 2, 0)]);
        assert_eq!(core.last_event().screen_x, 4);
    }

    #[test]
    fn test_dispatch_reaches_delegate() {
        let core = DeviceCore::new(EventTranslator::new(0, 0, 500));
        let (tx, rx) = crossbeam_channel::unbounded();
        let delegate: Arc<dyn MouseDelegate> = Arc::new(ChannelDelegate(tx));
        core.set_delegate(Some(Arc::downgrade(&delegate)));

        core.dispatch(vec![RawMessage::new(MessageKind::LeftDown, 1, 1, 0)]);

        let event = rx.try_recv().unwrap();
        assert!(event.kinds.contains(MouseEventKind::Down));
    }

    #[test]
    fn test_dropped_delegate_is_ignored() {
        let core = DeviceCore::new(EventTranslator::new(0, 0, 500));
        let (tx, rx) = crossbeam_channel::unbounded();
        let delegate: Arc<dyn MouseDelegate> = Arc::new(ChannelDelegate(tx));
        core.set_delegate(Some(Arc::downgrade(&delegate)));
        drop(delegate);

        core.dispatch(vec![RawMessage::new(MessageKind::LeftDown, 1, 1, 0)]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_pumped_device_forwards_from_producer() {
        let (device, producer) = PumpedDevice::spawn(EventTranslator::new(0, 0, 500)).unwrap();
        let (tx, rx) = crossbeam_channel::unbounded();
        let delegate: Arc<dyn MouseDelegate> = Arc::new(ChannelDelegate(tx));
        device.set_delegate(Some(Arc::downgrade(&delegate)));
        device.set_full_move_resolution(true);
        assert!(device.has_full_move_resolution());

        producer
            .send(RawMessage::new(MessageKind::RightDown, 5, 5, 0))
            .unwrap();
        producer.send(RawMessage::new(MessageKind::RightUp, 5, 5, 10)).unwrap();

        let down = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let up = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(down.kinds.contains(MouseEventKind::Down));
        assert!(up.kinds.contains(MouseEventKind::Click));
        assert!(device.is_supported());
    }
}
