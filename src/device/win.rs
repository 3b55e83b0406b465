//! Windows low-level mouse hook provider.
//!
//! Installs `WH_MOUSE_LL` on a dedicated message-loop thread. The hook
//! procedure only clamps the point to the monitor work area and queues a raw
//! message; translation happens on the dispatch thread.

use std::sync::OnceLock;
use std::thread;

use crossbeam_channel::Sender;
use windows::Win32::{
    Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, POINT, WPARAM},
    Graphics::Gdi::{GetMonitorInfoW, MonitorFromPoint, MONITORINFO, MONITOR_DEFAULTTONEAREST},
    System::Threading::GetCurrentThreadId,
    UI::{
        Input::KeyboardAndMouse::GetDoubleClickTime,
        WindowsAndMessaging::{
            CallNextHookEx, GetCursorPos, GetMessageW, PeekMessageW, PostThreadMessageW,
            SetWindowsHookExW, UnhookWindowsHookEx, HHOOK, MSG, MSLLHOOKSTRUCT, PM_NOREMOVE,
            WH_MOUSE_LL, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP,
            WM_MOUSEMOVE, WM_RBUTTONDOWN, WM_RBUTTONUP, WM_USER,
        },
    },
};

use super::pump::PumpedDevice;
use super::translator::{EventTranslator, MessageKind, RawMessage};
use super::{DeviceProvider, MouseDelegate, MouseEvent, RawDevice};
use crate::config;
use crate::error::{MouseError, MouseResult, ResultExt};

// Posted to the hook thread to end its message loop
const WM_STOP_HOOK: u32 = WM_USER;

/// Producer side of the pump, read by the hook procedure.
static HOOK_SENDER: OnceLock<Sender<RawMessage>> = OnceLock::new();

/// Provider that installs the process's low-level mouse hook.
#[derive(Debug, Clone)]
pub struct HookProvider {
    pub full_move_resolution: bool,
}

impl Default for HookProvider {
    fn default() -> Self {
        Self {
            full_move_resolution: config::mouse::get_full_move_resolution(),
        }
    }
}

fn message_kind(w_param: WPARAM) -> Option<MessageKind> {
    match w_param.0 as u32 {
        WM_LBUTTONDOWN => Some(MessageKind::LeftDown),
        WM_LBUTTONUP => Some(MessageKind::LeftUp),
        WM_MBUTTONDOWN => Some(MessageKind::MiddleDown),
        WM_MBUTTONUP => Some(MessageKind::MiddleUp),
        WM_RBUTTONDOWN => Some(MessageKind::RightDown),
        WM_RBUTTONUP => Some(MessageKind::RightUp),
        WM_MOUSEMOVE => Some(MessageKind::Move),
        _ => None,
    }
}

unsafe fn clamp_to_work_area(point: POINT) -> (i32, i32) {
    let monitor = MonitorFromPoint(point, MONITOR_DEFAULTTONEAREST);
    let mut info = MONITORINFO {
        cbSize: std::mem::size_of::<MONITORINFO>() as u32,
        ..Default::default()
    };
    if !GetMonitorInfoW(monitor, &mut info).as_bool() {
        return (point.x, point.y);
    }
    let work = info.rcWork;
    (
        point.x.clamp(work.left, work.right.max(work.left)),
        point.y.clamp(work.top, work.bottom.max(work.top)),
    )
}

unsafe extern "system" fn low_level_mouse_proc(
    code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if code >= 0 {
        if let (Some(sender), Some(kind)) = (HOOK_SENDER.get(), message_kind(w_param)) {
            let data = &*(l_param.0 as *const MSLLHOOKSTRUCT);
            let (x, y) = clamp_to_work_area(data.pt);
            let _ = sender.send(RawMessage::new(kind, x, y, data.time as u64));
        }
    }
    CallNextHookEx(HHOOK::default(), code, w_param, l_param)
}

fn run_hook_loop(ready: Sender<Result<u32, String>>) {
    unsafe {
        // Force the thread's message queue into existence before reporting ready
        let mut msg = MSG::default();
        let _ = PeekMessageW(&mut msg, HWND::default(), WM_USER, WM_USER, PM_NOREMOVE);

        let hook = match SetWindowsHookExW(
            WH_MOUSE_LL,
            Some(low_level_mouse_proc),
            HINSTANCE::default(),
            0,
        ) {
            Ok(hook) => hook,
            Err(e) => {
                let _ = ready.send(Err(format!("SetWindowsHookExW failed: {}", e)));
                return;
            }
        };

        let _ = ready.send(Ok(GetCurrentThreadId()));

        while GetMessageW(&mut msg, HWND::default(), 0, 0).as_bool() {
            if msg.message == WM_STOP_HOOK {
                break;
            }
        }

        let _ = UnhookWindowsHookEx(hook);
        log::debug!("[MOUSE] Hook thread exited");
    }
}

/// Pumped device that also owns the hook thread.
struct HookDevice {
    inner: PumpedDevice,
    thread_id: u32,
}

impl Drop for HookDevice {
    fn drop(&mut self) {
        unsafe {
            let _ = PostThreadMessageW(self.thread_id, WM_STOP_HOOK, WPARAM(0), LPARAM(0));
        }
    }
}

impl RawDevice for HookDevice {
    fn is_supported(&self) -> bool {
        self.inner.is_supported()
    }

    fn has_full_move_resolution(&self) -> bool {
        self.inner.has_full_move_resolution()
    }

    fn set_full_move_resolution(&self, value: bool) {
        self.inner.set_full_move_resolution(value);
    }

    fn last_event(&self) -> MouseEvent {
        self.inner.last_event()
    }

    fn set_delegate(&self, delegate: Option<std::sync::Weak<dyn MouseDelegate>>) {
        self.inner.set_delegate(delegate);
    }
}

impl DeviceProvider for HookProvider {
    fn acquire_device(self) -> MouseResult<Box<dyn RawDevice>> {
        let mut point = POINT::default();
        if unsafe { GetCursorPos(&mut point) }.is_err() {
            point = POINT { x: 0, y: 0 };
        }
        let double_click_ms = unsafe { GetDoubleClickTime() } as u64;

        let mut translator = EventTranslator::new(point.x, point.y, double_click_ms);
        translator.set_full_move_resolution(self.full_move_resolution);

        if HOOK_SENDER.get().is_some() {
            return Err(MouseError::ProviderUnavailable(
                "mouse hook already installed".to_string(),
            ));
        }

        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        thread::Builder::new()
            .name("mouse-hook".to_string())
            .spawn(move || run_hook_loop(ready_tx))
            .context("failed to start hook thread")?;

        let thread_id = ready_rx
            .recv()
            .context("hook thread exited")?
            .map_err(MouseError::ProviderUnavailable)?;

        // The hook drops messages until the sender is published
        let stop_hook = || unsafe {
            let _ = PostThreadMessageW(thread_id, WM_STOP_HOOK, WPARAM(0), LPARAM(0));
        };
        let (device, sender) = PumpedDevice::spawn(translator).map_err(|e| {
            stop_hook();
            e
        })?;
        if HOOK_SENDER.set(sender).is_err() {
            stop_hook();
            return Err(MouseError::ProviderUnavailable(
                "mouse hook already installed".to_string(),
            ));
        }

        log::info!(
            "[MOUSE] Low-level hook installed at ({}, {}), double click {}ms",
            point.x,
            point.y,
            double_click_ms
        );
        Ok(Box::new(HookDevice {
            inner: device,
            thread_id,
        }))
    }
}
