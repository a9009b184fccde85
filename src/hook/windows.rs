//! Low-level keyboard hook for Windows (`WH_KEYBOARD_LL`).
//!
//! The hook lives on a dedicated thread that owns the registration and a
//! message pump; Windows delivers every keystroke to `keyboard_proc` on
//! that thread before the foreground application sees it. Returning a
//! non-zero result from the proc swallows the event.
//!
//! Windows silently removes a low-level hook whose proc exceeds its
//! response deadline, so the proc does nothing beyond building the event
//! and calling the decision function.

use super::{DecisionFn, HookBackend, HookError};
use crate::engine::Decision;
use crate::keys::{Key, KeyEvent};

use parking_lot::RwLock;
use std::sync::atomic::{AtomicIsize, AtomicU32, Ordering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::{GetAsyncKeyState, VK_CONTROL, VK_MENU, VK_SHIFT};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
    TranslateMessage, UnhookWindowsHookEx, HHOOK, KBDLLHOOKSTRUCT, MSG, WH_KEYBOARD_LL,
    WM_KEYDOWN, WM_QUIT, WM_SYSKEYDOWN,
};

// The hook proc carries no user pointer, so the handle and the decision
// function are process-global. Only one backend instance installs at a
// time; HookService enforces that.
static HOOK_HANDLE: AtomicIsize = AtomicIsize::new(0);
static HOOK_THREAD_ID: AtomicU32 = AtomicU32::new(0);
static DECIDE: RwLock<Option<DecisionFn>> = RwLock::new(None);

/// `WH_KEYBOARD_LL` hook callback, invoked synchronously per keystroke.
unsafe extern "system" fn keyboard_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let hook = HHOOK(HOOK_HANDLE.load(Ordering::SeqCst) as *mut _);

    // Negative codes must pass through per the hook contract.
    if code < 0 {
        return CallNextHookEx(hook, code, wparam, lparam);
    }

    let msg = wparam.0 as u32;
    if msg == WM_KEYDOWN || msg == WM_SYSKEYDOWN {
        let kbd = &*(lparam.0 as *const KBDLLHOOKSTRUCT);
        let key = vk_to_key(kbd.vkCode);

        let ctrl = GetAsyncKeyState(VK_CONTROL.0 as i32) < 0;
        let alt = GetAsyncKeyState(VK_MENU.0 as i32) < 0;
        let shift = GetAsyncKeyState(VK_SHIFT.0 as i32) < 0;
        let event = KeyEvent::new(key, ctrl, alt, shift);

        let decision = DECIDE.read().as_ref().map(|decide| decide(&event));
        if decision == Some(Decision::Block) {
            return LRESULT(1);
        }
    }

    CallNextHookEx(hook, code, wparam, lparam)
}

/// Map a Windows virtual-key code to a logical key.
fn vk_to_key(vk: u32) -> Key {
    match vk {
        // Letters
        0x41 => Key::A,
        0x42 => Key::B,
        0x43 => Key::C,
        0x44 => Key::D,
        0x45 => Key::E,
        0x46 => Key::F,
        0x47 => Key::G,
        0x48 => Key::H,
        0x49 => Key::I,
        0x4A => Key::J,
        0x4B => Key::K,
        0x4C => Key::L,
        0x4D => Key::M,
        0x4E => Key::N,
        0x4F => Key::O,
        0x50 => Key::P,
        0x51 => Key::Q,
        0x52 => Key::R,
        0x53 => Key::S,
        0x54 => Key::T,
        0x55 => Key::U,
        0x56 => Key::V,
        0x57 => Key::W,
        0x58 => Key::X,
        0x59 => Key::Y,
        0x5A => Key::Z,

        // Top-row digits
        0x30 => Key::Digit0,
        0x31 => Key::Digit1,
        0x32 => Key::Digit2,
        0x33 => Key::Digit3,
        0x34 => Key::Digit4,
        0x35 => Key::Digit5,
        0x36 => Key::Digit6,
        0x37 => Key::Digit7,
        0x38 => Key::Digit8,
        0x39 => Key::Digit9,

        // Function keys
        0x70 => Key::F1,
        0x71 => Key::F2,
        0x72 => Key::F3,
        0x73 => Key::F4,
        0x74 => Key::F5,
        0x75 => Key::F6,
        0x76 => Key::F7,
        0x77 => Key::F8,
        0x78 => Key::F9,
        0x79 => Key::F10,
        0x7A => Key::F11,
        0x7B => Key::F12,
        0x7C => Key::F13,
        0x7D => Key::F14,
        0x7E => Key::F15,
        0x7F => Key::F16,
        0x80 => Key::F17,
        0x81 => Key::F18,
        0x82 => Key::F19,
        0x83 => Key::F20,
        0x84 => Key::F21,
        0x85 => Key::F22,
        0x86 => Key::F23,
        0x87 => Key::F24,

        // Editing and whitespace
        0x09 => Key::Tab,
        0x0D => Key::Enter,
        0x20 => Key::Space,
        0x08 => Key::Backspace,
        0x2E => Key::Delete,
        0x2D => Key::Insert,
        0x1B => Key::Escape,

        // Navigation
        0x24 => Key::Home,
        0x23 => Key::End,
        0x21 => Key::PageUp,
        0x22 => Key::PageDown,
        0x26 => Key::Up,
        0x28 => Key::Down,
        0x25 => Key::Left,
        0x27 => Key::Right,

        // Locks and system keys
        0x14 => Key::CapsLock,
        0x90 => Key::NumLock,
        0x91 => Key::ScrollLock,
        0x2C => Key::PrintScreen,
        0x13 => Key::Pause,
        0x5D => Key::Apps,

        // Modifiers
        0xA0 => Key::LShift,
        0xA1 => Key::RShift,
        0xA2 => Key::LCtrl,
        0xA3 => Key::RCtrl,
        0xA4 => Key::LAlt,
        0xA5 => Key::RAlt,
        0x5B => Key::LWin,
        0x5C => Key::RWin,

        other => Key::Other(other),
    }
}

pub struct WindowsHookBackend {
    pump_thread: Option<JoinHandle<()>>,
}

impl WindowsHookBackend {
    pub fn new() -> Self {
        Self { pump_thread: None }
    }
}

impl Default for WindowsHookBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HookBackend for WindowsHookBackend {
    fn install(&mut self, decide: DecisionFn) -> Result<(), HookError> {
        *DECIDE.write() = Some(decide);

        // Registration happens on the pump thread; report its outcome
        // synchronously through a one-shot channel.
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        let handle = thread::spawn(move || unsafe {
            let hinstance = match GetModuleHandleW(None) {
                Ok(h) => h,
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };

            let hook = match SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_proc), hinstance, 0) {
                Ok(h) => h,
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };

            HOOK_HANDLE.store(hook.0 as isize, Ordering::SeqCst);
            HOOK_THREAD_ID.store(GetCurrentThreadId(), Ordering::SeqCst);
            let _ = ready_tx.send(Ok(()));

            // Low-level hooks require a message pump on the owning thread.
            let mut msg = MSG::default();
            while GetMessageW(&mut msg, None, 0, 0).into() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }

            let hook = HHOOK(HOOK_HANDLE.swap(0, Ordering::SeqCst) as *mut _);
            if !hook.0.is_null() {
                if let Err(e) = UnhookWindowsHookEx(hook) {
                    crate::warn!("UnhookWindowsHookEx failed: {}", e);
                }
            }
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.pump_thread = Some(handle);
                Ok(())
            }
            Ok(Err(msg)) => {
                let _ = handle.join();
                *DECIDE.write() = None;
                Err(HookError::RegistrationFailed(msg))
            }
            Err(_) => {
                let _ = handle.join();
                *DECIDE.write() = None;
                Err(HookError::RegistrationFailed(
                    "hook thread exited before registering".to_string(),
                ))
            }
        }
    }

    fn uninstall(&mut self) {
        let thread_id = HOOK_THREAD_ID.swap(0, Ordering::SeqCst);
        if thread_id != 0 {
            // Ends the pump; the thread unhooks on its way out.
            unsafe {
                let _ = PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
            }
        }
        if let Some(handle) = self.pump_thread.take() {
            let _ = handle.join();
        }
        *DECIDE.write() = None;
    }

    fn is_installed(&self) -> bool {
        self.pump_thread.is_some()
    }
}

impl Drop for WindowsHookBackend {
    fn drop(&mut self) {
        self.uninstall();
    }
}
