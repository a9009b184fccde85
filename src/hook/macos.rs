//! CGEventTap keyboard hook for macOS.
//!
//! A dedicated thread creates the tap and services its `CFRunLoop`; macOS
//! invokes the tap callback synchronously for every key-down before the
//! frontmost application sees it. Returning null from the callback
//! consumes the event.
//!
//! Requires the Accessibility permission (System Settings > Privacy &
//! Security > Accessibility). macOS disables a tap whose callback runs too
//! long, so the callback does nothing beyond building the event and
//! calling the decision function.

use super::{DecisionFn, HookBackend, HookError};
use crate::engine::Decision;
use crate::keys::{Key, KeyEvent};

use core_foundation::base::TCFType;
use core_foundation::mach_port::{CFMachPort, CFMachPortRef};
use core_foundation::runloop::{kCFRunLoopDefaultMode, CFRunLoop, CFRunLoopStop};
use core_graphics::event::{
    CGEvent, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement, CGEventTapProxy,
    CGEventType, EventField,
};
use foreign_types::ForeignType;
use std::ffi::c_void;
use std::mem::ManuallyDrop;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

type CGEventMask = u64;

type CGEventTapCallBackInternal = unsafe extern "C" fn(
    proxy: CGEventTapProxy,
    event_type: CGEventType,
    event: *mut c_void,
    user_info: *mut c_void,
) -> *mut c_void;

#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGEventTapCreate(
        tap: CGEventTapLocation,
        place: CGEventTapPlacement,
        options: CGEventTapOptions,
        events_of_interest: CGEventMask,
        callback: CGEventTapCallBackInternal,
        user_info: *mut c_void,
    ) -> CFMachPortRef;

    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
}

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXIsProcessTrusted() -> bool;
}

// CGEventType raw values (CGEventType lacks PartialEq).
const EVENT_KEY_DOWN: u32 = 10;
const EVENT_TAP_DISABLED_BY_TIMEOUT: u32 = 0xFFFFFFFE;
const EVENT_TAP_DISABLED_BY_USER_INPUT: u32 = 0xFFFFFFFF;

// Modifier masks from CGEventFlags.
const FLAG_MASK_SHIFT: u64 = 0x00020000;
const FLAG_MASK_CONTROL: u64 = 0x00040000;
const FLAG_MASK_ALTERNATE: u64 = 0x00080000;

/// Context handed to the tap callback through its user-info pointer.
struct TapContext {
    decide: DecisionFn,
}

/// Map a macOS virtual key code to a logical key. Command keys map to
/// `LWin`/`RWin`: the blocking rules treat Command as the Windows key's
/// counterpart.
fn keycode_to_key(key_code: u32) -> Key {
    match key_code {
        // Letters (ANSI layout codes)
        0 => Key::A,
        1 => Key::S,
        2 => Key::D,
        3 => Key::F,
        4 => Key::H,
        5 => Key::G,
        6 => Key::Z,
        7 => Key::X,
        8 => Key::C,
        9 => Key::V,
        11 => Key::B,
        12 => Key::Q,
        13 => Key::W,
        14 => Key::E,
        15 => Key::R,
        16 => Key::Y,
        17 => Key::T,
        31 => Key::O,
        32 => Key::U,
        34 => Key::I,
        35 => Key::P,
        37 => Key::L,
        38 => Key::J,
        40 => Key::K,
        45 => Key::N,
        46 => Key::M,

        // Top-row digits
        29 => Key::Digit0,
        18 => Key::Digit1,
        19 => Key::Digit2,
        20 => Key::Digit3,
        21 => Key::Digit4,
        23 => Key::Digit5,
        22 => Key::Digit6,
        26 => Key::Digit7,
        28 => Key::Digit8,
        25 => Key::Digit9,

        // Editing and whitespace
        48 => Key::Tab,
        36 => Key::Enter,
        49 => Key::Space,
        51 => Key::Backspace,
        117 => Key::Delete,
        53 => Key::Escape,

        // Navigation
        115 => Key::Home,
        119 => Key::End,
        116 => Key::PageUp,
        121 => Key::PageDown,
        126 => Key::Up,
        125 => Key::Down,
        123 => Key::Left,
        124 => Key::Right,

        // Function keys
        122 => Key::F1,
        120 => Key::F2,
        99 => Key::F3,
        118 => Key::F4,
        96 => Key::F5,
        97 => Key::F6,
        98 => Key::F7,
        100 => Key::F8,
        101 => Key::F9,
        109 => Key::F10,
        103 => Key::F11,
        111 => Key::F12,
        105 => Key::F13,
        107 => Key::F14,
        113 => Key::F15,
        106 => Key::F16,
        64 => Key::F17,
        79 => Key::F18,
        80 => Key::F19,

        // Modifiers
        56 => Key::LShift,
        60 => Key::RShift,
        59 => Key::LCtrl,
        62 => Key::RCtrl,
        58 => Key::LAlt,
        61 => Key::RAlt,
        55 => Key::LWin, // Left Command
        54 => Key::RWin, // Right Command
        57 => Key::CapsLock,

        other => Key::Other(other),
    }
}

/// Raw tap callback. Null return consumes the event; returning the event
/// pointer passes it through.
unsafe extern "C" fn tap_callback(
    _proxy: CGEventTapProxy,
    event_type: CGEventType,
    event_ref: *mut c_void,
    user_info: *mut c_void,
) -> *mut c_void {
    let context = &*(user_info as *const TapContext);
    let event = ManuallyDrop::new(CGEvent::from_ptr(event_ref as *mut _));

    let event_type_raw = event_type as u32;
    if event_type_raw == EVENT_TAP_DISABLED_BY_TIMEOUT
        || event_type_raw == EVENT_TAP_DISABLED_BY_USER_INPUT
    {
        crate::warn!("event tap disabled by the OS (type {})", event_type_raw);
        return event_ref;
    }
    if event_type_raw != EVENT_KEY_DOWN {
        return event_ref;
    }

    let start = std::time::Instant::now();

    // The decision function is total, but the FFI conversion around it is
    // not allowed to unwind into the OS either.
    let decision = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let key_code =
            event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE) as u32;
        let flags = event.get_flags().bits();

        let key = keycode_to_key(key_code);
        let key_event = KeyEvent::new(
            key,
            (flags & FLAG_MASK_CONTROL) != 0,
            (flags & FLAG_MASK_ALTERNATE) != 0,
            (flags & FLAG_MASK_SHIFT) != 0,
        );

        (context.decide)(&key_event)
    }))
    .unwrap_or(Decision::PassThrough);

    let elapsed = start.elapsed();
    if elapsed.as_millis() > 10 {
        crate::warn!("tap callback took {:?}, risks tap removal", elapsed);
    }

    match decision {
        Decision::Block => std::ptr::null_mut(),
        Decision::PassThrough => event_ref,
    }
}

/// Runs the tap on its own thread until the run loop is stopped.
fn run_tap_loop(
    running: Arc<AtomicBool>,
    run_loop_slot: Arc<Mutex<Option<CFRunLoop>>>,
    context: Box<TapContext>,
    ready_tx: mpsc::Sender<Result<(), String>>,
) {
    let event_mask: CGEventMask = 1 << CGEventType::KeyDown as u64;
    let context_ptr = Box::into_raw(context);

    let tap_ref = unsafe {
        CGEventTapCreate(
            CGEventTapLocation::HID,
            CGEventTapPlacement::HeadInsertEventTap,
            CGEventTapOptions::Default,
            event_mask,
            tap_callback,
            context_ptr as *mut c_void,
        )
    };

    if tap_ref.is_null() {
        unsafe {
            drop(Box::from_raw(context_ptr));
        }
        let _ = ready_tx.send(Err(
            "CGEventTapCreate failed; check the Accessibility permission".to_string(),
        ));
        return;
    }

    let mach_port = unsafe { CFMachPort::wrap_under_create_rule(tap_ref) };
    let run_loop_source = match mach_port.create_runloop_source(0) {
        Ok(source) => source,
        Err(_) => {
            unsafe {
                drop(Box::from_raw(context_ptr));
            }
            let _ = ready_tx.send(Err("failed to create run loop source".to_string()));
            return;
        }
    };

    let run_loop = CFRunLoop::get_current();
    if let Ok(mut guard) = run_loop_slot.lock() {
        *guard = Some(run_loop.clone());
    }

    run_loop.add_source(&run_loop_source, unsafe { kCFRunLoopDefaultMode });
    unsafe {
        CGEventTapEnable(mach_port.as_concrete_TypeRef(), true);
    }
    let _ = ready_tx.send(Ok(()));

    // Run in one-second slices so a missed CFRunLoopStop cannot park the
    // thread forever.
    while running.load(Ordering::SeqCst) {
        CFRunLoop::run_in_mode(
            unsafe { kCFRunLoopDefaultMode },
            Duration::from_secs(1),
            false,
        );
    }

    run_loop.remove_source(&run_loop_source, unsafe { kCFRunLoopDefaultMode });
    unsafe {
        CGEventTapEnable(mach_port.as_concrete_TypeRef(), false);
        drop(Box::from_raw(context_ptr));
    }
}

pub struct EventTapBackend {
    running: Arc<AtomicBool>,
    run_loop: Arc<Mutex<Option<CFRunLoop>>>,
    tap_thread: Option<JoinHandle<()>>,
}

impl EventTapBackend {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            run_loop: Arc::new(Mutex::new(None)),
            tap_thread: None,
        }
    }
}

impl Default for EventTapBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HookBackend for EventTapBackend {
    fn install(&mut self, decide: DecisionFn) -> Result<(), HookError> {
        if !unsafe { AXIsProcessTrusted() } {
            return Err(HookError::RegistrationFailed(
                "Accessibility permission not granted".to_string(),
            ));
        }

        self.running.store(true, Ordering::SeqCst);

        let (ready_tx, ready_rx) = mpsc::channel();
        let running = self.running.clone();
        let run_loop_slot = self.run_loop.clone();
        let context = Box::new(TapContext { decide });

        let handle =
            thread::spawn(move || run_tap_loop(running, run_loop_slot, context, ready_tx));

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.tap_thread = Some(handle);
                Ok(())
            }
            Ok(Err(msg)) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(HookError::RegistrationFailed(msg))
            }
            Err(_) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(HookError::RegistrationFailed(
                    "tap thread exited before registering".to_string(),
                ))
            }
        }
    }

    fn uninstall(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Ok(mut guard) = self.run_loop.lock() {
            if let Some(run_loop) = guard.take() {
                unsafe {
                    CFRunLoopStop(run_loop.as_concrete_TypeRef());
                }
            }
        }

        if let Some(handle) = self.tap_thread.take() {
            let _ = handle.join();
        }
    }

    fn is_installed(&self) -> bool {
        self.tap_thread.is_some()
    }
}

impl Drop for EventTapBackend {
    fn drop(&mut self) {
        self.uninstall();
    }
}
