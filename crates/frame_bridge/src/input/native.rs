//! Raw native input translation
//!
//! [`NativeInput`] is the toolkit-neutral record a platform shim fills in
//! from its own event object before handing it to
//! [`WindowHandle::send_event`](crate::window::WindowHandle::send_event).
//! Type codes and modifier bits follow the AppKit numbering, which the
//! other shims map onto.

use super::{
    Button, InputPayload, KeyCode, KeyEvent, KeyState, Modifiers, PointerEvent, PointerKind,
    PointingDevice,
};
use crate::foundation::math::{Delta3, Point2};

/// Native modifier bit for Shift
pub const MODIFIER_SHIFT: u64 = 1 << 17;
/// Native modifier bit for Control
pub const MODIFIER_CONTROL: u64 = 1 << 18;
/// Native modifier bit for Option
pub const MODIFIER_OPTION: u64 = 1 << 19;
/// Native modifier bit for Command
pub const MODIFIER_COMMAND: u64 = 1 << 20;

/// Subtype marking a mouse event that came from a tablet in proximity
pub const SUBTYPE_TABLET_PROXIMITY: u16 = 2;

/// Native event type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum NativeEventType {
    LeftMouseDown = 1,
    LeftMouseUp = 2,
    RightMouseDown = 3,
    RightMouseUp = 4,
    MouseMoved = 5,
    LeftMouseDragged = 6,
    RightMouseDragged = 7,
    MouseEntered = 8,
    MouseExited = 9,
    KeyDown = 10,
    KeyUp = 11,
    FlagsChanged = 12,
    AppKitDefined = 13,
    SystemDefined = 14,
    ApplicationDefined = 15,
    Periodic = 16,
    CursorUpdate = 17,
    Rotate = 18,
    BeginGesture = 19,
    EndGesture = 20,
    ScrollWheel = 22,
    TabletPoint = 23,
    TabletProximity = 24,
    OtherMouseDown = 25,
    OtherMouseUp = 26,
    OtherMouseDragged = 27,
    Gesture = 29,
    Magnify = 30,
    Swipe = 31,
    SmartMagnify = 32,
    QuickLook = 33,
    Pressure = 34,
    DirectTouch = 37,
}

impl NativeEventType {
    /// Look up a native type code
    pub fn from_code(code: u32) -> Option<Self> {
        use NativeEventType::*;

        Some(match code {
            1 => LeftMouseDown,
            2 => LeftMouseUp,
            3 => RightMouseDown,
            4 => RightMouseUp,
            5 => MouseMoved,
            6 => LeftMouseDragged,
            7 => RightMouseDragged,
            8 => MouseEntered,
            9 => MouseExited,
            10 => KeyDown,
            11 => KeyUp,
            12 => FlagsChanged,
            13 => AppKitDefined,
            14 => SystemDefined,
            15 => ApplicationDefined,
            16 => Periodic,
            17 => CursorUpdate,
            18 => Rotate,
            19 => BeginGesture,
            20 => EndGesture,
            22 => ScrollWheel,
            23 => TabletPoint,
            24 => TabletProximity,
            25 => OtherMouseDown,
            26 => OtherMouseUp,
            27 => OtherMouseDragged,
            29 => Gesture,
            30 => Magnify,
            31 => Swipe,
            32 => SmartMagnify,
            33 => QuickLook,
            34 => Pressure,
            37 => DirectTouch,
            _ => return None,
        })
    }
}

/// Native pointing device type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NativeDeviceType {
    /// Device not reported
    #[default]
    Unknown,
    /// Pen tip
    Pen,
    /// Mouse-like puck or trackpad
    Cursor,
    /// Pen eraser
    Eraser,
}

/// A raw input notification as delivered by the window system
#[derive(Debug, Clone, PartialEq)]
pub struct NativeInput {
    /// Native event type code
    pub event_type: u32,
    /// Native event subtype
    pub subtype: u16,
    /// Native modifier flag bits
    pub modifier_flags: u64,
    /// Virtual key code (key events only)
    pub key_code: u16,
    /// Characters with modifiers applied (key events only)
    pub characters: String,
    /// Characters ignoring modifiers (key events only)
    pub characters_ignoring_modifiers: String,
    /// Auto-repeat flag (key events only)
    pub is_repeat: bool,
    /// Location in window coordinates
    pub location: Point2,
    /// Native button number
    pub button_number: i64,
    /// Deltas on x, y and z
    pub delta: Delta3,
    /// Pressure reported by the device
    pub pressure: f32,
    /// Magnification (magnify gestures only)
    pub magnification: f64,
    /// Pointing device type
    pub device_type: NativeDeviceType,
}

impl NativeInput {
    /// Blank record for the given type code
    pub fn new(event_type: u32) -> Self {
        Self {
            event_type,
            subtype: 0,
            modifier_flags: 0,
            key_code: 0,
            characters: String::new(),
            characters_ignoring_modifiers: String::new(),
            is_repeat: false,
            location: Point2::origin(),
            button_number: 0,
            delta: Delta3::zeros(),
            pressure: 0.0,
            magnification: 0.0,
            device_type: NativeDeviceType::Unknown,
        }
    }

    /// Blank record for a known type
    pub fn of_type(event_type: NativeEventType) -> Self {
        Self::new(event_type as u32)
    }

    /// Builder: location
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.location = Point2::new(x, y);
        self
    }

    /// Builder: modifier flag bits
    pub fn with_modifier_flags(mut self, flags: u64) -> Self {
        self.modifier_flags = flags;
        self
    }

    /// Builder: key data
    pub fn with_key(mut self, key_code: u16, characters: &str, ignoring_modifiers: &str) -> Self {
        self.key_code = key_code;
        self.characters = characters.to_string();
        self.characters_ignoring_modifiers = ignoring_modifiers.to_string();
        self
    }

    /// Builder: button number
    pub fn with_button(mut self, button_number: i64) -> Self {
        self.button_number = button_number;
        self
    }

    /// Builder: pressure
    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = pressure;
        self
    }

    /// Builder: deltas
    pub fn with_delta(mut self, x: f64, y: f64, z: f64) -> Self {
        self.delta = Delta3::new(x, y, z);
        self
    }
}

/// Convert native modifier bits
pub fn modifiers_from_flags(flags: u64) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, flags & MODIFIER_SHIFT != 0);
    modifiers.set(Modifiers::CONTROL, flags & MODIFIER_CONTROL != 0);
    modifiers.set(Modifiers::OPTION, flags & MODIFIER_OPTION != 0);
    modifiers.set(Modifiers::COMMAND, flags & MODIFIER_COMMAND != 0);
    modifiers
}

/// Translate a native input record into a payload for the queue
///
/// Returns `None` for event types the renderer has no use for (system and
/// application defined events, gestures other than magnify, cursor
/// updates) and for unknown type codes.
pub fn translate(input: &NativeInput) -> Option<InputPayload> {
    use NativeEventType::*;

    let event_type = NativeEventType::from_code(input.event_type)?;
    let modifiers = modifiers_from_flags(input.modifier_flags);

    let (kind, check_subtype, mut check_device, read_pressure) = match event_type {
        KeyDown | KeyUp => {
            let state = if event_type == KeyDown { KeyState::Down } else { KeyState::Up };
            return Some(InputPayload::Key(KeyEvent {
                state,
                modifiers,
                text: input.characters.clone(),
                raw_text: Some(input.characters_ignoring_modifiers.clone()),
                repeating: input.is_repeat,
                code: key_code_from_virtual(input.key_code),
            }));
        }
        SystemDefined | AppKitDefined | ApplicationDefined | Periodic | Gesture
        | Swipe | Rotate | BeginGesture | EndGesture | SmartMagnify | DirectTouch
        | CursorUpdate => return None,
        LeftMouseDown | RightMouseDown | OtherMouseDown => (PointerKind::Down, true, false, true),
        LeftMouseDragged | RightMouseDragged | OtherMouseDragged => {
            (PointerKind::Dragged, true, false, true)
        }
        LeftMouseUp | RightMouseUp | OtherMouseUp => (PointerKind::Up, true, false, true),
        MouseMoved => (PointerKind::Moved, true, false, false),
        MouseEntered => (PointerKind::Entered, true, false, true),
        MouseExited => (PointerKind::Exited, false, false, false),
        FlagsChanged => (PointerKind::ModifiersChanged, false, false, false),
        ScrollWheel => (PointerKind::Scroll, false, false, false),
        TabletPoint => (PointerKind::Moved, false, false, true),
        TabletProximity => (PointerKind::Moved, false, true, false),
        QuickLook => (PointerKind::QuickLook, false, false, false),
        Pressure => (PointerKind::PressureChanged, false, false, true),
        Magnify => (PointerKind::Scale, false, false, false),
    };

    if check_subtype && input.subtype == SUBTYPE_TABLET_PROXIMITY {
        check_device = true;
    }

    let device = if check_device {
        match input.device_type {
            NativeDeviceType::Unknown => None,
            NativeDeviceType::Cursor => Some(PointingDevice::Cursor),
            NativeDeviceType::Pen => Some(PointingDevice::Pen),
            NativeDeviceType::Eraser => Some(PointingDevice::Eraser),
        }
    } else {
        None
    };

    Some(InputPayload::Pointer(PointerEvent {
        kind,
        modifiers,
        position: input.location,
        button: Button::from_number(input.button_number),
        device,
        pressure: read_pressure.then(|| f64::from(input.pressure)),
        delta: input.delta,
        magnification: if event_type == Magnify { input.magnification } else { 0.0 },
    }))
}

/// Map a virtual key code to a layout-independent [`KeyCode`]
pub fn key_code_from_virtual(code: u16) -> KeyCode {
    use KeyCode::*;

    match code {
        0x00 => A,
        0x01 => S,
        0x02 => D,
        0x03 => F,
        0x04 => H,
        0x05 => G,
        0x06 => Z,
        0x07 => X,
        0x08 => C,
        0x09 => V,
        0x0a => ISOSection,
        0x0b => B,
        0x0c => Q,
        0x0d => W,
        0x0e => E,
        0x0f => R,
        0x10 => Y,
        0x11 => T,
        0x12 => Key1,
        0x13 => Key2,
        0x14 => Key3,
        0x15 => Key4,
        0x16 => Key6,
        0x17 => Key5,
        0x18 => Equal,
        0x19 => Key9,
        0x1a => Key7,
        0x1b => Minus,
        0x1c => Key8,
        0x1d => Key0,
        0x1e => RightBracket,
        0x1f => O,
        0x20 => U,
        0x21 => LeftBracket,
        0x22 => I,
        0x23 => P,
        0x24 => Return,
        0x25 => L,
        0x26 => J,
        0x27 => Quote,
        0x28 => K,
        0x29 => Semicolon,
        0x2a => Backslash,
        0x2b => Comma,
        0x2c => Slash,
        0x2d => N,
        0x2e => M,
        0x2f => Period,
        0x30 => Tab,
        0x31 => Space,
        0x32 => Grave,
        0x33 => Delete,
        0x35 => Escape,
        0x36 => RightCommand,
        0x37 => Command,
        0x38 => Shift,
        0x39 => CapsLock,
        0x3a => Option,
        0x3b => Control,
        0x3c => RightShift,
        0x3d => RightOption,
        0x3e => RightControl,
        0x3f => Function,
        0x40 => F17,
        0x41 => NumDecimal,
        0x43 => NumMultiply,
        0x45 => NumPlus,
        0x47 => NumClear,
        0x48 => VolumeUp,
        0x49 => VolumeDown,
        0x4a => Mute,
        0x4b => NumDivide,
        0x4c => NumEnter,
        0x4e => NumMinus,
        0x4f => F18,
        0x50 => F19,
        0x51 => NumEquals,
        0x52 => Num0,
        0x53 => Num1,
        0x54 => Num2,
        0x55 => Num3,
        0x56 => Num4,
        0x57 => Num5,
        0x58 => Num6,
        0x59 => Num7,
        0x5a => F20,
        0x5b => Num8,
        0x5c => Num9,
        0x5d => Yen,
        0x5e => Underscore,
        0x5f => NumComma,
        0x60 => F5,
        0x61 => F6,
        0x62 => F7,
        0x63 => F3,
        0x64 => F8,
        0x65 => F9,
        0x66 => Eisu,
        0x67 => F11,
        0x68 => Kana,
        0x69 => F13,
        0x6a => F16,
        0x6b => F14,
        0x6d => F10,
        0x6f => F12,
        0x71 => F15,
        0x72 => Help,
        0x73 => Home,
        0x74 => PageUp,
        0x75 => ForwardDelete,
        0x76 => F4,
        0x77 => End,
        0x78 => F2,
        0x79 => PageDown,
        0x7a => F1,
        0x7b => LeftArrow,
        0x7c => RightArrow,
        0x7d => DownArrow,
        0x7e => UpArrow,
        _ => Unknown,
    }
}
