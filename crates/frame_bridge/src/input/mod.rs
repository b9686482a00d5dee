//! Input payloads carried by [`WindowEvent::Input`](crate::events::WindowEvent::Input)
//!
//! The payload is opaque to the bridge itself: the queue and gate never look
//! inside it. [`native`] turns raw toolkit records into these types.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::math::{Delta3, Point2};

pub mod native;

bitflags! {
    /// Keyboard modifiers held during an input event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        /// Shift
        const SHIFT = 1 << 0;
        /// Control
        const CONTROL = 1 << 1;
        /// Option / Alt
        const OPTION = 1 << 2;
        /// Command / Super
        const COMMAND = 1 << 3;
    }
}

/// Raw input forwarded to the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum InputPayload {
    /// Pointer, scroll, pressure or modifier change
    Pointer(PointerEvent),
    /// Key press or release
    Key(KeyEvent),
}

impl InputPayload {
    /// Modifiers held when the event was generated
    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::Pointer(event) => event.modifiers,
            Self::Key(event) => event.modifiers,
        }
    }
}

/// Pointer event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerKind {
    /// A pointer button was pressed
    Down,
    /// The pointer moved with a button held
    Dragged,
    /// A pointer button was released
    Up,
    /// The pointer moved
    Moved,
    /// The pointer entered the window
    Entered,
    /// The pointer left the window
    Exited,
    /// Scroll wheel or trackpad scroll
    Scroll,
    /// Pinch / magnify gesture
    Scale,
    /// The set of held modifier keys changed
    ModifiersChanged,
    /// Pressure changed without movement
    PressureChanged,
    /// Force click / look up gesture
    QuickLook,
}

impl PointerKind {
    /// Whether the event describes pointer position or button state
    pub fn is_pointer_motion(self) -> bool {
        matches!(
            self,
            Self::Down | Self::Dragged | Self::Up | Self::Moved | Self::Entered | Self::Exited
        )
    }
}

/// Pointer buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    /// Usually the left mouse button
    Primary,
    /// Usually the right mouse button
    Secondary,
    /// Middle mouse button
    Middle,
    /// Any other button, by native button number
    Other(u32),
}

impl Button {
    /// Map a native button number; zero means no button
    pub fn from_number(number: i64) -> Option<Self> {
        match number {
            n if n <= 0 => None,
            1 => Some(Self::Primary),
            2 => Some(Self::Secondary),
            3 => Some(Self::Middle),
            n => Some(Self::Other(u32::try_from(n).unwrap_or(u32::MAX))),
        }
    }
}

/// Pointing devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PointingDevice {
    /// Mouse or trackpad
    #[default]
    Cursor,
    /// Pen tip
    Pen,
    /// Erasing end of a pen
    Eraser,
}

/// Pointer-like event with a location in window coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    /// Event kind
    pub kind: PointerKind,
    /// Held modifiers
    pub modifiers: Modifiers,
    /// Location in window coordinates
    pub position: Point2,
    /// Button involved, if any
    pub button: Option<Button>,
    /// Device, when the native event identifies it
    pub device: Option<PointingDevice>,
    /// Tablet / force pressure, when the event carries it
    pub pressure: Option<f64>,
    /// Scroll or drag delta
    pub delta: Delta3,
    /// Magnification amount, zero unless this is a magnify gesture
    pub magnification: f64,
}

/// Key press state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyState {
    /// Key went down
    Down,
    /// Key went up
    Up,
}

/// Keyboard event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Pressed or released
    pub state: KeyState,
    /// Held modifiers
    pub modifiers: Modifiers,
    /// Characters produced, with modifiers applied
    pub text: String,
    /// Characters ignoring modifiers
    pub raw_text: Option<String>,
    /// Whether this is an auto-repeat
    pub repeating: bool,
    /// Layout-independent key code
    pub code: KeyCode,
}

/// Keyboard-layout-independent key codes
///
/// `Key`N are the number keys above the letters, `Num`* are numpad keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// Key with no mapping
    Unknown,
    /// A key
    A,
    /// B key
    B,
    /// C key
    C,
    /// D key
    D,
    /// E key
    E,
    /// F key
    F,
    /// G key
    G,
    /// H key
    H,
    /// I key
    I,
    /// J key
    J,
    /// K key
    K,
    /// L key
    L,
    /// M key
    M,
    /// N key
    N,
    /// O key
    O,
    /// P key
    P,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// T key
    T,
    /// U key
    U,
    /// V key
    V,
    /// W key
    W,
    /// X key
    X,
    /// Y key
    Y,
    /// Z key
    Z,
    /// 1 key above the letters
    Key1,
    /// 2 key above the letters
    Key2,
    /// 3 key above the letters
    Key3,
    /// 4 key above the letters
    Key4,
    /// 5 key above the letters
    Key5,
    /// 6 key above the letters
    Key6,
    /// 7 key above the letters
    Key7,
    /// 8 key above the letters
    Key8,
    /// 9 key above the letters
    Key9,
    /// 0 key above the letters
    Key0,
    /// Equal key
    Equal,
    /// Minus key
    Minus,
    /// Left bracket key
    LeftBracket,
    /// Right bracket key
    RightBracket,
    /// Quote key
    Quote,
    /// Semicolon key
    Semicolon,
    /// Backslash key
    Backslash,
    /// Comma key
    Comma,
    /// Slash key
    Slash,
    /// Period key
    Period,
    /// Grave key
    Grave,
    /// Numpad decimal
    NumDecimal,
    /// Numpad multiply
    NumMultiply,
    /// Numpad plus
    NumPlus,
    /// Numpad clear
    NumClear,
    /// Numpad divide
    NumDivide,
    /// Numpad enter
    NumEnter,
    /// Numpad minus
    NumMinus,
    /// Numpad equals
    NumEquals,
    /// Numpad 0
    Num0,
    /// Numpad 1
    Num1,
    /// Numpad 2
    Num2,
    /// Numpad 3
    Num3,
    /// Numpad 4
    Num4,
    /// Numpad 5
    Num5,
    /// Numpad 6
    Num6,
    /// Numpad 7
    Num7,
    /// Numpad 8
    Num8,
    /// Numpad 9
    Num9,
    /// Return key
    Return,
    /// Tab key
    Tab,
    /// Space key
    Space,
    /// Delete key
    Delete,
    /// Escape key
    Escape,
    /// Command key
    Command,
    /// Shift key
    Shift,
    /// Caps lock key
    CapsLock,
    /// Option key
    Option,
    /// Control key
    Control,
    /// Right command key
    RightCommand,
    /// Right shift key
    RightShift,
    /// Right option key
    RightOption,
    /// Right control key
    RightControl,
    /// Function key
    Function,
    /// Volume up key
    VolumeUp,
    /// Volume down key
    VolumeDown,
    /// Mute key
    Mute,
    /// F1 function key
    F1,
    /// F2 function key
    F2,
    /// F3 function key
    F3,
    /// F4 function key
    F4,
    /// F5 function key
    F5,
    /// F6 function key
    F6,
    /// F7 function key
    F7,
    /// F8 function key
    F8,
    /// F9 function key
    F9,
    /// F10 function key
    F10,
    /// F11 function key
    F11,
    /// F12 function key
    F12,
    /// F13 function key
    F13,
    /// F14 function key
    F14,
    /// F15 function key
    F15,
    /// F16 function key
    F16,
    /// F17 function key
    F17,
    /// F18 function key
    F18,
    /// F19 function key
    F19,
    /// F20 function key
    F20,
    /// Help key
    Help,
    /// Home key
    Home,
    /// End key
    End,
    /// Page up key
    PageUp,
    /// Page down key
    PageDown,
    /// Forward delete key
    ForwardDelete,
    /// Left arrow key
    LeftArrow,
    /// Right arrow key
    RightArrow,
    /// Up arrow key
    UpArrow,
    /// Down arrow key
    DownArrow,
    /// ISO section key
    ISOSection,
    /// Yen key
    Yen,
    /// Underscore key
    Underscore,
    /// Numpad comma
    NumComma,
    /// Eisu key
    Eisu,
    /// Kana key
    Kana,
}
