//! Win32 `SendInput` backend for the camera automator.

use super::input::{InputAction, InputDriver, Key};
use crate::error::InputError;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBD_EVENT_FLAGS, KEYBDINPUT, KEYEVENTF_KEYUP,
    MOUSE_EVENT_FLAGS, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, MOUSEEVENTF_WHEEL, MOUSEINPUT,
    SendInput, VIRTUAL_KEY, VK_CONTROL, VK_SHIFT, VkKeyScanW,
};
use windows::Win32::UI::WindowsAndMessaging::SetCursorPos;

const WHEEL_DELTA: i32 = 120;
const VK_F1_CODE: u16 = 0x70;

/// Sends keyboard and mouse input to the foreground window.
#[derive(Debug, Default, Clone, Copy)]
pub struct SendInputDriver;

impl InputDriver for SendInputDriver {
    fn perform(&self, action: &InputAction) -> Result<(), InputError> {
        let fail = |reason: String| InputError::Send {
            action: action.to_string(),
            reason,
        };

        let inputs = match action {
            InputAction::MoveMouse { x, y } => {
                return unsafe { SetCursorPos(*x, *y) }.map_err(|e| fail(e.to_string()));
            }
            InputAction::LeftClick => vec![
                mouse_input(MOUSEEVENTF_LEFTDOWN, 0),
                mouse_input(MOUSEEVENTF_LEFTUP, 0),
            ],
            InputAction::ScrollDown { notches } => (0..*notches)
                .map(|_| mouse_input(MOUSEEVENTF_WHEEL, -WHEEL_DELTA))
                .collect(),
            InputAction::KeyTap(key) => {
                let vk = virtual_key(*key).ok_or_else(|| fail(format!("no key code for {key}")))?;
                vec![key_input(vk, false), key_input(vk, true)]
            }
            InputAction::KeyCombo(keys) => {
                let codes = keys
                    .iter()
                    .map(|k| virtual_key(*k).ok_or_else(|| fail(format!("no key code for {k}"))))
                    .collect::<Result<Vec<_>, _>>()?;
                let mut inputs: Vec<INPUT> = codes.iter().map(|vk| key_input(*vk, false)).collect();
                inputs.extend(codes.iter().rev().map(|vk| key_input(*vk, true)));
                inputs
            }
        };

        let sent = unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) };
        if sent as usize != inputs.len() {
            return Err(fail(format!("only {sent} of {} events accepted", inputs.len())));
        }
        Ok(())
    }
}

fn virtual_key(key: Key) -> Option<VIRTUAL_KEY> {
    match key {
        Key::Control => Some(VK_CONTROL),
        Key::Shift => Some(VK_SHIFT),
        Key::F(n) if (1..=12).contains(&n) => Some(VIRTUAL_KEY(VK_F1_CODE + u16::from(n) - 1)),
        Key::F(_) => None,
        Key::Char(c) => {
            let mut buf = [0u16; 2];
            let encoded = c.encode_utf16(&mut buf);
            if encoded.len() != 1 {
                return None;
            }
            let scan = unsafe { VkKeyScanW(encoded[0]) };
            // Low byte is the virtual key code, -1 means no mapping on this layout
            (scan != -1).then(|| VIRTUAL_KEY((scan as u16) & 0xff))
        }
    }
}

fn key_input(vk: VIRTUAL_KEY, release: bool) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: vk,
                wScan: 0,
                dwFlags: if release {
                    KEYEVENTF_KEYUP
                } else {
                    KEYBD_EVENT_FLAGS(0)
                },
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn mouse_input(flags: MOUSE_EVENT_FLAGS, data: i32) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: 0,
                dy: 0,
                mouseData: data,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}
