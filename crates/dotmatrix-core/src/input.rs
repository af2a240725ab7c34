/// Which button rows the JOYP register currently selects. The two select
/// bits are active-low, so 0 selects both rows at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JoypadSelect {
    #[default]
    Both = 0,
    Buttons = 1,
    Dpad = 2,
    None = 3,
}

/// Joypad state. The eight button fields are written by the host (key events,
/// gamepad polling) and read by the core through the JOYP register; pressed
/// buttons read back as low bits.
#[derive(Default)]
pub struct Input {
    pub right: bool,
    pub left: bool,
    pub up: bool,
    pub down: bool,
    pub a: bool,
    pub b: bool,
    pub select: bool,
    pub start: bool,
    joypad_select: JoypadSelect,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> u8 {
        // When both rows are selected the rows are ORed together.
        let mut pressed = 0u8;
        if matches!(self.joypad_select, JoypadSelect::Buttons | JoypadSelect::Both) {
            pressed |= (self.start as u8) << 3
                | (self.select as u8) << 2
                | (self.b as u8) << 1
                | self.a as u8;
        }
        if matches!(self.joypad_select, JoypadSelect::Dpad | JoypadSelect::Both) {
            pressed |= (self.down as u8) << 3
                | (self.up as u8) << 2
                | (self.left as u8) << 1
                | self.right as u8;
        }
        0xC0 | (self.joypad_select as u8) << 4 | (!pressed & 0x0F)
    }

    pub fn write(&mut self, val: u8) {
        self.joypad_select = match (val >> 4) & 0x03 {
            0 => JoypadSelect::Both,
            1 => JoypadSelect::Buttons,
            2 => JoypadSelect::Dpad,
            _ => JoypadSelect::None,
        };
    }

    /// True if any button in a currently selected row is held. Used to leave
    /// the STOP low-power state.
    pub fn any_selected_pressed(&self) -> bool {
        self.read() & 0x0F != 0x0F
    }
}
