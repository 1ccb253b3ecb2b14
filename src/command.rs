//! This module defines the command registry of the TIG serial protocol.
//!
//! Each documented command code maps to exactly one registry entry carrying
//! its direction and value domain. Write/read pairs address the same
//! quantity and differ by the top bit of the code (`0x43`/`0xC3`).

use strum_macros::EnumIter;

use crate::value::ValueDomain;

/// Whether a command writes a value to the device or reads one back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Write,
    Read,
}

/// All documented protocol commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
#[repr(u8)]
pub enum Command {
    /// __W__ - Setpoint of the active control mode, permille of full scale.
    SetpointWrite = 0x43,
    /// __W__ - UDC (voltage) limit, permille of full scale.
    UdcLimitWrite = 0x44,
    /// __W__ - IDC (current) limit, permille of full scale.
    IdcLimitWrite = 0x45,
    /// __W__ - PDC (power) limit, permille of full scale.
    PdcLimitWrite = 0x46,
    /// __W__ - Control mode. `0` = UDC, `1` = IDC, `2` = PDC.
    ModeWrite = 0x4D,
    /// __W__ - Generator run state. `0` = off, `1` = on.
    RunWrite = 0x4F,
    /// __W__ - Error reset. `0` = no action, `1` = reset.
    ResetError = 0x51,
    /// __R__ - Setpoint of the active control mode.
    SetpointRead = 0xC3,
    /// __R__ - UDC (voltage) limit.
    UdcLimitRead = 0xC4,
    /// __R__ - IDC (current) limit.
    IdcLimitRead = 0xC5,
    /// __R__ - PDC (power) limit.
    PdcLimitRead = 0xC6,
    /// __R__ - Control mode.
    ModeRead = 0xCD,
    /// __R__ - Generator run state.
    RunRead = 0xCF,
    /// __R__ - Status word, two bitfield bytes.
    StatusRead = 0xE1,
    /// __R__ - Number of error messages in the device log.
    ErrorCountRead = 0xE3,
    /// __R__ - Function number of the current error log slot.
    ErrorFunctionRead = 0xE4,
    /// __R__ - Error number of the current error log slot.
    ErrorNumberRead = 0xE5,
    /// __R__ - Actual power, permille of full scale.
    ActualPowerRead = 0xE6,
    /// __R__ - Actual voltage, permille of full scale.
    ActualVoltageRead = 0xE7,
    /// __R__ - Actual current, permille of full scale.
    ActualCurrentRead = 0xE8,
    /// __R__ - Actual frequency in tenths of kHz, 0-3000.
    ActualFrequencyRead = 0xED,
}

impl Command {
    /// The wire code of this command.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Look a wire code up in the registry. Unknown codes are rejected
    /// rather than guessed at.
    pub fn lookup(code: u8) -> Option<Command> {
        use Command as C;
        match code {
            0x43 => Some(C::SetpointWrite),
            0x44 => Some(C::UdcLimitWrite),
            0x45 => Some(C::IdcLimitWrite),
            0x46 => Some(C::PdcLimitWrite),
            0x4D => Some(C::ModeWrite),
            0x4F => Some(C::RunWrite),
            0x51 => Some(C::ResetError),
            0xC3 => Some(C::SetpointRead),
            0xC4 => Some(C::UdcLimitRead),
            0xC5 => Some(C::IdcLimitRead),
            0xC6 => Some(C::PdcLimitRead),
            0xCD => Some(C::ModeRead),
            0xCF => Some(C::RunRead),
            0xE1 => Some(C::StatusRead),
            0xE3 => Some(C::ErrorCountRead),
            0xE4 => Some(C::ErrorFunctionRead),
            0xE5 => Some(C::ErrorNumberRead),
            0xE6 => Some(C::ActualPowerRead),
            0xE7 => Some(C::ActualVoltageRead),
            0xE8 => Some(C::ActualCurrentRead),
            0xED => Some(C::ActualFrequencyRead),
            _ => None,
        }
    }

    pub const fn direction(self) -> Direction {
        use Command as C;
        match self {
            C::SetpointWrite
            | C::UdcLimitWrite
            | C::IdcLimitWrite
            | C::PdcLimitWrite
            | C::ModeWrite
            | C::RunWrite
            | C::ResetError => Direction::Write,
            _ => Direction::Read,
        }
    }

    /// The value domain of this command, which also fixes the payload
    /// width of its frames.
    pub const fn domain(self) -> ValueDomain {
        use Command as C;
        match self {
            C::SetpointWrite
            | C::UdcLimitWrite
            | C::IdcLimitWrite
            | C::PdcLimitWrite
            | C::SetpointRead
            | C::UdcLimitRead
            | C::IdcLimitRead
            | C::PdcLimitRead
            | C::ActualPowerRead
            | C::ActualVoltageRead
            | C::ActualCurrentRead => ValueDomain::Permille,
            C::ModeWrite | C::ModeRead => ValueDomain::Mode,
            C::RunWrite | C::RunRead => ValueDomain::OnOff,
            C::ResetError => ValueDomain::Reset,
            C::StatusRead => ValueDomain::Status,
            C::ErrorCountRead | C::ErrorFunctionRead | C::ErrorNumberRead => ValueDomain::Count,
            C::ActualFrequencyRead => ValueDomain::FrequencyTenthKhz,
        }
    }
}

impl From<Command> for u8 {
    fn from(value: Command) -> Self {
        value as u8
    }
}

/// Which setpoint quantity a session operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetpointKind {
    /// The setpoint of whichever control mode is currently active.
    Active,
    /// Voltage limit.
    UdcLimit,
    /// Current limit.
    IdcLimit,
    /// Power limit.
    PdcLimit,
}

impl SetpointKind {
    pub const fn write_command(self) -> Command {
        match self {
            SetpointKind::Active => Command::SetpointWrite,
            SetpointKind::UdcLimit => Command::UdcLimitWrite,
            SetpointKind::IdcLimit => Command::IdcLimitWrite,
            SetpointKind::PdcLimit => Command::PdcLimitWrite,
        }
    }

    pub const fn read_command(self) -> Command {
        match self {
            SetpointKind::Active => Command::SetpointRead,
            SetpointKind::UdcLimit => Command::UdcLimitRead,
            SetpointKind::IdcLimit => Command::IdcLimitRead,
            SetpointKind::PdcLimit => Command::PdcLimitRead,
        }
    }
}

/// Which measured quantity a session read addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActualKind {
    Power,
    Voltage,
    Current,
    Frequency,
}

impl ActualKind {
    pub const fn read_command(self) -> Command {
        match self {
            ActualKind::Power => Command::ActualPowerRead,
            ActualKind::Voltage => Command::ActualVoltageRead,
            ActualKind::Current => Command::ActualCurrentRead,
            ActualKind::Frequency => Command::ActualFrequencyRead,
        }
    }
}
