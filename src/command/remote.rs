//! Remote operation commands (RUN, STOP, PAUSE, latch clear, RESET) and
//! remote password lock/unlock.

use super::{Command, CommandContext, Request};
use super::{
    REMOTE_LATCH_CLEAR, REMOTE_LOCK, REMOTE_PAUSE, REMOTE_RESET, REMOTE_RUN, REMOTE_STOP,
    REMOTE_UNLOCK,
};
use crate::error::Result;
use crate::series::PasswordRule;

/// Remote operation mode: execute unless another device holds the PLC.
const MODE_NORMAL: u16 = 0x0001;
/// Remote operation mode: execute even if another device holds the PLC.
const MODE_FORCED: u16 = 0x0003;
/// Fixed request data of STOP, latch clear and RESET.
const FIXED_OPERAND: u16 = 0x0001;

fn operation_mode(force: bool) -> u16 {
    if force {
        MODE_FORCED
    } else {
        MODE_NORMAL
    }
}

/// Device memory clear mode for remote RUN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClearMode {
    /// Do not clear devices.
    #[default]
    NoClear,
    /// Clear all devices except the latch range.
    ClearExceptLatch,
    /// Clear all devices including the latch range.
    ClearAll,
}

impl ClearMode {
    /// Returns the protocol code for this mode.
    pub(crate) fn code(self) -> u8 {
        match self {
            ClearMode::NoClear => 0x00,
            ClearMode::ClearExceptLatch => 0x01,
            ClearMode::ClearAll => 0x02,
        }
    }
}

/// Command for putting the PLC into RUN.
#[derive(Debug, Clone, Copy)]
pub struct RemoteRunCommand {
    clear_mode: ClearMode,
    force: bool,
}

impl RemoteRunCommand {
    /// Creates a new remote RUN command.
    ///
    /// # Arguments
    ///
    /// * `clear_mode` - Device memory to clear on start
    /// * `force` - Execute even if another device is operating the PLC
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::{ClearMode, Command, CommandContext, RemoteRunCommand};
    ///
    /// let cmd = RemoteRunCommand::new(ClearMode::ClearAll, true);
    /// let request = cmd.request(CommandContext::default()).unwrap();
    /// assert_eq!(request.payload, vec![0x03, 0x00, 0x02, 0x00]);
    /// ```
    pub fn new(clear_mode: ClearMode, force: bool) -> Self {
        Self { clear_mode, force }
    }
}

impl Command for RemoteRunCommand {
    type Output = ();

    fn request(&self, ctx: CommandContext) -> Result<Request> {
        let mut enc = ctx.encoder();
        enc.put_u16(operation_mode(self.force));
        enc.put_u8(self.clear_mode.code());
        enc.put_u8(0x00);
        Ok(Request::new(REMOTE_RUN, 0x0000, enc.into_bytes()))
    }

    fn parse_response(&self, _data: &[u8], _ctx: CommandContext) -> Result<()> {
        Ok(())
    }
}

/// Command for stopping the PLC.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteStopCommand;

impl RemoteStopCommand {
    /// Creates a new remote STOP command.
    pub fn new() -> Self {
        Self
    }
}

impl Command for RemoteStopCommand {
    type Output = ();

    fn request(&self, ctx: CommandContext) -> Result<Request> {
        let mut enc = ctx.encoder();
        enc.put_u16(FIXED_OPERAND);
        Ok(Request::new(REMOTE_STOP, 0x0000, enc.into_bytes()))
    }

    fn parse_response(&self, _data: &[u8], _ctx: CommandContext) -> Result<()> {
        Ok(())
    }
}

/// Command for pausing the PLC.
#[derive(Debug, Clone, Copy)]
pub struct RemotePauseCommand {
    force: bool,
}

impl RemotePauseCommand {
    /// Creates a new remote PAUSE command.
    pub fn new(force: bool) -> Self {
        Self { force }
    }
}

impl Command for RemotePauseCommand {
    type Output = ();

    fn request(&self, ctx: CommandContext) -> Result<Request> {
        let mut enc = ctx.encoder();
        enc.put_u16(operation_mode(self.force));
        Ok(Request::new(REMOTE_PAUSE, 0x0000, enc.into_bytes()))
    }

    fn parse_response(&self, _data: &[u8], _ctx: CommandContext) -> Result<()> {
        Ok(())
    }
}

/// Command for clearing the latch range. The PLC must be stopped.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteLatchClearCommand;

impl RemoteLatchClearCommand {
    /// Creates a new remote latch clear command.
    pub fn new() -> Self {
        Self
    }
}

impl Command for RemoteLatchClearCommand {
    type Output = ();

    fn request(&self, ctx: CommandContext) -> Result<Request> {
        let mut enc = ctx.encoder();
        enc.put_u16(FIXED_OPERAND);
        Ok(Request::new(REMOTE_LATCH_CLEAR, 0x0000, enc.into_bytes()))
    }

    fn parse_response(&self, _data: &[u8], _ctx: CommandContext) -> Result<()> {
        Ok(())
    }
}

/// Command for resetting the PLC. The PLC must be stopped.
///
/// The PLC may restart before it answers; the client treats a timeout on
/// this command as an unanswered reset.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteResetCommand;

impl RemoteResetCommand {
    /// Creates a new remote RESET command.
    pub fn new() -> Self {
        Self
    }
}

impl Command for RemoteResetCommand {
    type Output = ();

    fn request(&self, ctx: CommandContext) -> Result<Request> {
        let mut enc = ctx.encoder();
        enc.put_u16(FIXED_OPERAND);
        Ok(Request::new(REMOTE_RESET, 0x0000, enc.into_bytes()))
    }

    fn parse_response(&self, _data: &[u8], _ctx: CommandContext) -> Result<()> {
        Ok(())
    }
}

/// Command for locking or unlocking the PLC with the remote password.
#[derive(Debug, Clone)]
pub struct RemoteLockCommand {
    command: u16,
    password: Vec<u8>,
}

impl RemoteLockCommand {
    /// Creates a remote password lock command.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidParameter` if the password violates `rule`.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::{PasswordRule, RemoteLockCommand};
    ///
    /// assert!(RemoteLockCommand::lock("1234", PasswordRule::Fixed(4)).is_ok());
    /// assert!(RemoteLockCommand::lock("abc", PasswordRule::Range { min: 6, max: 32 }).is_err());
    /// ```
    pub fn lock(password: &str, rule: PasswordRule) -> Result<Self> {
        Ok(Self {
            command: REMOTE_LOCK,
            password: rule.apply(password)?,
        })
    }

    /// Creates a remote password unlock command.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidParameter` if the password violates `rule`.
    pub fn unlock(password: &str, rule: PasswordRule) -> Result<Self> {
        Ok(Self {
            command: REMOTE_UNLOCK,
            password: rule.apply(password)?,
        })
    }
}

impl Command for RemoteLockCommand {
    type Output = ();

    fn request(&self, ctx: CommandContext) -> Result<Request> {
        let mut enc = ctx.encoder();
        enc.put_u16(self.password.len() as u16);
        // Password characters are sent as-is in both modes.
        enc.put_raw(&self.password);
        Ok(Request::new(self.command, 0x0000, enc.into_bytes()))
    }

    fn parse_response(&self, _data: &[u8], _ctx: CommandContext) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::TransferMode;
    use crate::series::PlcSeries;

    fn ascii() -> CommandContext {
        CommandContext::new(PlcSeries::Q, TransferMode::Ascii)
    }

    #[test]
    fn test_remote_run() {
        let cmd = RemoteRunCommand::new(ClearMode::NoClear, false);
        let request = cmd.request(CommandContext::default()).unwrap();
        assert_eq!(request.command, 0x1001);
        assert_eq!(request.subcommand, 0x0000);
        assert_eq!(request.payload, vec![0x01, 0x00, 0x00, 0x00]);

        let cmd = RemoteRunCommand::new(ClearMode::ClearExceptLatch, true);
        assert_eq!(cmd.request(ascii()).unwrap().payload, b"00030100".to_vec());
    }

    #[test]
    fn test_fixed_operand_commands() {
        let ctx = CommandContext::default();
        let stop = RemoteStopCommand::new().request(ctx).unwrap();
        assert_eq!((stop.command, stop.payload), (0x1002, vec![0x01, 0x00]));

        let latch = RemoteLatchClearCommand::new().request(ctx).unwrap();
        assert_eq!((latch.command, latch.payload), (0x1005, vec![0x01, 0x00]));

        let reset = RemoteResetCommand::new().request(ascii()).unwrap();
        assert_eq!((reset.command, reset.payload), (0x1006, b"0001".to_vec()));
    }

    #[test]
    fn test_remote_pause() {
        let ctx = CommandContext::default();
        let normal = RemotePauseCommand::new(false).request(ctx).unwrap();
        assert_eq!((normal.command, normal.payload), (0x1003, vec![0x01, 0x00]));
        let forced = RemotePauseCommand::new(true).request(ctx).unwrap();
        assert_eq!(forced.payload, vec![0x03, 0x00]);
    }

    #[test]
    fn test_lock_unlock() {
        let rule = PlcSeries::Q.password_rule();
        let lock = RemoteLockCommand::lock("ab", rule).unwrap();
        let request = lock.request(CommandContext::default()).unwrap();
        assert_eq!(request.command, 0x1631);
        assert_eq!(request.payload, vec![0x04, 0x00, b'a', b'b', 0x00, 0x00]);

        let unlock = RemoteLockCommand::unlock("secret", PlcSeries::IqR.password_rule()).unwrap();
        let request = unlock.request(ascii()).unwrap();
        assert_eq!(request.command, 0x1630);
        assert_eq!(request.payload, b"0006secret".to_vec());
    }
}
