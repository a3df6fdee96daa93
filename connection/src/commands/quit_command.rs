use crate::commands::command::CommandType;

/// COM_QUIT. The server closes the connection without a reply.
pub struct QuitCommand {}

impl QuitCommand {
    pub fn serialize(&self) -> Vec<u8> {
        vec![CommandType::Quit.into()]
    }
}
