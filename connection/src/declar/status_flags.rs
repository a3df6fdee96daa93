use bitflags::bitflags;

bitflags! {
    /// Server status carried by OK and EOF packets. Only the bits the replica logs are named.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct StatusFlags: u16 {
        /// A transaction is in progress
        const IN_TRANS = 0x0001;
        const AUTOCOMMIT = 0x0002;
        const MORE_RESULTS_EXISTS = 0x0008;
        const NO_INDEX_USED = 0x0020;
        /// the session state changed, info is followed by state change data
        const SESSION_STATE_CHANGED = 0x4000;
    }
}
