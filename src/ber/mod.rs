//! BER size computation.
//!
//! The agent core never serializes messages itself, but GETBULK processing
//! has to know how large the response would be once encoded. These helpers
//! compute exact X.690 definite-length sizes without building a buffer.

mod size;

pub use size::*;

/// BER tag definitions for SNMP values.
pub mod tag {
    /// Universal tags (class bits 00)
    pub mod universal {
        pub const INTEGER: u8 = 0x02;
        pub const OCTET_STRING: u8 = 0x04;
        pub const NULL: u8 = 0x05;
        pub const OBJECT_IDENTIFIER: u8 = 0x06;
        pub const SEQUENCE: u8 = 0x30; // Constructed
    }

    /// Application tags (class bits 01) - SNMP-specific types
    pub mod application {
        pub const IP_ADDRESS: u8 = 0x40;
        pub const COUNTER32: u8 = 0x41;
        pub const GAUGE32: u8 = 0x42; // Also Unsigned32
        pub const TIMETICKS: u8 = 0x43;
        pub const OPAQUE: u8 = 0x44;
        pub const COUNTER64: u8 = 0x46;
    }

    /// Context-specific tags (class bits 10) - Exception values
    pub mod context {
        pub const NO_SUCH_OBJECT: u8 = 0x80;
        pub const NO_SUCH_INSTANCE: u8 = 0x81;
        pub const END_OF_MIB_VIEW: u8 = 0x82;
    }
}
