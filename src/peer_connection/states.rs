//! Connection-level states reported alongside the signaling state.
//!
//! Transport progress is driven by collaborators outside this crate; the
//! engine only initialises these to `New` and moves them to `Closed`.

use std::fmt;

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub enum $name {
            #[default]
            $($variant),+
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $(Self::$variant => $text),+
                })
            }
        }
    };
}

string_enum!(
    /// Aggregate state of the connection's transports.
    PeerConnectionState {
        New => "new",
        Connecting => "connecting",
        Connected => "connected",
        Disconnected => "disconnected",
        Failed => "failed",
        Closed => "closed",
    }
);

string_enum!(
    IceConnectionState {
        New => "new",
        Checking => "checking",
        Connected => "connected",
        Completed => "completed",
        Disconnected => "disconnected",
        Failed => "failed",
        Closed => "closed",
    }
);

string_enum!(
    IceGatheringState {
        New => "new",
        Gathering => "gathering",
        Complete => "complete",
    }
);

string_enum!(
    DtlsTransportState {
        New => "new",
        Connecting => "connecting",
        Connected => "connected",
        Closed => "closed",
        Failed => "failed",
    }
);
