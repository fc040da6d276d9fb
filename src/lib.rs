//! RustyJSEP implements the offer/answer half of a WebRTC peer connection.
//!
//! It provides:
//! - `sdp`: an SDP data model with a line-oriented decoder and a streaming encoder.
//! - `peer_connection`: JSEP offer/answer generation, bundle policies, codec
//!   matching and the signaling state machine.
//!
//! Transports (ICE, DTLS, SCTP, RTP) are out of scope; the engine only
//! produces and consumes session descriptions.

/// Handles configuration loading and management.
pub mod config;
/// Logging utilities: sinks, the background file logger and leveled macros.
pub mod log;
/// JSEP negotiation engine.
pub mod peer_connection;
/// SDP (Session Description Protocol) parsing and building.
pub mod sdp;
