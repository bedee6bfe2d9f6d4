use crate::error::PacketError;
use serde::{Deserialize, Serialize};

const PORT_ID_MIN_LEN: usize = 2;
const PORT_ID_MAX_LEN: usize = 128;
const CHANNEL_ID_MIN_LEN: usize = 8;
const CHANNEL_ID_MAX_LEN: usize = 64;
const CHANNEL_PREFIX: &str = "channel-";

/// An IBC packet. Two packets are the same packet iff every field matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Packet {
    /// Order of sends and receives on the channel.
    pub sequence: u64,
    pub source_port: String,
    pub source_channel: String,
    pub dest_port: String,
    pub dest_channel: String,
    /// Opaque application payload.
    pub data: Vec<u8>,
    /// Consensus height on the destination after which the packet times out.
    pub timeout_height: String,
    /// Destination timestamp in nanoseconds after which the packet times out.
    pub timeout_timestamp: u64,
}

impl Packet {
    /// Checks that the packet is well formed, reporting every problem found.
    pub fn validate(&self) -> Result<(), PacketError> {
        let mut problems = Vec::new();

        if self.sequence == 0 {
            problems.push("packet sequence cannot be 0".to_string());
        }
        if let Err(e) = validate_port_id(&self.source_port) {
            problems.push(format!("invalid packet source port: {e}"));
        }
        if let Err(e) = validate_channel_id(&self.source_channel) {
            problems.push(format!("invalid packet source channel: {e}"));
        }
        if let Err(e) = validate_port_id(&self.dest_port) {
            problems.push(format!("invalid packet destination port: {e}"));
        }
        if let Err(e) = validate_channel_id(&self.dest_channel) {
            problems.push(format!("invalid packet destination channel: {e}"));
        }
        if self.timeout_height.is_empty() && self.timeout_timestamp == 0 {
            problems.push(
                "packet timeout height and packet timeout timestamp cannot both be 0".to_string(),
            );
        }
        if self.data.is_empty() {
            problems.push("packet data bytes cannot be empty".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(PacketError::Invalid(problems))
        }
    }
}

/// Evidence that a packet was received and processed by the counterparty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketAcknowledgement {
    pub packet: Packet,
    pub acknowledgement: Vec<u8>,
}

impl PacketAcknowledgement {
    pub fn validate(&self) -> Result<(), PacketError> {
        let mut problems = Vec::new();
        if self.acknowledgement.is_empty() {
            problems.push("packet acknowledgement cannot be empty".to_string());
        }
        if let Err(PacketError::Invalid(mut packet_problems)) = self.packet.validate() {
            problems.append(&mut packet_problems);
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(PacketError::Invalid(problems))
        }
    }
}

/// Evidence that a packet expired before the counterparty processed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketTimeout {
    pub packet: Packet,
}

impl PacketTimeout {
    pub fn validate(&self) -> Result<(), PacketError> {
        self.packet.validate()
    }
}

fn validate_identifier(id: &str, min: usize, max: usize) -> Result<(), String> {
    if id.trim().is_empty() {
        return Err("identifier cannot be blank".to_string());
    }
    if id.contains('/') {
        return Err(format!("identifier {id} cannot contain separator '/'"));
    }
    if id.len() < min || id.len() > max {
        return Err(format!(
            "identifier {id} has invalid length: {}, must be between {min}-{max} characters",
            id.len()
        ));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || "._+-#[]<>".contains(c);
    if !id.chars().all(allowed) {
        return Err(format!(
            "identifier {id} must contain only alphanumeric or the following characters: '.', '_', '+', '-', '#', '[', ']', '<', '>'"
        ));
    }
    Ok(())
}

fn validate_port_id(id: &str) -> Result<(), String> {
    validate_identifier(id, PORT_ID_MIN_LEN, PORT_ID_MAX_LEN)
}

fn validate_channel_id(id: &str) -> Result<(), String> {
    validate_identifier(id, CHANNEL_ID_MIN_LEN, CHANNEL_ID_MAX_LEN)?;
    match id.strip_prefix(CHANNEL_PREFIX) {
        Some(seq) if !seq.is_empty() && seq.chars().all(|c| c.is_ascii_digit()) => Ok(()),
        _ => Err(format!("identifier {id} must be of the form {CHANNEL_PREFIX}N")),
    }
}
