//! Typed messages and their payload sub-encodings within a [`Frame`]'s data
//! region. This module is the only place that knows what a message type's
//! bytes mean; [`Frame`] itself is opaque to payload shape.

use fleet_core::{ContainerId, ContainerSpec, ContainerState, NodeId, ResourceSample};

use crate::error::TransportError;
use crate::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    RegisterNode,
    NodeHeartbeat,
    DeployContainer,
    StartContainer,
    StopContainer,
    DeleteContainer,
    ContainerStatus,
    NodeStatus,
    Error,
    Ack,
    /// A discriminant this build does not recognize. Per §6, the
    /// coordinator logs and ignores it; the worker closes the connection.
    Unknown(u8),
}

impl MessageType {
    fn discriminant(self) -> u8 {
        match self {
            MessageType::RegisterNode => 0,
            MessageType::NodeHeartbeat => 1,
            MessageType::DeployContainer => 2,
            MessageType::StartContainer => 3,
            MessageType::StopContainer => 4,
            MessageType::DeleteContainer => 5,
            MessageType::ContainerStatus => 6,
            MessageType::NodeStatus => 7,
            MessageType::Error => 8,
            MessageType::Ack => 9,
            MessageType::Unknown(b) => b,
        }
    }

    pub(crate) fn from_discriminant(b: u8) -> Self {
        match b {
            0 => MessageType::RegisterNode,
            1 => MessageType::NodeHeartbeat,
            2 => MessageType::DeployContainer,
            3 => MessageType::StartContainer,
            4 => MessageType::StopContainer,
            5 => MessageType::DeleteContainer,
            6 => MessageType::ContainerStatus,
            7 => MessageType::NodeStatus,
            8 => MessageType::Error,
            9 => MessageType::Ack,
            other => MessageType::Unknown(other),
        }
    }
}

/// A summary of a container record, as reported in a `CONTAINER_STATUS`
/// frame. Not the full `ContainerRecord` — the spec carries only the fields
/// needed to update the coordinator's ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerStatusPayload {
    pub id: ContainerId,
    pub name: String,
    pub node_id: NodeId,
    pub state: ContainerState,
    pub started_at: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    RegisterNode { hostname: String, ip: String, port: u16 },
    NodeHeartbeat(ResourceSample),
    DeployContainer(ContainerSpec),
    StartContainer { name: String },
    StopContainer { name: String },
    DeleteContainer { name: String },
    ContainerStatus(ContainerStatusPayload),
    NodeStatus(String),
    Error(String),
    Ack(String),
    Unknown(u8),
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::RegisterNode { .. } => MessageType::RegisterNode,
            Message::NodeHeartbeat(_) => MessageType::NodeHeartbeat,
            Message::DeployContainer(_) => MessageType::DeployContainer,
            Message::StartContainer { .. } => MessageType::StartContainer,
            Message::StopContainer { .. } => MessageType::StopContainer,
            Message::DeleteContainer { .. } => MessageType::DeleteContainer,
            Message::ContainerStatus(_) => MessageType::ContainerStatus,
            Message::NodeStatus(_) => MessageType::NodeStatus,
            Message::Error(_) => MessageType::Error,
            Message::Ack(_) => MessageType::Ack,
            Message::Unknown(b) => MessageType::Unknown(*b),
        }
    }

    pub fn into_frame(self, sender_id: impl Into<String>, recipient_id: impl Into<String>) -> Result<Frame, TransportError> {
        let msg_type = self.message_type().discriminant();
        let data = encode_payload(&self)?;
        Ok(Frame::new(msg_type, sender_id, recipient_id, data))
    }

    pub fn from_frame(frame: &Frame) -> Result<Self, TransportError> {
        let msg_type = MessageType::from_discriminant(frame.msg_type);
        decode_payload(msg_type, &frame.data)
    }
}

fn encode_payload(message: &Message) -> Result<Vec<u8>, TransportError> {
    Ok(match message {
        Message::RegisterNode { hostname, ip, port } => format!("{hostname} {ip} {port}").into_bytes(),
        Message::NodeHeartbeat(sample) => encode_resource_sample(sample),
        Message::DeployContainer(spec) => encode_spec(spec),
        Message::StartContainer { name } | Message::StopContainer { name } | Message::DeleteContainer { name } => {
            name.clone().into_bytes()
        }
        Message::ContainerStatus(status) => encode_status(status),
        Message::NodeStatus(text) | Message::Error(text) | Message::Ack(text) => text.clone().into_bytes(),
        Message::Unknown(_) => Vec::new(),
    })
}

fn decode_payload(msg_type: MessageType, data: &[u8]) -> Result<Message, TransportError> {
    let bad = |what: &str| TransportError::MalformedPayload(msg_type.discriminant(), what.to_string());

    Ok(match msg_type {
        MessageType::RegisterNode => {
            let text = std::str::from_utf8(data).map_err(|_| bad("not utf8"))?;
            let mut parts = text.split_whitespace();
            let hostname = parts.next().ok_or_else(|| bad("missing hostname"))?.to_string();
            let ip = parts.next().ok_or_else(|| bad("missing ip"))?.to_string();
            let port: u16 = parts.next().ok_or_else(|| bad("missing port"))?.parse().map_err(|_| bad("bad port"))?;
            Message::RegisterNode { hostname, ip, port }
        }
        MessageType::NodeHeartbeat => Message::NodeHeartbeat(decode_resource_sample(data)?),
        MessageType::DeployContainer => Message::DeployContainer(decode_spec(data)?),
        MessageType::StartContainer => {
            Message::StartContainer { name: decode_text(data).map_err(|_| bad("name not utf8"))? }
        }
        MessageType::StopContainer => {
            Message::StopContainer { name: decode_text(data).map_err(|_| bad("name not utf8"))? }
        }
        MessageType::DeleteContainer => {
            Message::DeleteContainer { name: decode_text(data).map_err(|_| bad("name not utf8"))? }
        }
        MessageType::ContainerStatus => Message::ContainerStatus(decode_status(data)?),
        MessageType::NodeStatus => Message::NodeStatus(decode_text(data).map_err(|_| bad("not utf8"))?),
        MessageType::Error => Message::Error(decode_text(data).map_err(|_| bad("not utf8"))?),
        MessageType::Ack => Message::Ack(decode_text(data).map_err(|_| bad("not utf8"))?),
        MessageType::Unknown(b) => Message::Unknown(b),
    })
}

fn decode_text(data: &[u8]) -> Result<String, ()> {
    std::str::from_utf8(data).map(str::to_owned).map_err(|_| ())
}

// -- ResourceSample: 3 x f64 BE + 2 x u32 BE = 32 bytes -----------------

fn encode_resource_sample(sample: &ResourceSample) -> Vec<u8> {
    let mut buf = Vec::with_capacity(32);
    buf.extend_from_slice(&sample.cpu_used.to_be_bytes());
    buf.extend_from_slice(&sample.mem_used.to_be_bytes());
    buf.extend_from_slice(&sample.disk_used.to_be_bytes());
    buf.extend_from_slice(&sample.container_count.to_be_bytes());
    buf.extend_from_slice(&sample.max_containers.to_be_bytes());
    buf
}

fn decode_resource_sample(data: &[u8]) -> Result<ResourceSample, TransportError> {
    if data.len() < 32 {
        return Err(TransportError::MalformedPayload(MessageType::NodeHeartbeat.discriminant(), "short".into()));
    }
    Ok(ResourceSample {
        cpu_used: f64::from_be_bytes(be8(&data[0..8])),
        mem_used: f64::from_be_bytes(be8(&data[8..16])),
        disk_used: f64::from_be_bytes(be8(&data[16..24])),
        container_count: u32::from_be_bytes(be4(&data[24..28])),
        max_containers: u32::from_be_bytes(be4(&data[28..32])),
    })
}

fn be4(s: &[u8]) -> [u8; 4] {
    [s[0], s[1], s[2], s[3]]
}

fn be8(s: &[u8]) -> [u8; 8] {
    [s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7]]
}

// -- ContainerSpec: length-prefixed fields -------------------------------

fn push_str16(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u16).to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
}

fn take_str16<'a>(data: &'a [u8], cursor: &mut usize) -> Result<&'a str, ()> {
    let len = u16::from_be_bytes(data.get(*cursor..*cursor + 2).ok_or(())?.try_into().map_err(|_| ())?) as usize;
    *cursor += 2;
    let bytes = data.get(*cursor..*cursor + len).ok_or(())?;
    *cursor += len;
    std::str::from_utf8(bytes).map_err(|_| ())
}

fn encode_spec(spec: &ContainerSpec) -> Vec<u8> {
    let mut buf = Vec::new();
    push_str16(&mut buf, &spec.name);
    match &spec.image {
        Some(image) => {
            buf.push(1);
            push_str16(&mut buf, image);
        }
        None => buf.push(0),
    }
    buf.extend_from_slice(&spec.cpu_limit.to_be_bytes());
    buf.extend_from_slice(&spec.memory_limit.to_be_bytes());
    buf.push(spec.privileged as u8);

    buf.extend_from_slice(&(spec.env.len() as u16).to_be_bytes());
    for (k, v) in &spec.env {
        push_str16(&mut buf, k);
        push_str16(&mut buf, v);
    }

    buf.extend_from_slice(&(spec.mounts.len() as u16).to_be_bytes());
    for mount in &spec.mounts {
        push_str16(&mut buf, mount);
    }

    match &spec.network {
        Some(network) => {
            buf.push(1);
            push_str16(&mut buf, network);
        }
        None => buf.push(0),
    }
    buf
}

fn decode_spec(data: &[u8]) -> Result<ContainerSpec, TransportError> {
    let bad = || TransportError::MalformedPayload(MessageType::DeployContainer.discriminant(), "truncated".into());
    let mut cursor = 0usize;

    let name = take_str16(data, &mut cursor).map_err(|_| bad())?.to_string();

    let has_image = *data.get(cursor).ok_or_else(bad)?;
    cursor += 1;
    let image = if has_image == 1 { Some(take_str16(data, &mut cursor).map_err(|_| bad())?.to_string()) } else { None };

    let cpu_limit = u32::from_be_bytes(data.get(cursor..cursor + 4).ok_or_else(bad)?.try_into().map_err(|_| bad())?);
    cursor += 4;
    let memory_limit =
        u32::from_be_bytes(data.get(cursor..cursor + 4).ok_or_else(bad)?.try_into().map_err(|_| bad())?);
    cursor += 4;
    let privileged = *data.get(cursor).ok_or_else(bad)? == 1;
    cursor += 1;

    let env_count =
        u16::from_be_bytes(data.get(cursor..cursor + 2).ok_or_else(bad)?.try_into().map_err(|_| bad())?);
    cursor += 2;
    let mut env = Vec::with_capacity(env_count as usize);
    for _ in 0..env_count {
        let k = take_str16(data, &mut cursor).map_err(|_| bad())?.to_string();
        let v = take_str16(data, &mut cursor).map_err(|_| bad())?.to_string();
        env.push((k, v));
    }

    let mount_count =
        u16::from_be_bytes(data.get(cursor..cursor + 2).ok_or_else(bad)?.try_into().map_err(|_| bad())?);
    cursor += 2;
    let mut mounts = Vec::with_capacity(mount_count as usize);
    for _ in 0..mount_count {
        mounts.push(take_str16(data, &mut cursor).map_err(|_| bad())?.to_string());
    }

    let has_network = *data.get(cursor).ok_or_else(bad)?;
    cursor += 1;
    let network =
        if has_network == 1 { Some(take_str16(data, &mut cursor).map_err(|_| bad())?.to_string()) } else { None };

    Ok(ContainerSpec { name, image, cpu_limit, memory_limit, privileged, env, mounts, network })
}

// -- ContainerStatus: id/name/node_id + state + optional started_at -----

fn encode_status(status: &ContainerStatusPayload) -> Vec<u8> {
    let mut buf = Vec::new();
    push_str16(&mut buf, status.id.as_str());
    push_str16(&mut buf, &status.name);
    push_str16(&mut buf, status.node_id.as_str());
    buf.push(container_state_discriminant(status.state));
    match status.started_at {
        Some(ts) => {
            buf.push(1);
            buf.extend_from_slice(&ts.to_be_bytes());
        }
        None => buf.push(0),
    }
    buf
}

fn decode_status(data: &[u8]) -> Result<ContainerStatusPayload, TransportError> {
    let bad = || TransportError::MalformedPayload(MessageType::ContainerStatus.discriminant(), "truncated".into());
    let mut cursor = 0usize;
    let id = take_str16(data, &mut cursor).map_err(|_| bad())?.to_string();
    let name = take_str16(data, &mut cursor).map_err(|_| bad())?.to_string();
    let node_id = take_str16(data, &mut cursor).map_err(|_| bad())?.to_string();
    let state_byte = *data.get(cursor).ok_or_else(bad)?;
    cursor += 1;
    let state = container_state_from_discriminant(state_byte).ok_or_else(bad)?;
    let has_started = *data.get(cursor).ok_or_else(bad)?;
    cursor += 1;
    let started_at = if has_started == 1 {
        Some(u64::from_be_bytes(data.get(cursor..cursor + 8).ok_or_else(bad)?.try_into().map_err(|_| bad())?))
    } else {
        None
    };
    Ok(ContainerStatusPayload { id: id.into(), name, node_id: node_id.into(), state, started_at })
}

fn container_state_discriminant(state: ContainerState) -> u8 {
    match state {
        ContainerState::Stopped => 0,
        ContainerState::Starting => 1,
        ContainerState::Running => 2,
        ContainerState::Stopping => 3,
        ContainerState::Error => 4,
    }
}

fn container_state_from_discriminant(b: u8) -> Option<ContainerState> {
    Some(match b {
        0 => ContainerState::Stopped,
        1 => ContainerState::Starting,
        2 => ContainerState::Running,
        3 => ContainerState::Stopping,
        4 => ContainerState::Error,
        _ => return None,
    })
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
