use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientIntent {
    Move { x: i64, y: i64 },
}

/// Parses one client frame. Anything that is not a recognizable intent
/// yields `None` and is expected to be ignored by the caller.
pub fn parse_client_message(raw: &str) -> Option<ClientIntent> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = match object.get("type") {
        None => "",
        Some(value) => value.as_str()?,
    };

    match message_type {
        "move" => {
            let x = parse_axis(object.get("x"))?;
            let y = parse_axis(object.get("y"))?;
            Some(ClientIntent::Move { x, y })
        }
        _ => None,
    }
}

/// Missing axes default to zero; present axes must be integers and are
/// reduced to their sign.
fn parse_axis(value: Option<&Value>) -> Option<i64> {
    let Some(value) = value else {
        return Some(0);
    };
    if let Some(number) = value.as_i64() {
        return Some(number.signum());
    }
    value.as_u64().map(|_| 1)
}
