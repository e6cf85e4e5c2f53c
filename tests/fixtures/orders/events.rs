use serde::{Deserialize, Serialize};

/// First event of every order.
/// @Event( aggregate = "Order", isRootEvent = "true", isSensitive = "true" )
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_uid: String,
    /// @Sensitive( level = "true" )
    pub email: String,
    pub quantity: u32,
    pub status: Status,
}

/// @Event( aggregate = "Order", isTransient = "true" )
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderShipped {
    pub order_uid: String,
    pub carrier: Option<String>,
}

/// Missing its aggregate, so it is not an event.
/// @Event( isRootEvent = "true" )
#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    pub entries: Vec<String>,
}
