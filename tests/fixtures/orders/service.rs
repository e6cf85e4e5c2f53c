use crate::{Context, Order, ServiceError};

/// @RestService( path = "/api/orders" )
pub struct OrderService {
    pub repository: OrderRepository,
}

impl OrderService {
    /// @RestOperation( path = "/orders/{uid}", method = "GET", format = "JSON" )
    pub fn get_order(&self, ctx: &Context, uid: &str) -> Result<Order, ServiceError> {
        self.repository.find(ctx, uid)
    }

    /// @RestOperation( path = "/orders", method = "POST", producesEvents = "OrderCreated" )
    pub async fn create_order(&self, ctx: &Context, order: Order) -> Result<(), ServiceError> {
        self.repository.create(ctx, order).await
    }

    fn validate(&self, order: &Order) -> bool {
        order.quantity > 0
    }
}

/// @EventService( self = "orderNotifier", noTest = "true" )
pub struct OrderNotifier;

impl OrderNotifier {
    /// @EventOperation( topic = "orders" )
    pub fn on_order_created(&self, ctx: &Context, event: &OrderCreated) -> Result<(), ServiceError> {
        ctx.notify(&event.email)
    }
}

/// @Repository( aggregate = "Order", model = "Order", methods = "find, exists, purgeAll" )
pub struct OrderRepository;
